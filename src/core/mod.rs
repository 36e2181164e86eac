//! Storage, curriculum model, routing and configuration

pub mod config;
pub mod curriculum;
pub mod document;
pub mod generation;
pub mod medium;
pub mod route;
pub mod session;
pub mod store;
