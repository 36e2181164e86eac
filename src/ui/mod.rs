//! UI components for Topper Guide

pub mod admin;
pub mod block_renderer;
pub mod content;
pub mod home;
pub mod html_blocks;
pub mod login;
pub mod notification;
