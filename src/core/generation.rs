//! AI drafting of chapter study guides
//!
//! Generation is a single blocking request to the Gemini `generateContent`
//! endpoint. Callers get an explicit `Result` and turn it into displayable html
//! with [`render_outcome`]; the UI never sees a raw transport error.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::runtime::Runtime;
use tokio::sync::oneshot;

use super::config::GenerationConfig;
use super::curriculum::ChapterRef;

/// Shown when no API key is configured
pub const DISABLED_FRAGMENT: &str = "<p>AI generation is disabled. API key not configured.</p>";

/// Why a generation request produced no study guide
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("API key not configured")]
    Disabled,
    #[error("service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("the service returned no text")]
    EmptyResponse,
    #[error("generation task ended without a result")]
    Interrupted,
}

/// Build the study-guide prompt for a chapter
pub fn study_guide_prompt(chapter: &ChapterRef) -> String {
    format!(
        "You are an expert educator creating study materials for students in India. \
Your task is to generate a comprehensive, well-structured, and easy-to-understand study guide.

Board: {board}
Class: {class}
Subject: {subject}
Chapter: {chapter}

Please generate the study material based on the details above. \
The output must be in clean, semantic HTML format.
Use h1 for the main chapter title, h2 for main sections, h3 for sub-sections, \
p for paragraphs, ul/ol for lists, and strong/em for emphasis.
Do NOT include <html>, <head>, or <body> tags. \
Start directly with the <h1> tag for the chapter title.
The content should be detailed, accurate, and tailored to the specified curriculum (CBSE/ICSE).
Break down complex topics into simple points. \
Include definitions, key concepts, important formulas (if applicable), and examples.",
        board = chapter.board.label(),
        class = chapter.class,
        subject = chapter.subject,
        chapter = chapter.chapter,
    )
}

/// Turn a generation result into html the editor can always display
pub fn render_outcome(outcome: Result<String, GenerationError>) -> String {
    match outcome {
        Ok(html) => html,
        Err(GenerationError::Disabled) => DISABLED_FRAGMENT.to_string(),
        Err(e) => format!(
            "<p class=\"text-red-500\">An error occurred while generating content: {}</p>",
            html_escape::encode_text(&e.to_string())
        ),
    }
}

/// Something that can draft a study guide
pub trait TextGenerator: Send + Sync {
    fn generate(&self, chapter: &ChapterRef) -> Result<String, GenerationError>;
}

/// Generator used when no API key is available
#[derive(Debug, Default)]
pub struct DisabledGenerator;

impl TextGenerator for DisabledGenerator {
    fn generate(&self, _chapter: &ChapterRef) -> Result<String, GenerationError> {
        Err(GenerationError::Disabled)
    }
}

/// Gemini REST client
pub struct GeminiGenerator {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GeminiGenerator {
    pub fn new(config: &GenerationConfig, api_key: String) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();

        Self {
            agent,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl TextGenerator for GeminiGenerator {
    fn generate(&self, chapter: &ChapterRef) -> Result<String, GenerationError> {
        let prompt = study_guide_prompt(chapter);
        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: &prompt }],
            }],
        };

        tracing::info!("Requesting study guide for {:?} from {}", chapter.chapter, self.model);
        let response = self
            .agent
            .post(&self.url())
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", &self.api_key)
            .send_json(&body)
            .map_err(GenerationError::from)?;

        let raw = response
            .into_string()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        extract_text(&raw)
    }
}

impl From<ureq::Error> for GenerationError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let body = response.into_string().unwrap_or_default();
                let message = serde_json::from_str::<ErrorEnvelope>(&body)
                    .map(|envelope| envelope.error.message)
                    .unwrap_or(body);
                GenerationError::Status { status, message }
            }
            ureq::Error::Transport(transport) => GenerationError::Transport(transport.to_string()),
        }
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(raw: &str) -> Result<String, GenerationError> {
    let response: GenerateResponse = serde_json::from_str(raw)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text)
}

/// Pick the generator for the current configuration
pub fn generator_from_config(config: &GenerationConfig) -> Arc<dyn TextGenerator> {
    match config.resolve_api_key() {
        Some(key) => Arc::new(GeminiGenerator::new(config, key)),
        None => {
            tracing::warn!("Gemini API key not found. AI features will be disabled.");
            Arc::new(DisabledGenerator)
        }
    }
}

/// A generation request running on the background runtime
pub struct GenerationJob {
    pub chapter: ChapterRef,
    rx: oneshot::Receiver<String>,
}

impl GenerationJob {
    /// Start generating on a blocking worker. `notify` runs once the html is ready.
    pub fn spawn(
        runtime: &Runtime,
        generator: Arc<dyn TextGenerator>,
        chapter: ChapterRef,
        notify: impl FnOnce() + Send + 'static,
    ) -> Self {
        let (tx, rx) = oneshot::channel();
        let request = chapter.clone();

        runtime.spawn_blocking(move || {
            let outcome = generator.generate(&request);
            if let Err(ref e) = outcome {
                tracing::error!("Error generating content for {:?}: {}", request.chapter, e);
            }
            // Receiver gone means the admin navigated away; nothing to deliver
            let _ = tx.send(render_outcome(outcome));
            notify();
        });

        Self { chapter, rx }
    }

    /// Non-blocking check for the finished html
    pub fn poll(&mut self) -> Option<String> {
        match self.rx.try_recv() {
            Ok(html) => Some(html),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                Some(render_outcome(Err(GenerationError::Interrupted)))
            }
        }
    }
}
