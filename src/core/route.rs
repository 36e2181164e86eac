//! Addressable views and chapter navigation
//!
//! Paths follow the shape `/`, `/login`, `/admin` and
//! `/{board}/{class}/{subject}/{chapter}`. Content path segments are
//! percent-encoded with the same character set as JavaScript's
//! `encodeURIComponent`, so chapter names with spaces or slashes survive.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::curriculum::{Board, ChapterRef, Subject};

/// Characters escaped in a path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A view the app can show
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    /// Board and subject browser
    #[default]
    Home,
    Login,
    Admin,
    /// One chapter's study material
    Content(ChapterRef),
}

impl Route {
    /// Parse a path, `None` if it matches no view
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_start_matches('#').trim_matches('/');
        if trimmed.is_empty() {
            return Some(Route::Home);
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        match segments.as_slice() {
            ["login"] => Some(Route::Login),
            ["admin"] => Some(Route::Admin),
            [board, class, subject, chapter] => {
                let board: Board = decode(board)?.parse().ok()?;
                let subject: Subject = decode(subject)?.parse().ok()?;
                let class = decode(class)?;
                let chapter = decode(chapter)?;
                if class.is_empty() || chapter.is_empty() {
                    return None;
                }
                Some(Route::Content(ChapterRef::new(board, subject, class, chapter)))
            }
            _ => None,
        }
    }

    /// Path for this view
    pub fn to_path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::Content(chapter) => format!(
                "/{}/{}/{}/{}",
                encode(chapter.board.as_str()),
                encode(&chapter.class),
                encode(chapter.subject.as_str()),
                encode(&chapter.chapter),
            ),
        }
    }
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

fn decode(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

/// Previous and next chapters around the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Neighbors<'a> {
    pub previous: Option<&'a str>,
    pub next: Option<&'a str>,
}

/// Find the chapters either side of `current`.
///
/// A chapter missing from the list has no previous chapter and the first
/// listed chapter as its next one.
pub fn neighbors<'a>(chapters: &'a [String], current: &str) -> Neighbors<'a> {
    match chapters.iter().position(|c| c == current) {
        Some(idx) => Neighbors {
            previous: idx.checked_sub(1).map(|i| chapters[i].as_str()),
            next: chapters.get(idx + 1).map(String::as_str),
        },
        None => Neighbors {
            previous: None,
            next: chapters.first().map(String::as_str),
        },
    }
}
