//! Editable draft of one chapter's html content

use std::ops::Range;
use std::sync::LazyLock;
use std::time::SystemTime;

use regex_lite::Regex;

use super::curriculum::ChapterRef;
use super::store::ContentTable;

/// Matches complete and trailing unterminated tags
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>?").expect("tag pattern is valid"));

/// Admin-side working copy of a chapter's content
#[derive(Debug, Clone)]
pub struct ChapterDraft {
    /// Chapter being edited
    pub chapter: ChapterRef,
    /// Html being edited
    pub content: String,
    /// Whether the draft has unsaved changes
    pub modified: bool,
    /// When the draft was last written to the store
    pub last_saved: Option<SystemTime>,
}

impl ChapterDraft {
    /// Load the stored content (or the fallback text) for a chapter
    pub fn open(repo: &impl ContentTable, chapter: ChapterRef) -> Self {
        let content = repo.get_content(
            chapter.board,
            chapter.subject,
            &chapter.class,
            &chapter.chapter,
        );
        Self {
            chapter,
            content,
            modified: false,
            last_saved: None,
        }
    }

    /// Write the draft to the store
    pub fn save(&mut self, repo: &mut impl ContentTable) {
        repo.save_content(
            self.chapter.board,
            self.chapter.subject,
            &self.chapter.class,
            &self.chapter.chapter,
            &self.content,
        );
        self.modified = false;
        self.last_saved = Some(SystemTime::now());
        tracing::info!("Saved content for chapter {:?}", self.chapter.chapter);
    }

    /// Replace content and mark as modified
    pub fn set_content(&mut self, content: String) {
        if self.content != content {
            self.content = content;
            self.modified = true;
        }
    }

    /// Words in the rendered text, tags counted as separators
    pub fn word_count(&self) -> usize {
        word_count(&self.content)
    }

    /// Replace a selection (character offsets, either order) with an image tag,
    /// or append when `selection` is `None`. An empty selection is a plain cursor.
    ///
    /// Returns the character offset just past the inserted tag.
    pub fn insert_image(&mut self, selection: Option<Range<usize>>, url: &str, alt: &str) -> usize {
        let tag = image_tag(url, alt);
        let char_len = self.content.chars().count();
        let (start, end) = match selection {
            Some(range) => {
                let (a, b) = (range.start.min(char_len), range.end.min(char_len));
                (a.min(b), a.max(b))
            }
            None => (char_len, char_len),
        };

        let byte_at = |offset: usize| {
            self.content
                .char_indices()
                .nth(offset)
                .map_or(self.content.len(), |(i, _)| i)
        };
        let (byte_start, byte_end) = (byte_at(start), byte_at(end));

        let mut content = String::with_capacity(self.content.len() + tag.len());
        content.push_str(&self.content[..byte_start]);
        content.push_str(&tag);
        content.push_str(&self.content[byte_end..]);
        self.set_content(content);
        start + tag.chars().count()
    }
}

/// Count words in html after replacing tags with spaces
pub fn word_count(html: &str) -> usize {
    if html.is_empty() {
        return 0;
    }
    TAG_PATTERN.replace_all(html, " ").split_whitespace().count()
}

/// Image markup inserted by the editor
pub fn image_tag(url: &str, alt: &str) -> String {
    format!(
        "\n<img src=\"{url}\" alt=\"{alt}\" \
class=\"my-4 rounded-lg shadow-md max-w-full h-auto mx-auto block\" />\n"
    )
}
