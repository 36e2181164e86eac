//! Chapter index and content table
//!
//! Two independent documents live in the medium:
//!
//! - `topperGuideChapters`: `board -> subject -> class -> [chapter]`
//! - `topperGuideContent`: `content key -> html`
//!
//! Every operation reads the whole document, changes it in memory and writes
//! the whole document back. Read failures degrade to an empty document and
//! write failures are logged; neither reaches the caller.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::curriculum::{Board, Subject};
use super::medium::StorageMedium;

/// Medium entry holding the chapter index
pub const CHAPTERS_ENTRY: &str = "topperGuideChapters";

/// Medium entry holding the content table
pub const CONTENT_ENTRY: &str = "topperGuideContent";

/// Returned by `get_content` when a chapter has nothing stored
pub const FALLBACK_CONTENT: &str =
    "<p>No content available for this chapter yet. Please check back later.</p>";

/// `board -> subject -> class -> ordered chapter names`
pub type ChapterIndexData = BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<String>>>>;

/// `content key -> html`
pub type ContentData = BTreeMap<String, String>;

/// Derive the content key for a chapter.
///
/// Chapter names that differ only in case, or in spaces versus hyphens, map to
/// the same key and therefore share content.
pub fn content_key(board: Board, subject: Subject, class: &str, chapter: &str) -> String {
    let subject = subject.as_str().to_lowercase().replace(' ', "");
    let chapter = chapter.to_lowercase().replace(' ', "-");
    format!("{}-{}-{}-{}", board.as_str(), subject, class, chapter)
}

/// Chapter list operations
pub trait ChapterIndex {
    /// Chapters of a bucket in insertion order, empty if the bucket is absent
    fn list_chapters(&self, board: Board, subject: Subject, class: &str) -> Vec<String>;

    /// Append `name` to its bucket. Returns `false` without writing if it is already there.
    fn add_chapter(&mut self, board: Board, subject: Subject, class: &str, name: &str) -> bool;

    /// Remove `name` from its bucket and delete its content
    fn remove_chapter(&mut self, board: Board, subject: Subject, class: &str, name: &str);
}

/// Chapter content operations
pub trait ContentTable {
    /// Stored html, or [`FALLBACK_CONTENT`]
    fn get_content(&self, board: Board, subject: Subject, class: &str, chapter: &str) -> String;

    /// Store `html`, replacing whatever was there
    fn save_content(
        &mut self,
        board: Board,
        subject: Subject,
        class: &str,
        chapter: &str,
        html: &str,
    );
}

/// Chapter index and content table over a single medium
#[derive(Debug)]
pub struct StudyStore<M> {
    medium: M,
}

impl<M: StorageMedium> StudyStore<M> {
    pub fn new(medium: M) -> Self {
        Self { medium }
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Load and parse an entry, falling back to an empty document
    fn read_entry<T: DeserializeOwned + Default>(&self, entry: &str) -> T {
        let raw = match self.medium.get(entry) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                tracing::error!("Error reading {} from {}: {}", entry, self.medium.describe(), e);
                return T::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::error!("Error parsing {}: {}", entry, e);
            T::default()
        })
    }

    /// Serialize and persist an entry, logging on failure
    fn write_entry<T: Serialize>(&mut self, entry: &str, data: &T) {
        let serialized = match serde_json::to_string(data) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::error!("Error serializing {}: {}", entry, e);
                return;
            }
        };

        if let Err(e) = self.medium.set(entry, &serialized) {
            tracing::error!("Error writing {} to {}: {}", entry, self.medium.describe(), e);
        }
    }

    fn read_chapters(&self) -> ChapterIndexData {
        self.read_entry(CHAPTERS_ENTRY)
    }

    fn read_content(&self) -> ContentData {
        self.read_entry(CONTENT_ENTRY)
    }
}

impl<M: StorageMedium> ChapterIndex for StudyStore<M> {
    fn list_chapters(&self, board: Board, subject: Subject, class: &str) -> Vec<String> {
        self.read_chapters()
            .get(board.as_str())
            .and_then(|subjects| subjects.get(subject.as_str()))
            .and_then(|classes| classes.get(class))
            .cloned()
            .unwrap_or_default()
    }

    fn add_chapter(&mut self, board: Board, subject: Subject, class: &str, name: &str) -> bool {
        let mut data = self.read_chapters();
        let chapters = data
            .entry(board.as_str().to_string())
            .or_default()
            .entry(subject.as_str().to_string())
            .or_default()
            .entry(class.to_string())
            .or_default();

        if chapters.iter().any(|c| c == name) {
            return false;
        }

        chapters.push(name.to_string());
        self.write_entry(CHAPTERS_ENTRY, &data);
        tracing::info!("Added chapter {:?} to {}/{}/{}", name, board, subject, class);
        true
    }

    fn remove_chapter(&mut self, board: Board, subject: Subject, class: &str, name: &str) {
        let mut data = self.read_chapters();
        let bucket = data
            .get_mut(board.as_str())
            .and_then(|subjects| subjects.get_mut(subject.as_str()))
            .and_then(|classes| classes.get_mut(class));

        if let Some(chapters) = bucket {
            chapters.retain(|c| c != name);
            self.write_entry(CHAPTERS_ENTRY, &data);
        }

        // Content goes even when the chapter was not listed
        let key = content_key(board, subject, class, name);
        let mut content = self.read_content();
        content.remove(&key);
        self.write_entry(CONTENT_ENTRY, &content);

        tracing::info!("Removed chapter {:?} from {}/{}/{}", name, board, subject, class);
    }
}

impl<M: StorageMedium> ContentTable for StudyStore<M> {
    fn get_content(&self, board: Board, subject: Subject, class: &str, chapter: &str) -> String {
        let key = content_key(board, subject, class, chapter);
        self.read_content()
            .remove(&key)
            .unwrap_or_else(|| FALLBACK_CONTENT.to_string())
    }

    fn save_content(
        &mut self,
        board: Board,
        subject: Subject,
        class: &str,
        chapter: &str,
        html: &str,
    ) {
        let key = content_key(board, subject, class, chapter);
        let mut data = self.read_content();
        data.insert(key, html.to_string());
        self.write_entry(CONTENT_ENTRY, &data);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io;

    use super::*;
    use crate::core::medium::{FileMedium, MediumError, MemoryMedium};

    fn store() -> StudyStore<MemoryMedium> {
        StudyStore::new(MemoryMedium::new())
    }

    /// Medium that fails reads and/or writes on demand
    #[derive(Default)]
    struct FlakyMedium {
        inner: MemoryMedium,
        fail_reads: bool,
        fail_writes: bool,
        writes: Cell<usize>,
    }

    impl StorageMedium for FlakyMedium {
        fn get(&self, entry: &str) -> Result<Option<String>, MediumError> {
            if self.fail_reads {
                return Err(MediumError::Read {
                    entry: entry.to_string(),
                    source: io::Error::other("medium unavailable"),
                });
            }
            self.inner.get(entry)
        }

        fn set(&mut self, entry: &str, value: &str) -> Result<(), MediumError> {
            self.writes.set(self.writes.get() + 1);
            if self.fail_writes {
                return Err(MediumError::Write {
                    entry: entry.to_string(),
                    source: io::Error::other("quota exceeded"),
                });
            }
            self.inner.set(entry, value)
        }

        fn describe(&self) -> String {
            "flaky".to_string()
        }
    }

    #[test]
    fn test_content_key_normalization() {
        assert_eq!(
            content_key(Board::Cbse, Subject::Physics, "10", "Light Reflection"),
            "cbse-physics-10-light-reflection"
        );
        assert_eq!(
            content_key(Board::Icse, Subject::ComputerScience, "12", "Data  Structures & C++"),
            "icse-computerscience-12-data--structures-&-c++"
        );
    }

    #[test]
    fn test_optics_scenario() {
        let mut store = store();
        let (b, s, c) = (Board::Cbse, Subject::Physics, "10");

        assert!(store.add_chapter(b, s, c, "Optics"));
        assert_eq!(store.list_chapters(b, s, c), vec!["Optics".to_string()]);
        assert_eq!(store.get_content(b, s, c, "Optics"), FALLBACK_CONTENT);

        store.save_content(b, s, c, "Optics", "<h1>Optics</h1>");
        assert_eq!(store.get_content(b, s, c, "Optics"), "<h1>Optics</h1>");

        store.remove_chapter(b, s, c, "Optics");
        assert!(store.list_chapters(b, s, c).is_empty());
        assert_eq!(store.get_content(b, s, c, "Optics"), FALLBACK_CONTENT);
    }

    #[test]
    fn test_add_duplicate_is_rejected_without_write() {
        let mut store = StudyStore::new(FlakyMedium::default());
        let (b, s, c) = (Board::Icse, Subject::Biology, "9");

        assert!(store.add_chapter(b, s, c, "Cell"));
        let writes = store.medium().writes.get();
        assert!(!store.add_chapter(b, s, c, "Cell"));
        assert_eq!(store.medium().writes.get(), writes);
        assert_eq!(store.list_chapters(b, s, c), vec!["Cell".to_string()]);

        // Exact match only
        assert!(store.add_chapter(b, s, c, "cell"));
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut store = store();
        let (b, s, c) = (Board::Cbse, Subject::Chemistry, "11");
        for name in ["Zinc", "Atoms", "Moles", "Bonding"] {
            assert!(store.add_chapter(b, s, c, name));
        }
        store.add_chapter(b, s, c, "Atoms");
        assert_eq!(store.list_chapters(b, s, c), ["Zinc", "Atoms", "Moles", "Bonding"]);
    }

    #[test]
    fn test_buckets_are_independent() {
        let mut store = store();
        store.add_chapter(Board::Cbse, Subject::Physics, "10", "Motion");
        assert!(store.list_chapters(Board::Icse, Subject::Physics, "10").is_empty());
        assert!(store.list_chapters(Board::Cbse, Subject::Physics, "9").is_empty());
        assert!(store.add_chapter(Board::Icse, Subject::Physics, "10", "Motion"));
    }

    #[test]
    fn test_content_round_trip_is_byte_exact() {
        let mut store = store();
        let html = "<h1>Ohm's \"Law\"</h1>\n\
<p>V = I &times; R<br/>\u{3a9} <em>ohm</em></p>\t<script>x</script>";
        store.save_content(Board::Cbse, Subject::Physics, "12", "Current Electricity", html);
        assert_eq!(
            store.get_content(Board::Cbse, Subject::Physics, "12", "Current Electricity"),
            html
        );
    }

    #[test]
    fn test_normalized_names_collide() {
        let mut store = store();
        let (b, s, c) = (Board::Cbse, Subject::Physics, "10");
        store.save_content(b, s, c, "Light Reflection", "A");
        store.save_content(b, s, c, "light-reflection", "B");
        assert_eq!(store.get_content(b, s, c, "Light Reflection"), "B");
        assert_eq!(store.get_content(b, s, c, "light-reflection"), "B");
    }

    #[test]
    fn test_remove_deletes_content_even_when_unlisted() {
        let mut store = store();
        let (b, s, c) = (Board::Icse, Subject::Chemistry, "8");
        store.save_content(b, s, c, "Orphan", "<p>x</p>");
        store.remove_chapter(b, s, c, "Orphan");
        assert_eq!(store.get_content(b, s, c, "Orphan"), FALLBACK_CONTENT);
    }

    #[test]
    fn test_remove_missing_chapter_keeps_others() {
        let mut store = store();
        let (b, s, c) = (Board::Cbse, Subject::Biology, "7");
        store.add_chapter(b, s, c, "Plants");
        store.save_content(b, s, c, "Plants", "<p>green</p>");
        store.remove_chapter(b, s, c, "Animals");
        assert_eq!(store.list_chapters(b, s, c), ["Plants"]);
        assert_eq!(store.get_content(b, s, c, "Plants"), "<p>green</p>");
    }

    #[test]
    fn test_persisted_layout() {
        let mut store = store();
        store.add_chapter(Board::Cbse, Subject::ComputerScience, "10", "Loops");
        store.save_content(Board::Cbse, Subject::ComputerScience, "10", "Loops", "<p>for</p>");

        let chapters = store.medium().get(CHAPTERS_ENTRY).unwrap().unwrap();
        assert_eq!(chapters, r#"{"cbse":{"Computer Science":{"10":["Loops"]}}}"#);
        let content = store.medium().get(CONTENT_ENTRY).unwrap().unwrap();
        assert_eq!(content, r#"{"cbse-computerscience-10-loops":"<p>for</p>"}"#);
    }

    #[test]
    fn test_reads_existing_persisted_data() {
        let medium = MemoryMedium::new()
            .with_entry(CHAPTERS_ENTRY, r#"{"icse":{"Physics":{"9":["Force","Work"]}}}"#)
            .with_entry(CONTENT_ENTRY, r#"{"icse-physics-9-force":"<p>F = ma</p>"}"#);
        let store = StudyStore::new(medium);
        assert_eq!(store.list_chapters(Board::Icse, Subject::Physics, "9"), ["Force", "Work"]);
        assert_eq!(
            store.get_content(Board::Icse, Subject::Physics, "9", "Force"),
            "<p>F = ma</p>"
        );
    }

    #[test]
    fn test_corrupt_entries_read_as_empty() {
        let medium = MemoryMedium::new()
            .with_entry(CHAPTERS_ENTRY, "{not json")
            .with_entry(CONTENT_ENTRY, "[1, 2, 3]");
        let mut store = StudyStore::new(medium);
        assert!(store.list_chapters(Board::Cbse, Subject::Physics, "10").is_empty());
        assert_eq!(
            store.get_content(Board::Cbse, Subject::Physics, "10", "Optics"),
            FALLBACK_CONTENT
        );

        // A later write replaces the corrupt document
        assert!(store.add_chapter(Board::Cbse, Subject::Physics, "10", "Optics"));
        assert_eq!(store.list_chapters(Board::Cbse, Subject::Physics, "10"), ["Optics"]);
    }

    #[test]
    fn test_read_failure_degrades_to_empty() {
        let medium = FlakyMedium {
            fail_reads: true,
            ..Default::default()
        };
        let store = StudyStore::new(medium);
        assert!(store.list_chapters(Board::Cbse, Subject::Physics, "10").is_empty());
        assert_eq!(
            store.get_content(Board::Cbse, Subject::Physics, "10", "Optics"),
            FALLBACK_CONTENT
        );
    }

    #[test]
    fn test_write_failure_keeps_return_value_and_stale_store() {
        let medium = FlakyMedium {
            fail_writes: true,
            ..Default::default()
        };
        let mut store = StudyStore::new(medium);
        assert!(store.add_chapter(Board::Cbse, Subject::Physics, "10", "Optics"));
        assert!(store.list_chapters(Board::Cbse, Subject::Physics, "10").is_empty());
    }

    #[test]
    fn test_remove_writes_index_and_content_separately() {
        let mut store = StudyStore::new(FlakyMedium::default());
        store.add_chapter(Board::Cbse, Subject::Physics, "10", "Optics");
        let before = store.medium().writes.get();
        store.remove_chapter(Board::Cbse, Subject::Physics, "10", "Optics");
        assert_eq!(store.medium().writes.get(), before + 2);
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("guide");

        let mut store = StudyStore::new(FileMedium::new(&root));
        store.add_chapter(Board::Icse, Subject::Biology, "12", "Genetics");
        store.save_content(Board::Icse, Subject::Biology, "12", "Genetics", "<h1>DNA</h1>");

        let reopened = StudyStore::new(FileMedium::new(&root));
        assert_eq!(reopened.list_chapters(Board::Icse, Subject::Biology, "12"), ["Genetics"]);
        assert_eq!(
            reopened.get_content(Board::Icse, Subject::Biology, "12", "Genetics"),
            "<h1>DNA</h1>"
        );
    }
}
