//! Admin dashboard: chapter management and the content editor

use std::ops::Range;
use std::sync::Arc;

use eframe::egui::{self, Color32, RichText};
use tokio::runtime::Runtime;

use super::notification::Notification;
use crate::app::{Store, TopperGuideApp};
use crate::core::config::BrowseConfig;
use crate::core::curriculum::{Board, ChapterRef, Subject, CLASSES};
use crate::core::document::ChapterDraft;
use crate::core::generation::{GenerationJob, TextGenerator};
use crate::core::store::ChapterIndex;

const DANGER: Color32 = Color32::from_rgb(220, 38, 38);

const GENERATING_PLACEHOLDER: &str = "Generating content with AI... Please wait.";

/// Dialog collecting an image URL and alt text
#[derive(Debug, Clone, Default)]
pub struct ImageDialog {
    pub visible: bool,
    pub url: String,
    pub alt: String,
}

impl ImageDialog {
    /// Returns `(url, alt)` when the user confirms with both fields filled
    pub fn show(&mut self, ctx: &egui::Context) -> Result<Option<(String, String)>, Notification> {
        let mut result = Ok(None);

        if self.visible {
            egui::Window::new("Insert Image")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    egui::Grid::new("image_dialog_grid").num_columns(2).show(ui, |ui| {
                        ui.label("Image URL:");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.url)
                                .hint_text("https://example.com/image.png"),
                        );
                        ui.end_row();
                        ui.label("Alt text:");
                        ui.text_edit_singleline(&mut self.alt);
                        ui.end_row();
                    });

                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            self.close();
                        }
                        if ui.button("Insert").clicked() {
                            result = self.confirm();
                        }
                    });
                });
        }

        result
    }

    fn confirm(&mut self) -> Result<Option<(String, String)>, Notification> {
        if self.url.is_empty() || self.alt.is_empty() {
            return Err(Notification::error(
                "Please provide both an Image URL and Alt Text.",
            ));
        }
        let picked = (std::mem::take(&mut self.url), std::mem::take(&mut self.alt));
        self.visible = false;
        Ok(Some(picked))
    }

    fn close(&mut self) {
        self.visible = false;
        self.url.clear();
        self.alt.clear();
    }
}

/// Admin dashboard state
pub struct AdminState {
    pub board: Board,
    pub subject: Subject,
    pub class: String,
    /// Chapters of the selected bucket, in stored order
    pub chapters: Vec<String>,
    pub selected: Option<String>,
    /// Text of the "new chapter" field
    pub new_chapter: String,
    pub draft: Option<ChapterDraft>,
    generation: Option<GenerationJob>,
    pending_removal: Option<String>,
    image_dialog: ImageDialog,
    /// Last known editor selection as character offsets, empty for a bare cursor
    editor_selection: Option<Range<usize>>,
}

impl AdminState {
    pub fn new(browse: &BrowseConfig, store: &Store) -> Self {
        let mut state = Self {
            board: browse.board,
            subject: Subject::Physics,
            class: browse.class.clone(),
            chapters: Vec::new(),
            selected: None,
            new_chapter: String::new(),
            draft: None,
            generation: None,
            pending_removal: None,
            image_dialog: ImageDialog::default(),
            editor_selection: None,
        };
        state.reload_chapters(store);
        state
    }

    pub fn reload_chapters(&mut self, store: &Store) {
        self.chapters = store.list_chapters(self.board, self.subject, &self.class);
    }

    /// Drop the chapter selection and anything tied to it
    pub fn reset_selection(&mut self) {
        self.selected = None;
        self.draft = None;
        self.generation = None;
        self.pending_removal = None;
        self.editor_selection = None;
    }

    /// Change board, subject or class, reloading the chapter list
    pub fn set_bucket(&mut self, store: &Store, board: Board, subject: Subject, class: &str) {
        if self.board == board && self.subject == subject && self.class == class {
            return;
        }
        self.board = board;
        self.subject = subject;
        self.class = class.to_string();
        self.reset_selection();
        self.reload_chapters(store);
    }

    pub fn is_generating(&self) -> bool {
        self.generation.is_some()
    }

    fn chapter_ref(&self, chapter: &str) -> ChapterRef {
        ChapterRef::new(self.board, self.subject, self.class.clone(), chapter)
    }

    /// Open a chapter in the editor
    pub fn select_chapter(&mut self, store: &Store, chapter: &str) {
        self.reset_selection();
        self.selected = Some(chapter.to_string());
        self.draft = Some(ChapterDraft::open(store, self.chapter_ref(chapter)));
    }

    /// Add the chapter typed into the "new chapter" field
    pub fn add_chapter(&mut self, store: &mut Store) -> Option<Notification> {
        let name = self.new_chapter.trim().to_string();
        if name.is_empty() {
            return None;
        }

        if store.add_chapter(self.board, self.subject, &self.class, &name) {
            self.new_chapter.clear();
            self.reload_chapters(store);
            Some(Notification::success(format!("Chapter \"{name}\" added.")))
        } else {
            Some(Notification::error(format!("Chapter \"{name}\" already exists.")))
        }
    }

    /// Delete a chapter and its content
    pub fn remove_chapter(&mut self, store: &mut Store, chapter: &str) -> Notification {
        store.remove_chapter(self.board, self.subject, &self.class, chapter);
        self.reload_chapters(store);
        if self.selected.as_deref() == Some(chapter) {
            self.reset_selection();
        }
        Notification::success(format!("Chapter \"{chapter}\" removed."))
    }

    /// Write the open draft to the store
    pub fn save(&mut self, store: &mut Store) -> Option<Notification> {
        if self.is_generating() {
            return None;
        }
        let draft = self.draft.as_mut()?;
        draft.save(store);
        Some(Notification::success("Content saved successfully!"))
    }

    /// Replace the editor text with a placeholder and start a generation job
    pub fn start_generation(
        &mut self,
        runtime: &Runtime,
        generator: Arc<dyn TextGenerator>,
        notify: impl FnOnce() + Send + 'static,
    ) -> Option<Notification> {
        let Some(draft) = self.draft.as_mut() else {
            return Some(Notification::error("Please select a chapter first."));
        };
        if self.generation.is_some() {
            return None;
        }
        draft.set_content(GENERATING_PLACEHOLDER.to_string());
        let chapter = draft.chapter.clone();
        tracing::info!("Generating content for {:?}", chapter.chapter);
        self.generation = Some(GenerationJob::spawn(runtime, generator, chapter, notify));
        None
    }

    /// Apply a finished generation to the draft it was started for
    pub fn poll_generation(&mut self) -> Option<Notification> {
        let html = self.generation.as_mut()?.poll()?;
        let job = self.generation.take()?;
        let draft = self.draft.as_mut().filter(|d| d.chapter == job.chapter)?;
        draft.set_content(html);
        self.editor_selection = None;
        Some(Notification::success("AI content generated!"))
    }

    /// Replace the last editor selection with an image tag
    pub fn insert_image(&mut self, url: &str, alt: &str) {
        if let Some(draft) = self.draft.as_mut() {
            let end = draft.insert_image(self.editor_selection.clone(), url, alt);
            self.editor_selection = Some(end..end);
        }
    }
}

pub struct AdminPanel;

impl AdminPanel {
    pub fn show(ui: &mut egui::Ui, app: &mut TopperGuideApp) {
        ui.heading(RichText::new("Admin Dashboard").size(24.0).strong());
        ui.add_space(6.0);
        Self::show_selectors(ui, app);
        ui.separator();

        let sidebar_width = app.config.ui.sidebar_width;
        ui.horizontal_top(|ui| {
            ui.allocate_ui_with_layout(
                egui::vec2(sidebar_width, ui.available_height()),
                egui::Layout::top_down(egui::Align::Min),
                |ui| Self::show_chapter_list(ui, app),
            );
            ui.separator();
            ui.vertical(|ui| Self::show_editor(ui, app));
        });
    }

    fn show_selectors(ui: &mut egui::Ui, app: &mut TopperGuideApp) {
        let state = &app.admin;
        let (mut board, mut subject, mut class) = (state.board, state.subject, state.class.clone());

        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Board")
                .selected_text(board.label())
                .show_ui(ui, |ui| {
                    for b in Board::ALL {
                        ui.selectable_value(&mut board, b, b.label());
                    }
                });
            egui::ComboBox::from_label("Subject")
                .selected_text(subject.as_str())
                .show_ui(ui, |ui| {
                    for s in Subject::ALL {
                        ui.selectable_value(&mut subject, s, s.as_str());
                    }
                });
            egui::ComboBox::from_label("Class")
                .selected_text(format!("Class {class}"))
                .show_ui(ui, |ui| {
                    for c in CLASSES {
                        ui.selectable_value(&mut class, c.to_string(), format!("Class {c}"));
                    }
                });
        });

        app.admin.set_bucket(&app.store, board, subject, &class);
    }

    fn show_chapter_list(ui: &mut egui::Ui, app: &mut TopperGuideApp) {
        ui.label(RichText::new("Chapters").strong());

        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut app.admin.new_chapter)
                    .hint_text("New chapter name")
                    .desired_width(ui.available_width() - 48.0),
            );
            let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Add").clicked() || enter {
                if let Some(n) = app.admin.add_chapter(&mut app.store) {
                    app.notification = Some(n);
                }
            }
        });
        ui.add_space(4.0);

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("admin_chapter_list")
            .show(ui, |ui| {
                if app.admin.chapters.is_empty() {
                    ui.label(RichText::new("No chapters yet.").italics().weak());
                }
                for chapter in &app.admin.chapters {
                    ui.horizontal(|ui| {
                        let selected = app.admin.selected.as_deref() == Some(chapter.as_str());
                        if ui.selectable_label(selected, chapter).clicked() {
                            clicked = Some(chapter.clone());
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let icon = RichText::new("\u{1F5D1}").color(DANGER);
                            let delete = ui.small_button(icon).on_hover_text("Delete chapter");
                            if delete.clicked() {
                                app.admin.pending_removal = Some(chapter.clone());
                            }
                        });
                    });
                }
            });

        if let Some(chapter) = clicked {
            app.admin.select_chapter(&app.store, &chapter);
        }
    }

    fn show_editor(ui: &mut egui::Ui, app: &mut TopperGuideApp) {
        let generating = app.admin.is_generating();
        let Some(draft) = app.admin.draft.as_mut() else {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.label("Select a chapter to edit its content.");
            });
            return;
        };

        let title = if draft.modified {
            format!("{}*", draft.chapter.chapter)
        } else {
            draft.chapter.chapter.clone()
        };
        ui.label(RichText::new(title).size(18.0).strong());

        let mut generate = false;
        let mut save = false;
        ui.horizontal(|ui| {
            if ui.add_enabled(!generating, egui::Button::new("Add Image")).clicked() {
                app.admin.image_dialog.visible = true;
            }
            let label = if generating { "Generating..." } else { "Generate with AI" };
            if ui.add_enabled(!generating, egui::Button::new(label)).clicked() {
                generate = true;
            }
            if generating {
                ui.spinner();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(!generating, egui::Button::new("Save")).clicked() {
                    save = true;
                }
            });
        });

        let output = egui::ScrollArea::vertical()
            .id_salt("admin_editor_scroll")
            .max_height((ui.available_height() - 28.0).max(120.0))
            .show(ui, |ui| {
                egui::TextEdit::multiline(&mut draft.content)
                    .font(egui::TextStyle::Monospace)
                    .code_editor()
                    .interactive(!generating)
                    .desired_width(f32::INFINITY)
                    .desired_rows(24)
                    .show(ui)
            })
            .inner;

        if output.response.changed() {
            draft.modified = true;
        }
        if let Some(range) = output.state.cursor.char_range() {
            app.admin.editor_selection = Some(range.secondary.index..range.primary.index);
        }

        ui.label(RichText::new(format!("Word Count: {}", draft.word_count())).weak());

        if generate {
            let ctx = ui.ctx().clone();
            let generator = app.generator.clone();
            if let Some(n) = app
                .admin
                .start_generation(&app.runtime, generator, move || ctx.request_repaint())
            {
                app.notification = Some(n);
            }
        }
        if save {
            Self::save_draft(app);
        }
    }

    /// Save the open draft, if any
    pub fn save_draft(app: &mut TopperGuideApp) {
        if let Some(n) = app.admin.save(&mut app.store) {
            app.notification = Some(n);
        }
    }

    pub fn poll_generation(app: &mut TopperGuideApp) {
        if let Some(n) = app.admin.poll_generation() {
            app.notification = Some(n);
        }
    }

    /// Removal confirmation and image dialog windows
    pub fn show_dialogs(ctx: &egui::Context, app: &mut TopperGuideApp) {
        if let Some(chapter) = app.admin.pending_removal.clone() {
            let mut decision = None;
            egui::Window::new("Delete Chapter")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(format!(
                        "Are you sure you want to delete the chapter \"{chapter}\" and its content?"
                    ));
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            decision = Some(false);
                        }
                        let delete = RichText::new("Delete").color(DANGER);
                        if ui.button(delete).clicked() {
                            decision = Some(true);
                        }
                    });
                });

            match decision {
                Some(true) => {
                    app.admin.pending_removal = None;
                    let n = app.admin.remove_chapter(&mut app.store, &chapter);
                    app.notification = Some(n);
                }
                Some(false) => app.admin.pending_removal = None,
                None => {}
            }
        }

        match app.admin.image_dialog.show(ctx) {
            Ok(Some((url, alt))) => app.admin.insert_image(&url, &alt),
            Ok(None) => {}
            Err(n) => app.notification = Some(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generation::GenerationError;
    use crate::core::medium::{MemoryMedium, StorageMedium};
    use crate::core::store::{ContentTable, StudyStore, FALLBACK_CONTENT};
    use crate::ui::notification::NotificationKind;

    struct EchoGenerator;

    impl TextGenerator for EchoGenerator {
        fn generate(&self, chapter: &ChapterRef) -> Result<String, GenerationError> {
            Ok(format!("<h2>{}</h2>", chapter.chapter))
        }
    }

    fn store() -> Store {
        let medium: Box<dyn StorageMedium> = Box::new(MemoryMedium::new());
        StudyStore::new(medium)
    }

    fn state(store: &Store) -> AdminState {
        AdminState::new(&BrowseConfig::default(), store)
    }

    #[test]
    fn test_add_trims_and_reports_duplicates() {
        let mut store = store();
        let mut admin = state(&store);

        admin.new_chapter = "   ".to_string();
        assert!(admin.add_chapter(&mut store).is_none());

        admin.new_chapter = "  Optics ".to_string();
        let n = admin.add_chapter(&mut store).expect("notification");
        assert_eq!(n.message, "Chapter \"Optics\" added.");
        assert_eq!(n.kind, NotificationKind::Success);
        assert!(admin.new_chapter.is_empty());
        assert_eq!(admin.chapters, ["Optics"]);

        admin.new_chapter = "Optics".to_string();
        let n = admin.add_chapter(&mut store).expect("notification");
        assert_eq!(n.message, "Chapter \"Optics\" already exists.");
        assert_eq!(n.kind, NotificationKind::Error);
        assert_eq!(admin.new_chapter, "Optics");
    }

    #[test]
    fn test_select_edit_save() {
        let mut store = store();
        let mut admin = state(&store);
        admin.new_chapter = "Optics".to_string();
        admin.add_chapter(&mut store);

        admin.select_chapter(&store, "Optics");
        let draft = admin.draft.as_mut().expect("draft");
        assert_eq!(draft.content, FALLBACK_CONTENT);
        draft.set_content("<p>Light bends</p>".to_string());

        let n = admin.save(&mut store).expect("notification");
        assert_eq!(n.message, "Content saved successfully!");
        assert_eq!(
            store.get_content(Board::Cbse, Subject::Physics, "10", "Optics"),
            "<p>Light bends</p>"
        );
    }

    #[test]
    fn test_remove_selected_chapter_clears_selection() {
        let mut store = store();
        let mut admin = state(&store);
        admin.new_chapter = "Optics".to_string();
        admin.add_chapter(&mut store);
        admin.select_chapter(&store, "Optics");

        let n = admin.remove_chapter(&mut store, "Optics");
        assert_eq!(n.message, "Chapter \"Optics\" removed.");
        assert!(admin.selected.is_none());
        assert!(admin.draft.is_none());
        assert!(admin.chapters.is_empty());
    }

    #[test]
    fn test_changing_bucket_resets_selection() {
        let mut store = store();
        let mut admin = state(&store);
        admin.new_chapter = "Optics".to_string();
        admin.add_chapter(&mut store);
        admin.select_chapter(&store, "Optics");

        admin.set_bucket(&store, Board::Icse, Subject::Physics, "10");
        assert!(admin.selected.is_none());
        assert!(admin.chapters.is_empty());

        admin.set_bucket(&store, Board::Cbse, Subject::Physics, "10");
        assert_eq!(admin.chapters, ["Optics"]);
    }

    #[test]
    fn test_generation_requires_selection() {
        let store = store();
        let mut admin = state(&store);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");

        let n = admin
            .start_generation(&runtime, Arc::new(EchoGenerator), || {})
            .expect("notification");
        assert_eq!(n.message, "Please select a chapter first.");
        assert!(!admin.is_generating());
    }

    #[test]
    fn test_generation_replaces_draft_without_saving() {
        let mut store = store();
        let mut admin = state(&store);
        admin.new_chapter = "Optics".to_string();
        admin.add_chapter(&mut store);
        admin.select_chapter(&store, "Optics");

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .expect("runtime");
        let (tx, rx) = std::sync::mpsc::channel();
        assert!(admin
            .start_generation(&runtime, Arc::new(EchoGenerator), move || {
                let _ = tx.send(());
            })
            .is_none());
        assert_eq!(
            admin.draft.as_ref().map(|d| d.content.as_str()),
            Some(GENERATING_PLACEHOLDER)
        );
        assert!(admin.save(&mut store).is_none());

        rx.recv().expect("generation finished");
        let n = admin.poll_generation().expect("notification");
        assert_eq!(n.message, "AI content generated!");
        assert!(!admin.is_generating());
        assert_eq!(
            admin.draft.as_ref().map(|d| d.content.as_str()),
            Some("<h2>Optics</h2>")
        );
        assert_eq!(
            store.get_content(Board::Cbse, Subject::Physics, "10", "Optics"),
            FALLBACK_CONTENT
        );
    }

    #[test]
    fn test_image_dialog_requires_both_fields() {
        let mut dialog = ImageDialog {
            visible: true,
            url: "https://x/y.png".to_string(),
            alt: String::new(),
        };
        let err = dialog.confirm().expect_err("missing alt");
        assert_eq!(err.message, "Please provide both an Image URL and Alt Text.");
        assert!(dialog.visible);

        dialog.alt = "diagram".to_string();
        let picked = dialog.confirm().expect("confirmed");
        assert_eq!(picked, Some(("https://x/y.png".to_string(), "diagram".to_string())));
        assert!(!dialog.visible);
        assert!(dialog.url.is_empty());
    }

    #[test]
    fn test_insert_image_replaces_editor_selection() {
        let mut store = store();
        let mut admin = state(&store);
        admin.new_chapter = "Optics".to_string();
        admin.add_chapter(&mut store);
        admin.select_chapter(&store, "Optics");
        admin.draft.as_mut().expect("draft").set_content("<p>a</p>".to_string());

        let tag = crate::core::document::image_tag("u", "a");

        admin.editor_selection = Some(3..3);
        admin.insert_image("u", "a");
        let draft = admin.draft.as_ref().expect("draft");
        assert!(draft.content.starts_with("<p>\n<img src=\"u\""));
        let end = 3 + tag.chars().count();
        assert_eq!(admin.editor_selection, Some(end..end));

        // A right-to-left drag over "old" arrives with the ends reversed
        let draft = admin.draft.as_mut().expect("draft");
        draft.set_content("<p>old</p>".to_string());
        #[allow(clippy::reversed_empty_ranges)]
        let selection = 6..3;
        admin.editor_selection = Some(selection);
        admin.insert_image("u", "a");
        let draft = admin.draft.as_ref().expect("draft");
        assert_eq!(draft.content, format!("<p>{tag}</p>"));
        let end = 3 + tag.chars().count();
        assert_eq!(admin.editor_selection, Some(end..end));
    }
}
