//! Board and subject browser

use std::collections::HashMap;

use eframe::egui::{self, Color32, RichText};

use crate::app::{Store, TopperGuideApp};
use crate::core::curriculum::{Board, ChapterRef, Subject, CLASSES};
use crate::core::route::Route;
use crate::core::store::ChapterIndex;

/// Which class is expanded on each subject card, with its chapters
#[derive(Debug, Clone)]
pub struct HomeState {
    pub board: Board,
    expanded: HashMap<Subject, (String, Vec<String>)>,
}

impl HomeState {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            expanded: HashMap::new(),
        }
    }

    /// Close every class list so chapters are re-read next time
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn set_board(&mut self, board: Board) {
        if self.board != board {
            self.board = board;
            self.collapse_all();
        }
    }

    /// Expand `class` on a subject card, or collapse it if already open
    pub fn toggle_class(&mut self, store: &Store, subject: Subject, class: &str) {
        if self.expanded_class(subject) == Some(class) {
            self.expanded.remove(&subject);
            return;
        }
        let chapters = store.list_chapters(self.board, subject, class);
        self.expanded.insert(subject, (class.to_string(), chapters));
    }

    pub fn expanded_class(&self, subject: Subject) -> Option<&str> {
        self.expanded.get(&subject).map(|(class, _)| class.as_str())
    }

    pub fn expanded_chapters(&self, subject: Subject) -> &[String] {
        self.expanded
            .get(&subject)
            .map_or(&[], |(_, chapters)| chapters.as_slice())
    }
}

/// Landing view listing subjects and their chapters
pub struct HomePanel;

impl HomePanel {
    pub fn show(ui: &mut egui::Ui, app: &mut TopperGuideApp) {
        let mut target = None;

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(16.0);
                ui.heading(RichText::new("Topper Guide").size(32.0).strong());
                ui.label("Clear, exam-focused study notes for every chapter.");
                ui.add_space(12.0);

                ui.horizontal(|ui| {
                    for board in Board::ALL {
                        let selected = app.home.board == board;
                        if ui
                            .selectable_label(selected, RichText::new(board.label()).size(18.0))
                            .clicked()
                        {
                            app.home.set_board(board);
                        }
                    }
                });
            });
            ui.add_space(16.0);

            for subject in Subject::ALL {
                if let Some(chapter) = Self::subject_card(ui, &mut app.home, &app.store, subject) {
                    target = Some(chapter);
                }
                ui.add_space(12.0);
            }
        });

        if let Some(chapter) = target {
            app.navigate(Route::Content(chapter));
        }
    }

    fn subject_card(
        ui: &mut egui::Ui,
        home: &mut HomeState,
        store: &Store,
        subject: Subject,
    ) -> Option<ChapterRef> {
        let [r, g, b] = subject.accent_rgb();
        let accent = Color32::from_rgb(r, g, b);
        let mut clicked = None;

        egui::Frame::group(ui.style())
            .stroke(egui::Stroke::new(1.5, accent))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::same(12))
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.label(RichText::new(subject.as_str()).size(22.0).strong().color(accent));
                ui.add_space(6.0);

                ui.horizontal_wrapped(|ui| {
                    for class in CLASSES {
                        let open = home.expanded_class(subject) == Some(class);
                        if ui.selectable_label(open, format!("Class {class}")).clicked() {
                            home.toggle_class(store, subject, class);
                        }
                    }
                });

                let Some(class) = home.expanded_class(subject).map(str::to_string) else {
                    return;
                };
                ui.add_space(6.0);
                let chapters = home.expanded_chapters(subject);
                if chapters.is_empty() {
                    ui.label(RichText::new("No chapters available.").italics().weak());
                }
                for chapter in chapters {
                    if ui.link(chapter).clicked() {
                        clicked =
                            Some(ChapterRef::new(home.board, subject, class.clone(), chapter));
                    }
                }
            });

        clicked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::medium::{MemoryMedium, StorageMedium};
    use crate::core::store::StudyStore;

    fn store() -> Store {
        let medium: Box<dyn StorageMedium> = Box::new(MemoryMedium::new());
        let mut store = StudyStore::new(medium);
        store.add_chapter(Board::Cbse, Subject::Physics, "10", "Optics");
        store
    }

    #[test]
    fn test_toggle_class_caches_chapters() {
        let store = store();
        let mut home = HomeState::new(Board::Cbse);

        home.toggle_class(&store, Subject::Physics, "10");
        assert_eq!(home.expanded_class(Subject::Physics), Some("10"));
        assert_eq!(home.expanded_chapters(Subject::Physics), ["Optics".to_string()]);
        assert_eq!(home.expanded_class(Subject::Biology), None);

        home.toggle_class(&store, Subject::Physics, "9");
        assert_eq!(home.expanded_class(Subject::Physics), Some("9"));
        assert!(home.expanded_chapters(Subject::Physics).is_empty());

        home.toggle_class(&store, Subject::Physics, "9");
        assert_eq!(home.expanded_class(Subject::Physics), None);
    }

    #[test]
    fn test_switching_board_collapses_cards() {
        let store = store();
        let mut home = HomeState::new(Board::Cbse);
        home.toggle_class(&store, Subject::Physics, "10");

        home.set_board(Board::Icse);
        assert_eq!(home.expanded_class(Subject::Physics), None);

        home.toggle_class(&store, Subject::Physics, "10");
        assert!(home.expanded_chapters(Subject::Physics).is_empty());
    }
}
