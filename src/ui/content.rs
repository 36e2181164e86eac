//! Chapter study-material viewer

use eframe::egui::{self, RichText, ScrollArea};

use super::block_renderer::render_block;
use super::html_blocks::{parse_blocks, ParsedBlock};
use crate::app::{Store, TopperGuideApp};
use crate::core::curriculum::ChapterRef;
use crate::core::route::{neighbors, Route};
use crate::core::store::{ChapterIndex, ContentTable};

/// The chapter on screen, its parsed content and its siblings
#[derive(Debug, Clone, Default)]
pub struct ContentState {
    pub chapter: Option<ChapterRef>,
    pub blocks: Vec<ParsedBlock>,
    /// Chapters of the same board, subject and class, for prev/next
    pub chapters: Vec<String>,
}

impl ContentState {
    /// Read the chapter's content and sibling list from the store
    pub fn load(&mut self, store: &Store, chapter: ChapterRef) {
        let html =
            store.get_content(chapter.board, chapter.subject, &chapter.class, &chapter.chapter);
        self.blocks = parse_blocks(&html);
        self.chapters = store.list_chapters(chapter.board, chapter.subject, &chapter.class);
        self.chapter = Some(chapter);
    }

    /// Route to a sibling chapter of the one on screen
    fn sibling(&self, name: &str) -> Option<Route> {
        let current = self.chapter.as_ref()?;
        Some(Route::Content(ChapterRef {
            chapter: name.to_string(),
            ..current.clone()
        }))
    }
}

pub struct ContentPanel;

impl ContentPanel {
    pub fn show(ui: &mut egui::Ui, app: &mut TopperGuideApp) {
        let Some(chapter) = app.content.chapter.clone() else {
            ui.label("No chapter selected.");
            return;
        };

        let mut target = None;
        let mut action = None;

        ui.horizontal(|ui| {
            if ui.link("\u{2190} Home").clicked() {
                target = Some(Route::Home);
            }
            ui.label(
                RichText::new(format!(
                    "{} / Class {} / {}",
                    chapter.board.label(),
                    chapter.class,
                    chapter.subject
                ))
                .weak(),
            );
        });
        ui.add_space(4.0);
        ui.heading(RichText::new(&chapter.chapter).size(28.0).strong());
        ui.separator();

        let around = neighbors(&app.content.chapters, &chapter.chapter);
        let nav_height = 36.0;

        ScrollArea::vertical()
            .id_salt("chapter_content_scroll")
            .max_height((ui.available_height() - nav_height).max(0.0))
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.set_max_width(ui.available_width().min(820.0));
                for block in &app.content.blocks {
                    if let Some(a) = render_block(ui, block) {
                        action = Some(a);
                    }
                }
            });

        ui.separator();
        ui.horizontal(|ui| {
            if let Some(previous) = around.previous {
                if ui.button(format!("\u{2190} {previous}")).clicked() {
                    target = app.content.sibling(previous);
                }
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(next) = around.next {
                    if ui.button(format!("{next} \u{2192}")).clicked() {
                        target = app.content.sibling(next);
                    }
                }
            });
        });

        if let Some(action) = action {
            app.handle_block_action(action);
        }
        if let Some(route) = target {
            app.navigate(route);
        }
    }
}
