//! Block rendering for the chapter viewer
//!
//! Draws the blocks produced by `html_blocks` with plain egui widgets.

use eframe::egui::{self, Color32, FontId, RichText, Ui};

use super::html_blocks::{InlineSpan, ParsedBlock};

/// Action that can be triggered by block interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockAction {
    /// Open external URL
    OpenUrl(String),
}

/// Render a parsed block to the UI
pub fn render_block(ui: &mut Ui, block: &ParsedBlock) -> Option<BlockAction> {
    match block {
        ParsedBlock::Heading { level, spans } => render_heading(ui, *level, spans),
        ParsedBlock::Paragraph { spans } => {
            let action = render_inline(ui, spans, 16.0);
            ui.add_space(8.0);
            action
        }
        ParsedBlock::List { ordered, items } => render_list(ui, items, *ordered),
        ParsedBlock::Table { headers, rows } => {
            render_table(ui, headers, rows);
            None
        }
        ParsedBlock::CodeBlock { code } => {
            render_code_block(ui, code);
            None
        }
        ParsedBlock::BlockQuote { spans } => render_blockquote(ui, spans),
        ParsedBlock::Image { alt, url } => {
            render_image(ui, alt, url);
            None
        }
        ParsedBlock::HorizontalRule => {
            render_horizontal_rule(ui);
            None
        }
    }
}

/// Render a heading
pub fn render_heading(ui: &mut Ui, level: u8, spans: &[InlineSpan]) -> Option<BlockAction> {
    let font_size = match level {
        1 => 30.0,
        2 => 24.0,
        3 => 20.0,
        4 => 18.0,
        _ => 16.0,
    };

    if level == 1 {
        ui.add_space(4.0);
    }

    let text: String = spans.iter().map(|s| s.text.as_str()).collect();
    ui.label(
        RichText::new(text)
            .font(FontId::proportional(font_size))
            .color(ui.visuals().strong_text_color())
            .strong(),
    );

    ui.add_space(match level {
        1 => 12.0,
        2 => 10.0,
        _ => 6.0,
    });

    None
}

/// Render inline spans as wrapped text, returning a clicked link
pub fn render_inline(ui: &mut Ui, spans: &[InlineSpan], size: f32) -> Option<BlockAction> {
    let mut action = None;

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;

        for span in spans {
            if span.line_break {
                ui.end_row();
                continue;
            }

            let mut text = if span.code {
                RichText::new(&span.text)
                    .font(FontId::monospace(size - 2.0))
                    .background_color(ui.visuals().code_bg_color)
            } else {
                RichText::new(&span.text).font(FontId::proportional(size))
            };
            if span.bold {
                text = text.strong();
            }
            if span.italic {
                text = text.italics();
            }

            match &span.link {
                Some(url) => {
                    let response = ui.link(text).on_hover_text(url);
                    if response.clicked() {
                        action = Some(BlockAction::OpenUrl(url.clone()));
                    }
                }
                None => {
                    ui.label(text);
                }
            }
        }
    });

    action
}

/// Render a list (ordered or unordered)
pub fn render_list(ui: &mut Ui, items: &[Vec<InlineSpan>], ordered: bool) -> Option<BlockAction> {
    let mut action = None;

    for (idx, item) in items.iter().enumerate() {
        ui.horizontal(|ui| {
            ui.add_space(16.0);

            let marker = if ordered {
                format!("{}.", idx + 1)
            } else {
                "\u{2022}".to_string()
            };
            ui.label(
                RichText::new(marker)
                    .font(FontId::proportional(16.0))
                    .color(Color32::from_rgb(45, 212, 191)),
            );
            ui.add_space(6.0);

            ui.vertical(|ui| {
                if let Some(a) = render_inline(ui, item, 16.0) {
                    action = Some(a);
                }
            });
        });
        ui.add_space(2.0);
    }

    ui.add_space(8.0);
    action
}

/// Render a preformatted code block
pub fn render_code_block(ui: &mut Ui, code: &str) {
    egui::Frame::new()
        .fill(Color32::from_rgb(40, 40, 40))
        .stroke(egui::Stroke::new(1.0, Color32::from_rgb(60, 60, 60)))
        .inner_margin(egui::Margin::same(8))
        .outer_margin(egui::Margin::symmetric(0, 4))
        .corner_radius(4.0)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(
                RichText::new(code)
                    .font(FontId::monospace(14.0))
                    .color(Color32::from_rgb(200, 200, 200)),
            );
        });

    ui.add_space(8.0);
}

/// Render a blockquote
pub fn render_blockquote(ui: &mut Ui, spans: &[InlineSpan]) -> Option<BlockAction> {
    let mut action = None;

    egui::Frame::new()
        .fill(Color32::from_rgb(35, 35, 40))
        .inner_margin(egui::Margin {
            left: 12,
            right: 8,
            top: 8,
            bottom: 8,
        })
        .show(ui, |ui| {
            // Left border effect
            let rect = ui.max_rect();
            ui.painter().rect_filled(
                egui::Rect::from_min_size(
                    rect.min - egui::vec2(12.0, 8.0),
                    egui::vec2(4.0, rect.height() + 16.0),
                ),
                0.0,
                Color32::from_rgb(100, 100, 120),
            );
            action = render_inline(ui, spans, 16.0);
        });

    ui.add_space(8.0);
    action
}

/// Render a horizontal rule
pub fn render_horizontal_rule(ui: &mut Ui) {
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);
}

/// Render a table, with a bold header row when one was parsed
pub fn render_table(ui: &mut Ui, headers: &[String], rows: &[Vec<String>]) {
    use egui_extras::{Column, TableBuilder};

    let num_cols = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0)
        .max(1);

    // Each table needs its own id so column widths are not shared
    let id = ui.next_auto_id();
    ui.push_id(id, |ui| {
        let table = TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(Column::auto().at_least(60.0), num_cols);

        let body = |mut body: egui_extras::TableBody<'_>| {
            for row in rows {
                body.row(20.0, |mut row_ui| {
                    for col in 0..num_cols {
                        row_ui.col(|ui| {
                            ui.label(row.get(col).map_or("", String::as_str));
                        });
                    }
                });
            }
        };

        if headers.is_empty() {
            table.body(body);
        } else {
            table
                .header(22.0, |mut header| {
                    for col in 0..num_cols {
                        header.col(|ui| {
                            ui.strong(headers.get(col).map_or("", String::as_str));
                        });
                    }
                })
                .body(body);
        }
    });

    ui.add_space(8.0);
}

/// Render an image loaded by the egui_extras loaders, with its alt text as caption
pub fn render_image(ui: &mut Ui, alt: &str, url: &str) {
    let max_width = ui.available_width().min(720.0);

    ui.vertical_centered(|ui| {
        ui.add_space(8.0);
        let response = ui.add(
            egui::Image::from_uri(url.to_string())
                .max_width(max_width)
                .show_loading_spinner(true),
        );
        if !alt.is_empty() {
            response.on_hover_text(alt);
            ui.label(
                RichText::new(alt)
                    .italics()
                    .size(13.0)
                    .color(Color32::from_rgb(140, 140, 140)),
            );
        }
        ui.add_space(8.0);
    });
}
