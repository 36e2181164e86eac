//! Html block parsing for the chapter viewer
//!
//! Study material is a small subset of html (headings, paragraphs, lists,
//! tables, emphasis, links, images, code). The document is parsed with
//! `scraper` and its node tree is walked as a stream of start/text/end events,
//! producing a flat list of blocks that the block renderer draws with egui
//! widgets. Tags outside the subset are dropped but their text is kept;
//! `script` and `style` bodies are skipped entirely.

use scraper::node::{Element, Node};
use scraper::{ElementRef, Html};

/// Inline text with the styles active where it appeared
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InlineSpan {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    /// Target of an enclosing `<a href>`
    pub link: Option<String>,
    /// Forced line break (`<br>`), `text` is empty
    pub line_break: bool,
}

impl InlineSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A parsed block of study material
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedBlock {
    /// `h1`..`h6`
    Heading { level: u8, spans: Vec<InlineSpan> },

    /// `p`, `div` or loose text
    Paragraph { spans: Vec<InlineSpan> },

    /// `ul` / `ol`, nested lists flattened into their outermost list
    List {
        ordered: bool,
        items: Vec<Vec<InlineSpan>>,
    },

    /// `table`; `headers` is empty when the first row has no `th` cells
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },

    /// `pre`
    CodeBlock { code: String },

    /// `blockquote`
    BlockQuote { spans: Vec<InlineSpan> },

    /// `img`
    Image { alt: String, url: String },

    /// `hr`
    HorizontalRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenBlock {
    Heading(u8),
    Paragraph,
    ListItem,
    Quote,
}

#[derive(Default)]
struct TableState {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    header_row: bool,
    in_head: bool,
    cell: Option<String>,
    /// Tables nested inside a cell only contribute their text
    nested: usize,
}

#[derive(Default)]
struct Parser {
    blocks: Vec<ParsedBlock>,
    current: Option<OpenBlock>,
    spans: Vec<InlineSpan>,
    bold: usize,
    italic: usize,
    code: usize,
    link: Option<String>,
    list: Option<(bool, Vec<Vec<InlineSpan>>)>,
    list_depth: usize,
    table: Option<TableState>,
    pre: Option<String>,
}

/// Parse html into renderable blocks
pub fn parse_blocks(html: &str) -> Vec<ParsedBlock> {
    let fragment = Html::parse_fragment(html);
    let mut parser = Parser::default();
    parser.walk(fragment.root_element());
    parser.finish()
}

impl Parser {
    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    let name = child.value().name();
                    if matches!(name, "script" | "style" | "template" | "head") {
                        continue;
                    }
                    self.start_tag(child.value());
                    self.walk(child);
                    self.end_tag(name);
                }
                _ => {}
            }
        }
    }

    fn text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }

        if let Some(table) = self.table.as_mut() {
            if let Some(cell) = table.cell.as_mut() {
                cell.push_str(raw);
            }
            return;
        }

        if let Some(pre) = self.pre.as_mut() {
            pre.push_str(raw);
            return;
        }

        let collapsed = collapse_whitespace(raw);
        if collapsed.trim().is_empty() {
            // Whitespace only matters between words of an open block
            if self.current.is_some() && !self.spans.is_empty() {
                self.push_text(" ");
            }
            return;
        }

        if self.current.is_none() {
            self.current = Some(OpenBlock::Paragraph);
        }
        self.push_text(&collapsed);
    }

    fn push_text(&mut self, text: &str) {
        let span = InlineSpan {
            text: text.to_string(),
            bold: self.bold > 0,
            italic: self.italic > 0,
            code: self.code > 0,
            link: self.link.clone(),
            line_break: false,
        };

        // Merge with the previous span when the style is unchanged
        if let Some(last) = self.spans.last_mut() {
            if !last.line_break
                && last.bold == span.bold
                && last.italic == span.italic
                && last.code == span.code
                && last.link == span.link
            {
                if !(text == " " && last.text.ends_with(' ')) {
                    last.text.push_str(text);
                }
                return;
            }
        }
        self.spans.push(span);
    }

    fn push_line_break(&mut self) {
        self.spans.push(InlineSpan {
            line_break: true,
            ..Default::default()
        });
    }

    /// Paragraph-like tags stay inline inside list items and quotes
    fn inside_container(&self) -> bool {
        matches!(self.current, Some(OpenBlock::ListItem | OpenBlock::Quote))
    }

    fn start_tag(&mut self, element: &Element) {
        let name = element.name();
        if let Some(table) = self.table.as_mut() {
            table.start_tag(name);
            return;
        }

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush_block();
                let level = name[1..].parse().unwrap_or(1);
                self.current = Some(OpenBlock::Heading(level));
            }
            "p" | "div" | "section" | "article" => {
                if !self.inside_container() {
                    self.flush_block();
                    self.current = Some(OpenBlock::Paragraph);
                }
            }
            "blockquote" => {
                self.flush_block();
                self.current = Some(OpenBlock::Quote);
            }
            "ul" | "ol" => {
                self.flush_block();
                if self.list_depth == 0 {
                    self.list = Some((name == "ol", Vec::new()));
                }
                self.list_depth += 1;
            }
            "li" => {
                self.flush_block();
                self.current = Some(OpenBlock::ListItem);
            }
            "table" => {
                self.flush_block();
                self.table = Some(TableState::default());
            }
            "br" => {
                if let Some(pre) = self.pre.as_mut() {
                    pre.push('\n');
                } else if self.current.is_some() {
                    self.push_line_break();
                }
            }
            "hr" => {
                self.flush_block();
                self.blocks.push(ParsedBlock::HorizontalRule);
            }
            "img" => {
                let url = element.attr("src").unwrap_or_default().to_string();
                let alt = element.attr("alt").unwrap_or_default().to_string();
                if self.current == Some(OpenBlock::ListItem) {
                    self.italic += 1;
                    self.push_text(&alt);
                    self.italic -= 1;
                } else if !url.is_empty() {
                    self.flush_block();
                    self.blocks.push(ParsedBlock::Image { alt, url });
                }
            }
            "pre" => {
                self.flush_block();
                self.pre = Some(String::new());
            }
            "code" => {
                if self.pre.is_none() {
                    self.code += 1;
                }
            }
            "strong" | "b" => self.bold += 1,
            "em" | "i" => self.italic += 1,
            "a" => self.link = element.attr("href").map(str::to_string),
            _ => {}
        }
    }

    fn end_tag(&mut self, name: &str) {
        if let Some(table) = self.table.as_mut() {
            if table.end_tag(name) {
                self.flush_table();
            }
            return;
        }

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" => self.flush_block(),
            "p" | "div" | "section" | "article" => {
                if self.current == Some(OpenBlock::Quote) {
                    if !self.spans.is_empty() {
                        self.push_line_break();
                    }
                } else if self.current != Some(OpenBlock::ListItem) {
                    self.flush_block();
                }
            }
            "li" => self.flush_block(),
            "ul" | "ol" => {
                self.flush_block();
                self.list_depth = self.list_depth.saturating_sub(1);
                if self.list_depth == 0 {
                    self.flush_list();
                }
            }
            "pre" => {
                if let Some(code) = self.pre.take() {
                    self.blocks.push(ParsedBlock::CodeBlock {
                        code: code.trim_matches('\n').to_string(),
                    });
                }
            }
            "code" => self.code = self.code.saturating_sub(1),
            "strong" | "b" => self.bold = self.bold.saturating_sub(1),
            "em" | "i" => self.italic = self.italic.saturating_sub(1),
            "a" => self.link = None,
            _ => {}
        }
    }

    /// Close the open block, dropping it if it holds no visible text
    fn flush_block(&mut self) {
        let Some(kind) = self.current.take() else {
            self.spans.clear();
            return;
        };
        let spans = trim_spans(std::mem::take(&mut self.spans));
        if spans.is_empty() {
            return;
        }

        match kind {
            OpenBlock::Heading(level) => self.blocks.push(ParsedBlock::Heading { level, spans }),
            OpenBlock::Paragraph => self.blocks.push(ParsedBlock::Paragraph { spans }),
            OpenBlock::Quote => self.blocks.push(ParsedBlock::BlockQuote { spans }),
            OpenBlock::ListItem => match self.list.as_mut() {
                Some((_, items)) => items.push(spans),
                None => self.blocks.push(ParsedBlock::Paragraph { spans }),
            },
        }
    }

    fn flush_list(&mut self) {
        if let Some((ordered, items)) = self.list.take() {
            if !items.is_empty() {
                self.blocks.push(ParsedBlock::List { ordered, items });
            }
        }
    }

    fn flush_table(&mut self) {
        if let Some(mut table) = self.table.take() {
            table.finish_row();
            if !table.headers.is_empty() || !table.rows.is_empty() {
                self.blocks.push(ParsedBlock::Table {
                    headers: table.headers,
                    rows: table.rows,
                });
            }
        }
    }

    fn finish(mut self) -> Vec<ParsedBlock> {
        if let Some(code) = self.pre.take() {
            self.blocks.push(ParsedBlock::CodeBlock {
                code: code.trim_matches('\n').to_string(),
            });
        }
        self.flush_table();
        self.flush_block();
        self.flush_list();
        self.blocks
    }
}

impl TableState {
    fn start_tag(&mut self, name: &str) {
        if self.nested > 0 {
            if name == "table" {
                self.nested += 1;
            }
            return;
        }

        match name {
            "table" => self.nested += 1,
            "thead" => self.in_head = true,
            "tr" => {
                self.finish_row();
                self.header_row = self.in_head;
            }
            "th" | "td" => {
                self.finish_cell();
                self.header_row |= name == "th";
                self.cell = Some(String::new());
            }
            "br" => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.push(' ');
                }
            }
            _ => {}
        }
    }

    /// Returns true when the outermost table closes
    fn end_tag(&mut self, name: &str) -> bool {
        if self.nested > 0 {
            if name == "table" {
                self.nested -= 1;
            }
            return false;
        }

        match name {
            "table" => return true,
            "thead" => {
                self.finish_row();
                self.in_head = false;
            }
            "th" | "td" => self.finish_cell(),
            "tr" => self.finish_row(),
            _ => {}
        }
        false
    }

    fn finish_cell(&mut self) {
        if let Some(cell) = self.cell.take() {
            self.row.push(collapse_whitespace(&cell).trim().to_string());
        }
    }

    fn finish_row(&mut self) {
        self.finish_cell();
        if self.row.is_empty() {
            return;
        }
        let row = std::mem::take(&mut self.row);
        if self.header_row && self.headers.is_empty() && self.rows.is_empty() {
            self.headers = row;
        } else {
            self.rows.push(row);
        }
        self.header_row = false;
    }
}

/// Strip leading/trailing whitespace and empty spans from a block
fn trim_spans(mut spans: Vec<InlineSpan>) -> Vec<InlineSpan> {
    while let Some(first) = spans.first_mut() {
        let trimmed = first.text.trim_start();
        if first.line_break || trimmed.is_empty() {
            spans.remove(0);
            continue;
        }
        first.text = trimmed.to_string();
        break;
    }
    while let Some(last) = spans.last_mut() {
        let trimmed = last.text.trim_end();
        if last.line_break || trimmed.is_empty() {
            spans.pop();
            continue;
        }
        last.text = trimmed.to_string();
        break;
    }
    spans
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::FALLBACK_CONTENT;

    fn texts(spans: &[InlineSpan]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_fallback_content_is_one_paragraph() {
        let blocks = parse_blocks(FALLBACK_CONTENT);
        assert_eq!(
            blocks,
            vec![ParsedBlock::Paragraph {
                spans: vec![InlineSpan::plain(
                    "No content available for this chapter yet. Please check back later."
                )]
            }]
        );
    }

    #[test]
    fn test_headings_and_emphasis() {
        let blocks = parse_blocks(
            "<h1>Optics</h1>\n<h2>Reflection</h2>\n\
<p>Light <strong>bounces</strong> off <em>mirrors</em>.</p>",
        );
        assert_eq!(blocks.len(), 3);
        match &blocks[1] {
            ParsedBlock::Heading { level, spans } => {
                assert_eq!(*level, 2);
                assert_eq!(texts(spans), "Reflection");
            }
            other => panic!("expected heading, got {other:?}"),
        }
        let ParsedBlock::Paragraph { spans } = &blocks[2] else {
            panic!("expected paragraph");
        };
        assert_eq!(texts(spans), "Light bounces off mirrors.");
        assert!(spans.iter().any(|s| s.bold && s.text == "bounces"));
        assert!(spans.iter().any(|s| s.italic && s.text == "mirrors"));
    }

    #[test]
    fn test_named_entities_are_decoded() {
        let blocks = parse_blocks(
            "<p>Newton&rsquo;s law: a = 9.8 m/s&sup2; &ldquo;g&rdquo; &times; &Omega; &#x3A9;</p>",
        );
        let ParsedBlock::Paragraph { spans } = &blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            texts(spans),
            "Newton\u{2019}s law: a = 9.8 m/s\u{b2} \u{201c}g\u{201d} \u{d7} \u{3a9} \u{3a9}"
        );
    }

    #[test]
    fn test_lists() {
        let blocks = parse_blocks(
            "<ol>\n  <li>Incident ray</li>\n  <li>Reflected <b>ray</b></li>\n</ol>\
<ul><li>Normal<ul><li>Nested</li></ul></li></ul>",
        );
        assert_eq!(blocks.len(), 2);
        let ParsedBlock::List { ordered, items } = &blocks[0] else {
            panic!("expected list");
        };
        assert!(*ordered);
        assert_eq!(items.len(), 2);
        assert_eq!(texts(&items[1]), "Reflected ray");

        let ParsedBlock::List { ordered, items } = &blocks[1] else {
            panic!("expected list");
        };
        assert!(!*ordered);
        assert_eq!(items.iter().map(|i| texts(i)).collect::<Vec<_>>(), ["Normal", "Nested"]);
    }

    #[test]
    fn test_table_with_header_row() {
        let blocks = parse_blocks(
            "<p>Units</p><table><tr><th>Quantity</th><th>Unit</th></tr>\
<tr><td>Force</td><td>Newton</td></tr><tr><td>Work</td><td> Joule\n</td></tr></table>",
        );
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[1],
            ParsedBlock::Table {
                headers: vec!["Quantity".to_string(), "Unit".to_string()],
                rows: vec![
                    vec!["Force".to_string(), "Newton".to_string()],
                    vec!["Work".to_string(), "Joule".to_string()],
                ],
            }
        );
    }

    #[test]
    fn test_table_without_header_and_following_text() {
        let blocks = parse_blocks(
            "<table><tbody><tr><td><b>g</b></td><td>9.8 m/s&sup2;</td></tr></tbody></table>\
<p>Next</p>",
        );
        assert_eq!(
            blocks[0],
            ParsedBlock::Table {
                headers: Vec::new(),
                rows: vec![vec!["g".to_string(), "9.8 m/s\u{b2}".to_string()]],
            }
        );
        assert!(matches!(&blocks[1], ParsedBlock::Paragraph { spans } if texts(spans) == "Next"));
    }

    #[test]
    fn test_paragraphs_inside_blockquote_stay_quoted() {
        let blocks =
            parse_blocks("<blockquote><p>Energy is conserved.</p><p>Always.</p></blockquote>");
        assert_eq!(blocks.len(), 1);
        let ParsedBlock::BlockQuote { spans } = &blocks[0] else {
            panic!("expected blockquote, got {:?}", blocks[0]);
        };
        assert_eq!(spans[0].text, "Energy is conserved.");
        assert!(spans[1].line_break);
        assert_eq!(spans[2].text, "Always.");
        assert_eq!(spans.len(), 3);
    }

    #[test]
    fn test_inserted_image_becomes_block() {
        let html = format!(
            "<p>Before</p>{}<p>After</p>",
            crate::core::document::image_tag("https://e.x/ray.png", "Ray &amp; mirror")
        );
        let blocks = parse_blocks(&html);
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[1],
            ParsedBlock::Image {
                alt: "Ray & mirror".to_string(),
                url: "https://e.x/ray.png".to_string()
            }
        );
    }

    #[test]
    fn test_links_and_line_breaks() {
        let blocks = parse_blocks("<p>See <a href='https://ncert.nic.in'>NCERT</a><br/>today</p>");
        let ParsedBlock::Paragraph { spans } = &blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(spans[1].link.as_deref(), Some("https://ncert.nic.in"));
        assert!(spans[2].line_break);
        assert_eq!(spans[3].text, "today");
    }

    #[test]
    fn test_pre_keeps_whitespace() {
        let blocks = parse_blocks("<pre><code>for i in 0..3 {\n    print(i)\n}</code></pre>");
        assert_eq!(
            blocks,
            vec![ParsedBlock::CodeBlock {
                code: "for i in 0..3 {\n    print(i)\n}".to_string()
            }]
        );
    }

    #[test]
    fn test_loose_text_unknown_tags_and_scripts() {
        let blocks = parse_blocks(
            "Generating content with AI... Please wait.\
<script>alert(1)</script><span>kept</span><!-- hidden -->",
        );
        assert_eq!(blocks.len(), 1);
        let ParsedBlock::Paragraph { spans } = &blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(texts(spans), "Generating content with AI... Please wait.kept");
    }

    #[test]
    fn test_empty_blocks_are_dropped() {
        assert!(parse_blocks("<p>  </p><h2></h2><ul></ul><table></table>").is_empty());
        assert_eq!(parse_blocks("<hr>"), vec![ParsedBlock::HorizontalRule]);
    }
}
