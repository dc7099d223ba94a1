//! # document: writer seam for paginated report output
//!
//! This module defines the [`DocumentWriter`] trait, the single seam between
//! the report assembler and whatever renders the final document, plus the
//! bundled [`PdfWriter`] implementation backed by `printpdf`.
//!
//! ## Interface & Extensibility
//! - Implement [`DocumentWriter`] to target another format (HTML, plain text,
//!   a remote rendering service, ...). The assembler only ever talks to the
//!   trait.
//! - All methods are async, returning results and using boxed error types.
//! - The trait is annotated for `mockall` so tests can verify the exact
//!   sequence of writer calls without rendering anything.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Point, Pt, TextItem,
};
use tracing::debug;

/// Error type shared by all writer implementations.
pub type WriteError = Box<dyn std::error::Error + Send + Sync>;

/// Ordered, append-only interface for building a paginated document.
///
/// Callers are expected to cap heading levels themselves; implementations
/// may render unknown levels however they see fit.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    /// Append a heading at the given level (1 = largest).
    async fn add_heading(&mut self, text: String, level: usize) -> Result<(), WriteError>;

    /// Append a prose paragraph.
    async fn add_paragraph(&mut self, text: String) -> Result<(), WriteError>;

    /// Append one bulleted list item.
    async fn add_bullet(&mut self, text: String) -> Result<(), WriteError>;

    /// Append a monospaced, verbatim block (blank lines preserved).
    async fn add_code_block(&mut self, text: String) -> Result<(), WriteError>;

    /// Force the next content onto a fresh page.
    async fn add_page_break(&mut self) -> Result<(), WriteError>;

    /// Finalise the document and return its rendered bytes.
    async fn finish(&mut self) -> Result<Vec<u8>, WriteError>;
}

// A4 geometry in millimetres, one-inch margins as in the reports this
// replaces.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 25.4;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const CODE_INDENT: f32 = 6.35;

const PT_TO_MM: f32 = 0.352_778;
// Approximate advance width per character, as a fraction of the font size.
const PROSE_CHAR_FRACTION: f32 = 0.5;
const CODE_CHAR_FRACTION: f32 = 0.6;

/// `printpdf`-backed [`DocumentWriter`]: A4 pages, Helvetica prose, Courier
/// code blocks, naive character-count wrapping and automatic page overflow.
pub struct PdfWriter {
    title: String,
    pages: Vec<PdfPage>,
    ops: Vec<Op>,
    /// Baseline of the next line, in mm from the bottom edge.
    cursor_y: f32,
}

impl PdfWriter {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            pages: Vec::new(),
            ops: Vec::new(),
            cursor_y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn break_page(&mut self) {
        self.pages.push(PdfPage::new(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            std::mem::take(&mut self.ops),
        ));
        self.cursor_y = PAGE_HEIGHT - MARGIN;
    }

    /// Emit a single visual line at the current cursor, breaking the page
    /// first if it would land inside the bottom margin.
    fn put_line(&mut self, text: &str, size: f32, font: BuiltinFont, x: f32) {
        let line_height = size * PT_TO_MM * 1.5;
        if self.cursor_y - line_height < MARGIN {
            self.break_page();
        }
        self.cursor_y -= line_height;
        self.ops.extend([
            Op::StartTextSection,
            Op::SetTextCursor {
                pos: Point {
                    x: Mm(x).into(),
                    y: Mm(self.cursor_y).into(),
                },
            },
            Op::SetFontSizeBuiltinFont {
                size: Pt(size),
                font,
            },
            Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(text.to_string())],
                font,
            },
            Op::EndTextSection,
        ]);
    }

    fn put_blank(&mut self, size: f32) {
        let line_height = size * PT_TO_MM * 1.5;
        if self.cursor_y - line_height < MARGIN {
            self.break_page();
        } else {
            self.cursor_y -= line_height;
        }
    }

    fn put_wrapped(&mut self, text: &str, size: f32, font: BuiltinFont, indent: f32) {
        let fraction = match font {
            BuiltinFont::Courier | BuiltinFont::CourierBold => CODE_CHAR_FRACTION,
            _ => PROSE_CHAR_FRACTION,
        };
        let char_width = size * PT_TO_MM * fraction;
        let columns = ((CONTENT_WIDTH - indent) / char_width).max(1.0) as usize;
        for line in wrap(text, columns) {
            self.put_line(&line, size, font, MARGIN + indent);
        }
    }
}

#[async_trait]
impl DocumentWriter for PdfWriter {
    async fn add_heading(&mut self, text: String, level: usize) -> Result<(), WriteError> {
        let size = match level {
            1 => 18.0,
            2 => 14.0,
            _ => 12.0,
        };
        self.put_blank(size * 0.5);
        if level == 1 {
            // Top-level headings are centred, like the cover page titles.
            let width = text.chars().count() as f32 * size * PT_TO_MM * PROSE_CHAR_FRACTION;
            let x = MARGIN + ((CONTENT_WIDTH - width) / 2.0).max(0.0);
            self.put_line(&text, size, BuiltinFont::HelveticaBold, x);
        } else {
            self.put_wrapped(&text, size, BuiltinFont::HelveticaBold, 0.0);
        }
        self.put_blank(size * 0.25);
        Ok(())
    }

    async fn add_paragraph(&mut self, text: String) -> Result<(), WriteError> {
        self.put_wrapped(&text, 10.0, BuiltinFont::Helvetica, 0.0);
        self.put_blank(5.0);
        Ok(())
    }

    async fn add_bullet(&mut self, text: String) -> Result<(), WriteError> {
        self.put_wrapped(&format!("- {text}"), 10.0, BuiltinFont::Helvetica, 5.0);
        Ok(())
    }

    async fn add_code_block(&mut self, text: String) -> Result<(), WriteError> {
        // Verbatim content: hard-split long lines by character count so
        // leading whitespace and tree connectors survive untouched.
        let char_width = 9.0 * PT_TO_MM * CODE_CHAR_FRACTION;
        let columns = ((CONTENT_WIDTH - CODE_INDENT) / char_width).max(1.0) as usize;
        for line in text.lines() {
            if line.is_empty() {
                self.put_blank(9.0);
                continue;
            }
            let chars: Vec<char> = line.chars().collect();
            for chunk in chars.chunks(columns) {
                let piece: String = chunk.iter().collect();
                self.put_line(&piece, 9.0, BuiltinFont::Courier, MARGIN + CODE_INDENT);
            }
        }
        self.put_blank(5.0);
        Ok(())
    }

    async fn add_page_break(&mut self) -> Result<(), WriteError> {
        self.break_page();
        Ok(())
    }

    async fn finish(&mut self) -> Result<Vec<u8>, WriteError> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.break_page();
        }
        let pages = std::mem::take(&mut self.pages);
        debug!(pages = pages.len(), title = %self.title, "Rendering PDF");
        let mut warnings = Vec::new();
        let bytes = PdfDocument::new(&self.title)
            .with_pages(pages)
            .save(&PdfSaveOptions::default(), &mut warnings);
        for warning in &warnings {
            debug!(warning = ?warning, "printpdf warning");
        }
        Ok(bytes)
    }
}

/// Greedy word wrap at `columns` characters; words longer than a full line
/// are hard-split.
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();
        if current.is_empty() {
            current.push_str(word);
        } else if current_len + 1 + word_len <= columns {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
        while current.chars().count() > columns {
            let head: String = current.chars().take(columns).collect();
            let tail: String = current.chars().skip(columns).collect();
            lines.push(head);
            current = tail;
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
