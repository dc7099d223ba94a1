//! Line-oriented parser for the markdown subset used in report inputs.
//!
//! Supported constructs: `#`-headings, prose/list lines, and ``` fenced code
//! blocks. Everything else (emphasis, links, tables, nested lists) passes
//! through as plain body text.

use tracing::debug;

/// One parsed unit of a markup document, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// A heading and the non-blank prose/list lines that follow it.
    Section {
        title: String,
        level: usize,
        body: String,
    },
    /// Verbatim text between a pair of ``` fences, blank lines included.
    CodeBlock { body: String },
}

/// A heading whose body is still accumulating.
struct OpenSection {
    title: String,
    level: usize,
    body: Vec<String>,
}

impl OpenSection {
    fn into_block(self) -> ContentBlock {
        ContentBlock::Section {
            title: self.title,
            level: self.level,
            body: self.body.join("\n"),
        }
    }
}

/// Parser state. A fence does not close the open section: the section is
/// carried through the code block and its body keeps accumulating after the
/// closing fence.
enum State {
    Prose { open: Option<OpenSection> },
    Code { open: Option<OpenSection>, lines: Vec<String> },
}

const FENCE: &str = "```";

/// Parse `text` into an ordered sequence of content blocks.
///
/// Sections with no non-blank body lines are omitted. Lines before the first
/// heading are discarded. An unterminated fence absorbs the rest of the input
/// and emits nothing for it.
pub fn parse(text: &str) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut state = State::Prose { open: None };

    for line in text.lines() {
        state = match state {
            State::Prose { mut open } => {
                if line.trim().starts_with(FENCE) {
                    State::Code {
                        open,
                        lines: Vec::new(),
                    }
                } else if line.starts_with('#') {
                    if let Some(section) = open.take() {
                        if !section.body.is_empty() {
                            blocks.push(section.into_block());
                        }
                    }
                    let level = line.chars().take_while(|&c| c == '#').count();
                    let title = line.trim_start_matches('#').trim().to_string();
                    State::Prose {
                        open: Some(OpenSection {
                            title,
                            level,
                            body: Vec::new(),
                        }),
                    }
                } else {
                    if !line.trim().is_empty() {
                        // Body lines only count once a heading has opened a section.
                        if let Some(section) = open.as_mut() {
                            section.body.push(line.to_string());
                        }
                    }
                    State::Prose { open }
                }
            }
            State::Code { open, mut lines } => {
                if line.trim().starts_with(FENCE) {
                    blocks.push(ContentBlock::CodeBlock {
                        body: lines.join("\n"),
                    });
                    State::Prose { open }
                } else {
                    lines.push(line.to_string());
                    State::Code { open, lines }
                }
            }
        };
    }

    let open = match state {
        State::Prose { open } => open,
        State::Code { open, lines } => {
            // Unterminated fence: the accumulated code lines are dropped, but
            // the section that was open before the fence still gets emitted.
            debug!(
                dropped_lines = lines.len(),
                "Input ended inside an unterminated code fence"
            );
            open
        }
    };
    if let Some(section) = open {
        if !section.body.is_empty() {
            blocks.push(section.into_block());
        }
    }

    blocks
}
