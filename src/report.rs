//! High-level pipeline: orchestrates parse → render → write for one report.
//!
//! This module assembles the full report described by a [`ReportConfig`]:
//!   - Writes a cover page (title, subtitle, timestamp, git metadata)
//!   - Writes a contents page listing the report's top-level headings
//!   - Parses each configured markup document and writes its blocks
//!   - Renders the repository layout tree into a code block
//!   - Writes optional inventory sections and the conclusion
//!   - Aggregates and returns a [`ReportSummary`] of what was written.
//!
//! The assembler only ever talks to the [`DocumentWriter`] seam; tests drive
//! it with a mock writer, the CLI with [`crate::document::PdfWriter`].
//!
//! # Error Handling
//! Each failed writer call returns immediately with a formatted error;
//! callers should log and surface these to users/test logs. Missing input
//! documents and missing inventory directories are skipped with a warning,
//! never an error.

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::document::DocumentWriter;
use crate::gitinfo;
use crate::markup::{self, ContentBlock};
use crate::tree::{self, TreeOptions};

/// The top-level report configuration.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub repo_path: PathBuf,
    pub output_file: PathBuf,
    pub title: String,
    pub subtitle: String,
    /// Closing paragraph; omitted entirely when `None`.
    pub conclusion: Option<String>,
    pub documents: Vec<DocumentInput>,
    pub tree: TreeOptions,
    pub inventories: Vec<InventorySection>,
}

/// One markup document to parse and write, relative to the repo root.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub path: PathBuf,
    /// Extra level-1 heading written before the document's own sections.
    pub heading: Option<String>,
}

/// A directory whose immediate children are listed as bullets.
#[derive(Debug, Clone)]
pub struct InventorySection {
    pub heading: String,
    pub dir: PathBuf,
}

/// What was written, for CLI display and audit.
#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub documents: usize,
    pub sections: usize,
    pub code_blocks: usize,
    pub tree_lines: usize,
}

/// Entrypoint: assemble the whole report into `writer` according to config.
///
/// The caller is responsible for calling `writer.finish()` afterwards and
/// persisting the bytes.
pub async fn generate<W>(config: &ReportConfig, writer: &mut W) -> Result<ReportSummary, String>
where
    W: DocumentWriter,
{
    info!(repo = %config.repo_path.display(), "[REPORT] Starting report assembly");

    let mut summary = ReportSummary {
        documents: 0,
        sections: 0,
        code_blocks: 0,
        tree_lines: 0,
    };

    // --- Cover page ---
    write(writer.add_heading(config.title.clone(), 1).await, "cover title")?;
    write(
        writer.add_heading(config.subtitle.clone(), 2).await,
        "cover subtitle",
    )?;
    let generated = Local::now().format("%d/%m/%Y %H:%M:%S");
    write(
        writer.add_paragraph(format!("Generated: {generated}")).await,
        "cover timestamp",
    )?;
    write(
        writer.add_paragraph(gitinfo::describe(&config.repo_path)).await,
        "cover git info",
    )?;
    write(writer.add_page_break().await, "cover page break")?;

    // --- Contents page ---
    write(writer.add_heading("Contents".to_string(), 1).await, "contents heading")?;
    for entry in contents_entries(config) {
        write(writer.add_paragraph(entry).await, "contents entry")?;
    }
    write(writer.add_page_break().await, "contents page break")?;

    // --- Markup documents ---
    for document in &config.documents {
        let path = config.repo_path.join(&document.path);
        if !path.exists() {
            warn!(path = %path.display(), "[REPORT] Document not found, skipping");
            continue;
        }
        info!(path = %path.display(), "[REPORT] Processing document");
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                error!(error = ?e, path = %path.display(), "[REPORT][ERROR] Failed to read document");
                return Err(format!("Failed to read document {}: {e}", path.display()));
            }
        };

        if let Some(heading) = &document.heading {
            write(writer.add_page_break().await, "document page break")?;
            write(writer.add_heading(heading.clone(), 1).await, "document heading")?;
        }

        let blocks = markup::parse(&text);
        debug!(blocks = blocks.len(), path = %path.display(), "[REPORT] Parsed document");
        for block in blocks {
            match block {
                ContentBlock::Section { title, level, body } => {
                    write(
                        writer.add_heading(title, level.min(3)).await,
                        "section heading",
                    )?;
                    write_section_body(writer, &body).await?;
                    summary.sections += 1;
                }
                ContentBlock::CodeBlock { body } => {
                    write(writer.add_code_block(body).await, "code block")?;
                    summary.code_blocks += 1;
                }
            }
        }
        summary.documents += 1;
    }

    // --- Repository layout ---
    write(writer.add_page_break().await, "layout page break")?;
    write(
        writer.add_heading("Repository Layout".to_string(), 1).await,
        "layout heading",
    )?;
    write(
        writer
            .add_paragraph("Directory and file layout of the project:".to_string())
            .await,
        "layout intro",
    )?;
    let lines = tree::render(&config.repo_path, &config.tree);
    info!(lines = lines.len(), "[REPORT] Rendered repository tree");
    if !lines.is_empty() {
        summary.tree_lines = lines.len();
        write(writer.add_code_block(lines.join("\n")).await, "layout tree")?;
    }

    // --- Inventories ---
    if !config.inventories.is_empty() {
        write(writer.add_page_break().await, "inventory page break")?;
        write(
            writer.add_heading("Component Inventory".to_string(), 1).await,
            "inventory heading",
        )?;
        for inventory in &config.inventories {
            write_inventory(config, writer, inventory).await?;
        }
    }

    // --- Conclusion ---
    if let Some(conclusion) = &config.conclusion {
        write(writer.add_page_break().await, "conclusion page break")?;
        write(
            writer.add_heading("Conclusion".to_string(), 1).await,
            "conclusion heading",
        )?;
        write(writer.add_paragraph(conclusion.clone()).await, "conclusion body")?;
    }

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => debug!(json = %json, "[REPORT] Summary"),
        Err(e) => error!(error = ?e, "[REPORT] Failed to serialize summary as JSON"),
    }

    Ok(summary)
}

/// A section body renders as bullets when its first line is a `-`/`*` list,
/// otherwise as a single paragraph.
async fn write_section_body<W>(writer: &mut W, body: &str) -> Result<(), String>
where
    W: DocumentWriter,
{
    if body.is_empty() {
        return Ok(());
    }
    let trimmed = body.trim_start();
    if trimmed.starts_with('-') || trimmed.starts_with('*') {
        for line in body.lines() {
            let item = line
                .trim()
                .trim_start_matches(['-', '*'])
                .trim()
                .to_string();
            write(writer.add_bullet(item).await, "section bullet")?;
        }
    } else {
        write(writer.add_paragraph(body.to_string()).await, "section body")?;
    }
    Ok(())
}

async fn write_inventory<W>(
    config: &ReportConfig,
    writer: &mut W,
    inventory: &InventorySection,
) -> Result<(), String>
where
    W: DocumentWriter,
{
    let dir = config.repo_path.join(&inventory.dir);
    if !dir.is_dir() {
        warn!(path = %dir.display(), "[REPORT] Inventory directory not found, skipping");
        return Ok(());
    }
    write(
        writer.add_heading(inventory.heading.clone(), 2).await,
        "inventory section heading",
    )?;

    let mut names: Vec<String> = match fs::read_dir(&dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| !name.starts_with('.'))
            .collect(),
        Err(e) => {
            warn!(error = ?e, path = %dir.display(), "[REPORT] Failed to list inventory directory");
            return Ok(());
        }
    };
    names.sort();

    for name in names {
        write(writer.add_bullet(name.clone()).await, "inventory entry")?;
        if let Some(description) = manifest_description(&dir.join(&name)) {
            write(
                writer.add_paragraph(format!("Description: {description}")).await,
                "inventory description",
            )?;
        }
    }
    Ok(())
}

/// `description` field of an entry's `package.json`, when present and valid.
fn manifest_description(entry: &std::path::Path) -> Option<String> {
    let manifest = entry.join("package.json");
    let raw = fs::read_to_string(manifest).ok()?;
    let value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = ?e, path = %entry.display(), "Unparseable package.json, ignoring");
            return None;
        }
    };
    value
        .get("description")
        .and_then(|d| d.as_str())
        .map(String::from)
}

fn write(result: Result<(), crate::document::WriteError>, step: &str) -> Result<(), String> {
    result.map_err(|e| {
        error!(error = ?e, step = step, "[REPORT][ERROR] Writer call failed");
        format!("[WRITE fail @ {step}]: {e:?}")
    })
}

fn contents_entries(config: &ReportConfig) -> Vec<String> {
    let mut entries = Vec::new();
    for document in &config.documents {
        let label = document
            .heading
            .clone()
            .unwrap_or_else(|| document.path.display().to_string());
        entries.push(label);
    }
    entries.push("Repository Layout".to_string());
    if !config.inventories.is_empty() {
        entries.push("Component Inventory".to_string());
    }
    if config.conclusion.is_some() {
        entries.push("Conclusion".to_string());
    }
    entries
}
