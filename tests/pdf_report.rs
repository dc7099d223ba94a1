use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use tempfile::tempdir;

use repo_report::document::{DocumentWriter, PdfWriter};
use repo_report::report::{generate, DocumentInput, ReportConfig};
use repo_report::tree::TreeOptions;

#[tokio::test]
async fn test_full_pipeline_produces_valid_pdf_bytes() {
    let tmp = tempdir().unwrap();
    let repo = tmp.path().to_path_buf();

    let mut readme = File::create(repo.join("README.md")).unwrap();
    writeln!(readme, "# Demo").unwrap();
    writeln!(readme, "A small project used for PDF smoke testing.").unwrap();
    writeln!(readme, "```").unwrap();
    writeln!(readme, "cargo run").unwrap();
    writeln!(readme, "```").unwrap();
    writeln!(readme, "## Usage").unwrap();
    writeln!(readme, "- build it").unwrap();
    writeln!(readme, "- ship it").unwrap();

    let config = ReportConfig {
        repo_path: repo,
        output_file: PathBuf::from("unused.pdf"),
        title: "Demo".to_string(),
        subtitle: "Smoke Test".to_string(),
        conclusion: Some("That is all.".to_string()),
        documents: vec![DocumentInput {
            path: PathBuf::from("README.md"),
            heading: None,
        }],
        tree: TreeOptions::default(),
        inventories: vec![],
    };

    let mut writer = PdfWriter::new(&config.title);
    let summary = generate(&config, &mut writer).await.expect("Should succeed");
    assert_eq!(summary.sections, 2);
    assert_eq!(summary.code_blocks, 1);

    let bytes = writer.finish().await.expect("PDF rendering failed");
    assert!(
        bytes.len() > 100,
        "Output PDF is too small and may be empty"
    );
    assert_eq!(&bytes[0..4], b"%PDF", "PDF output missing magic header");
}

#[tokio::test]
async fn test_pdf_writer_paginates_long_code_blocks() {
    // ~200 code lines cannot fit one A4 page; the writer must overflow onto
    // further pages rather than write past the bottom margin.
    let long_block: Vec<String> = (0..200).map(|i| format!("line {i}")).collect();

    let mut writer = PdfWriter::new("pagination");
    writer
        .add_code_block(long_block.join("\n"))
        .await
        .expect("write failed");
    let bytes = writer.finish().await.expect("PDF rendering failed");
    assert_eq!(&bytes[0..4], b"%PDF");

    let mut small_writer = PdfWriter::new("pagination");
    small_writer
        .add_code_block("line 0".to_string())
        .await
        .expect("write failed");
    let small_bytes = small_writer.finish().await.expect("PDF rendering failed");

    assert!(
        bytes.len() > small_bytes.len(),
        "200 code lines should render more content than one ({} vs {})",
        bytes.len(),
        small_bytes.len()
    );
}
