use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tempfile::tempdir;

use repo_report::document::MockDocumentWriter;
use repo_report::report::{generate, DocumentInput, InventorySection, ReportConfig};
use repo_report::tree::TreeOptions;

/// Records every writer call as a tagged string so tests can assert the
/// exact assembly order without rendering anything.
fn recording_writer(log: Arc<Mutex<Vec<String>>>) -> MockDocumentWriter {
    let mut writer = MockDocumentWriter::new();
    {
        let log = log.clone();
        writer.expect_add_heading().returning(move |text, level| {
            log.lock().unwrap().push(format!("h{level}:{text}"));
            Ok(())
        });
    }
    {
        let log = log.clone();
        writer.expect_add_paragraph().returning(move |text| {
            log.lock().unwrap().push(format!("p:{text}"));
            Ok(())
        });
    }
    {
        let log = log.clone();
        writer.expect_add_bullet().returning(move |text| {
            log.lock().unwrap().push(format!("b:{text}"));
            Ok(())
        });
    }
    {
        let log = log.clone();
        writer.expect_add_code_block().returning(move |text| {
            log.lock().unwrap().push(format!("code:{text}"));
            Ok(())
        });
    }
    {
        let log = log.clone();
        writer.expect_add_page_break().returning(move || {
            log.lock().unwrap().push("pb".to_string());
            Ok(())
        });
    }
    writer
}

fn config_for(repo_path: PathBuf) -> ReportConfig {
    ReportConfig {
        repo_path,
        output_file: PathBuf::from("unused.pdf"),
        title: "RouterLab".to_string(),
        subtitle: "Tech Report".to_string(),
        conclusion: Some("Done.".to_string()),
        documents: vec![DocumentInput {
            path: PathBuf::from("README.md"),
            heading: None,
        }],
        tree: TreeOptions::default(),
        inventories: vec![InventorySection {
            heading: "Applications".to_string(),
            dir: PathBuf::from("apps"),
        }],
    }
}

#[tokio::test]
async fn test_generate_writes_full_report_in_order() {
    let tmp = tempdir().unwrap();
    let repo = tmp.path().to_path_buf();

    let mut readme = File::create(repo.join("README.md")).unwrap();
    write!(
        readme,
        "# A\nhello\n```\nx=1\n```\n## B\n- one\n- two\n"
    )
    .unwrap();

    let widget = repo.join("apps/widget");
    create_dir_all(&widget).unwrap();
    let mut manifest = File::create(widget.join("package.json")).unwrap();
    write!(manifest, "{{\"name\":\"widget\",\"description\":\"A widget.\"}}").unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut writer = recording_writer(log.clone());

    let config = config_for(repo);
    let summary = generate(&config, &mut writer).await.expect("Should succeed");

    assert_eq!(summary.documents, 1);
    assert_eq!(summary.sections, 2);
    assert_eq!(summary.code_blocks, 1);
    assert_eq!(summary.tree_lines, 4);

    let log = log.lock().unwrap();

    // Cover page: title, subtitle, timestamp, git info, break.
    assert_eq!(log[0], "h1:RouterLab");
    assert_eq!(log[1], "h2:Tech Report");
    assert!(log[2].starts_with("p:Generated: "), "got {}", log[2]);
    assert!(log[3].starts_with("p:"), "got {}", log[3]);
    assert_eq!(log[4], "pb");

    // Everything after the cover is fully deterministic.
    let expected_tail = vec![
        "h1:Contents",
        "p:README.md",
        "p:Repository Layout",
        "p:Component Inventory",
        "p:Conclusion",
        "pb",
        // README blocks: the code block is emitted at its closing fence,
        // before the section that lexically contains it.
        "code:x=1",
        "h1:A",
        "p:hello",
        "h2:B",
        "b:one",
        "b:two",
        // Repository layout.
        "pb",
        "h1:Repository Layout",
        "p:Directory and file layout of the project:",
        "code:├── README.md\n└── apps/\n    └── widget/\n        └── package.json",
        // Inventory.
        "pb",
        "h1:Component Inventory",
        "h2:Applications",
        "b:widget",
        "p:Description: A widget.",
        // Conclusion.
        "pb",
        "h1:Conclusion",
        "p:Done.",
    ];
    let tail: Vec<&str> = log[5..].iter().map(|entry| entry.as_str()).collect();
    assert_eq!(tail, expected_tail);
}

#[tokio::test]
async fn test_generate_skips_missing_documents_without_failing() {
    let tmp = tempdir().unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut writer = recording_writer(log.clone());

    let mut config = config_for(tmp.path().to_path_buf());
    config.documents = vec![DocumentInput {
        path: PathBuf::from("missing.md"),
        heading: Some("Ghost Chapter".to_string()),
    }];
    config.inventories.clear();
    config.conclusion = None;

    let summary = generate(&config, &mut writer).await.expect("Should succeed");

    assert_eq!(summary.documents, 0);
    assert_eq!(summary.sections, 0);
    assert_eq!(summary.code_blocks, 0);

    let log = log.lock().unwrap();
    // The contents page still lists the configured label, but the skipped
    // document must not produce its own chapter heading.
    assert!(
        !log.iter().any(|entry| entry == "h1:Ghost Chapter"),
        "skipped document must not be written"
    );
}

#[tokio::test]
async fn test_generate_surfaces_writer_failures() {
    let tmp = tempdir().unwrap();

    let mut writer = MockDocumentWriter::new();
    writer
        .expect_add_heading()
        .returning(|_, _| Err("printer on fire".into()));

    let config = config_for(tmp.path().to_path_buf());
    let err = generate(&config, &mut writer).await.unwrap_err();
    assert!(err.contains("[WRITE fail @ cover title]"), "got: {err}");
}
