use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::{error, info};

use crate::report::{DocumentInput, InventorySection, ReportConfig};
use crate::tree::TreeOptions;

#[derive(Deserialize)]
struct StaticConfig {
    report: ReportSection,
    #[serde(default = "default_documents")]
    documents: Vec<DocumentYaml>,
    #[serde(default)]
    tree: Option<TreeOptions>,
    #[serde(default)]
    inventories: Vec<InventoryYaml>,
}

#[derive(Deserialize)]
struct ReportSection {
    title: String,
    #[serde(default = "default_subtitle")]
    subtitle: String,
    #[serde(default = "default_repo_path")]
    repo_path: PathBuf,
    #[serde(default = "default_output_file")]
    output_file: PathBuf,
    #[serde(default)]
    conclusion: Option<String>,
}

#[derive(Deserialize)]
struct DocumentYaml {
    path: PathBuf,
    #[serde(default)]
    heading: Option<String>,
}

#[derive(Deserialize)]
struct InventoryYaml {
    heading: String,
    dir: PathBuf,
}

fn default_subtitle() -> String {
    "Technical Report".to_string()
}

fn default_repo_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_file() -> PathBuf {
    PathBuf::from("report.pdf")
}

fn default_documents() -> Vec<DocumentYaml> {
    vec![DocumentYaml {
        path: PathBuf::from("README.md"),
        heading: None,
    }]
}

/// Loads a static YAML config file and maps it into a full [`ReportConfig`],
/// applying defaults for everything but the title.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ReportConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let documents = static_conf
        .documents
        .into_iter()
        .map(|d| {
            info!(path = %d.path.display(), "Parsed document input from config");
            DocumentInput {
                path: d.path,
                heading: d.heading,
            }
        })
        .collect();

    let inventories = static_conf
        .inventories
        .into_iter()
        .map(|i| InventorySection {
            heading: i.heading,
            dir: i.dir,
        })
        .collect();

    let tree = static_conf.tree.unwrap_or_default();

    let config = ReportConfig {
        repo_path: static_conf.report.repo_path,
        output_file: static_conf.report.output_file,
        title: static_conf.report.title,
        subtitle: static_conf.report.subtitle,
        conclusion: static_conf.report.conclusion,
        documents,
        tree,
        inventories,
    };

    info!(
        repo_path = %config.repo_path.display(),
        output_file = %config.output_file.display(),
        max_depth = config.tree.max_depth,
        "Config loaded and merged successfully"
    );

    Ok(config)
}
