use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SCHEMA_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// One schema document together with the file it came from.
#[derive(Debug)]
pub struct LoadedDocument {
    pub origin: PathBuf,
    pub document: Value,
}

/// Loads every schema document reachable from `sources`.
///
/// Files are read as given; directories are walked recursively and only
/// `.json`/`.yaml`/`.yml` files are picked up, in sorted order. A file holding
/// a top-level array contributes each element as its own document.
pub fn load_documents(sources: &[PathBuf]) -> Result<Vec<LoadedDocument>> {
    let mut loaded = Vec::new();
    for source in sources {
        for path in schema_files(source)? {
            let documents = read_documents(&path)?;
            tracing::debug!(path = %path.display(), count = documents.len(), "loaded schema file");
            loaded.extend(documents.into_iter().map(|document| LoadedDocument {
                origin: path.clone(),
                document,
            }));
        }
    }
    Ok(loaded)
}

fn schema_files(source: &Path) -> Result<Vec<PathBuf>> {
    if source.is_file() {
        return Ok(vec![source.to_path_buf()]);
    }
    if !source.is_dir() {
        bail!("schema source {} does not exist", source.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(source).follow_links(false) {
        let entry =
            entry.with_context(|| format!("failed to walk schema directory {}", source.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if has_schema_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn has_schema_extension(path: &Path) -> bool {
    SCHEMA_EXTENSIONS.contains(&extension(path).as_str())
}

fn read_documents(path: &Path) -> Result<Vec<Value>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    let value: Value = match extension(path).as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&data)
            .with_context(|| format!("failed to parse schema {}", path.display()))?,
        _ => serde_json::from_str(&data)
            .with_context(|| format!("failed to parse schema {}", path.display()))?,
    };
    Ok(match value {
        Value::Array(documents) => documents,
        document => vec![document],
    })
}
