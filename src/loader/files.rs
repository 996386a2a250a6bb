//! Local file loader

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, warn};

use super::{html_to_text, Document};

/// Extensions loaded when none are given
#[cfg(feature = "pdf")]
pub const DEFAULT_EXTENSIONS: &[&str] = &[".txt", ".md", ".markdown", ".rst", ".html", ".htm", ".pdf"];
#[cfg(not(feature = "pdf"))]
pub const DEFAULT_EXTENSIONS: &[&str] = &[".txt", ".md", ".markdown", ".rst", ".html", ".htm"];

/// Load every matching file under `paths` (files or directories)
///
/// Directories are walked with `.gitignore` rules applied; hidden entries
/// are skipped unless `include_hidden` is set. Unreadable files are logged
/// and skipped.
pub fn load_paths(paths: &[PathBuf], extensions: &[String], include_hidden: bool) -> anyhow::Result<Vec<Document>> {
    let mut documents = Vec::new();

    for path in paths {
        if path.is_file() {
            if let Some(doc) = load_if_matching(path, extensions) {
                documents.push(doc);
            }
        } else if path.is_dir() {
            let walker = WalkBuilder::new(path)
                .hidden(!include_hidden)
                .git_ignore(true)
                .git_global(true)
                .build();

            for entry in walker.flatten() {
                let entry_path = entry.path();
                if entry_path.is_file() {
                    if let Some(doc) = load_if_matching(entry_path, extensions) {
                        documents.push(doc);
                    }
                }
            }
        } else {
            anyhow::bail!("Path not found: {}", path.display());
        }
    }

    Ok(documents)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension() else {
        return false;
    };
    let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
    extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
}

fn load_if_matching(path: &Path, extensions: &[String]) -> Option<Document> {
    if !has_extension(path, extensions) {
        return None;
    }

    let text = load_file_content(path)?;
    if text.trim().is_empty() {
        debug!("Skipping empty file {}", path.display());
        return None;
    }
    Some(Document::new(text, &path.to_string_lossy()))
}

/// Read a file as text, converting HTML and (with the `pdf` feature) PDF
fn load_file_content(path: &Path) -> Option<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        #[cfg(feature = "pdf")]
        "pdf" => match pdf_extract::extract_text(path) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Failed to extract text from {}: {}", path.display(), e);
                None
            }
        },
        "html" | "htm" => read_text(path).map(|html| html_to_text(&html)),
        _ => read_text(path),
    }
}

fn read_text(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}
