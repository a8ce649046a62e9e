// Document loaders
// Turns supported source files (.pdf, .docx, .txt, .md) into raw text.
// Unsupported extensions are rejected before any loader runs.


use std::fs;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::{RagError, Result};

/// File extensions the ingestion pipeline accepts.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "md"];

/// A source document loaded into memory, ready for chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    /// Extracted plain text
    pub text: String,
    /// Full source path as given to the loader
    pub source: String,
    /// File name component of the source path
    pub filename: String,
}

/// Whether a path has an extension a loader exists for.
#[inline]
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Load a document, dispatching on its extension.
#[inline]
pub fn load_document(path: &Path) -> Result<LoadedDocument> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    debug!("Loading document {} ({})", path.display(), extension);

    let text = match extension.as_str() {
        "pdf" => extract_pdf(path)?,
        "docx" => extract_docx(path)?,
        "txt" | "md" => fs::read_to_string(path)?,
        _ => {
            return Err(RagError::UnsupportedFormat(format!(
                "{} ({})",
                path.display(),
                if extension.is_empty() {
                    "no extension"
                } else {
                    extension.as_str()
                }
            )));
        }
    };

    if text.trim().is_empty() {
        return Err(RagError::Loader(format!(
            "{} contains no extractable text",
            path.display()
        )));
    }

    Ok(LoadedDocument {
        text,
        source: path.to_string_lossy().into_owned(),
        filename: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    })
}

fn extract_pdf(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;

    pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| RagError::Loader(format!("PDF extraction failed for {}: {}", path.display(), e)))
}

fn extract_docx(path: &Path) -> Result<String> {
    let file = fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| RagError::Loader(format!("{} is not a valid docx: {}", path.display(), e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| RagError::Loader(format!("{} has no document body: {}", path.display(), e)))?
        .read_to_string(&mut xml)?;

    Ok(plaintext_from_docx_xml(&xml))
}

/// Pull readable text out of WordprocessingML: the content of `<w:t>` runs,
/// with paragraph ends and explicit breaks rendered as newlines and tabs as
/// tabs. Everything else in the markup is ignored.
fn plaintext_from_docx_xml(xml: &str) -> String {
    let mut out = String::new();

    for fragment in xml.split('<') {
        let Some((tag, content)) = fragment.split_once('>') else {
            continue;
        };

        if tag == "w:t" || tag.starts_with("w:t ") {
            push_unescaped(&mut out, content);
        } else if tag == "/w:p" || tag == "w:br/" || tag.starts_with("w:br ") {
            out.push('\n');
        } else if tag == "w:tab/" || tag.starts_with("w:tab ") {
            out.push('\t');
        }
    }

    out
}

/// Resolve the five predefined XML entities while copying text.
fn push_unescaped(out: &mut String, text: &str) {
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        let (before, after) = rest.split_at(pos);
        out.push_str(before);

        let Some(end) = after.find(';') else {
            out.push_str(after);
            return;
        };
        let (entity, tail) = after.split_at(end + 1);
        match entity {
            "&amp;" => out.push('&'),
            "&lt;" => out.push('<'),
            "&gt;" => out.push('>'),
            "&quot;" => out.push('"'),
            "&apos;" => out.push('\''),
            other => out.push_str(other),
        }
        rest = tail;
    }

    out.push_str(rest);
}
