use std::path::{Path, PathBuf};

use crate::{RarityDocument, RarityError, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PersistSummary {
    pub(crate) path: PathBuf,
    pub(crate) bytes: usize,
    pub(crate) digest: String,
}

/// Serialize the whole document and replace `path` with it.
///
/// The JSON is written to a sibling `.tmp` file first, then renamed over the
/// target.
pub(crate) fn write_document(path: &Path, document: &RarityDocument) -> Result<PersistSummary> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| RarityError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(document)?;
    let digest = blake3::hash(json.as_bytes()).to_hex().to_string();
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| RarityError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| RarityError::io(path, e))?;
    tracing::info!(path = %path.display(), bytes = json.len(), %digest, "wrote rarity document");
    Ok(PersistSummary {
        path: path.to_path_buf(),
        bytes: json.len(),
        digest,
    })
}

pub(crate) fn load_document(path: &Path) -> Result<RarityDocument> {
    let data = std::fs::read_to_string(path).map_err(|e| RarityError::io(path, e))?;
    Ok(serde_json::from_str(&data)?)
}
