use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{RarityError, Result, RunConfig};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub(crate) struct FileConfig {
    #[serde(default)]
    pub(crate) total_supply: Option<u64>,
    #[serde(default)]
    pub(crate) contract: Option<String>,
    #[serde(default)]
    pub(crate) base_uri: Option<String>,
    #[serde(default)]
    pub(crate) rpc_url: Option<String>,
    #[serde(default)]
    pub(crate) gateway: Option<String>,
    #[serde(default)]
    pub(crate) concurrency: Option<usize>,
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    #[serde(default)]
    pub(crate) output: Option<PathBuf>,
    #[serde(default)]
    pub(crate) log_dir: Option<PathBuf>,
}

impl From<&RunConfig> for FileConfig {
    fn from(config: &RunConfig) -> Self {
        Self {
            total_supply: Some(config.total_supply),
            contract: Some(config.contract.clone()),
            base_uri: config.base_uri.clone(),
            rpc_url: Some(config.rpc_url.clone()),
            gateway: Some(config.gateway.clone()),
            concurrency: Some(config.concurrency),
            timeout_secs: Some(config.timeout_secs),
            output: Some(config.output.clone()),
            log_dir: Some(config.log_dir.clone()),
        }
    }
}

/// A missing file means defaults; a file that exists but does not parse is an error.
pub(crate) fn load_file_config(path: &Path) -> Result<FileConfig> {
    match std::fs::read_to_string(path) {
        Ok(data) => Ok(serde_json::from_str(&data)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
        Err(err) => Err(RarityError::io(path, err)),
    }
}

pub(crate) fn save_file_config(path: &Path, config: &FileConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| RarityError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(config)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| RarityError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| RarityError::io(path, e))?;
    Ok(())
}
