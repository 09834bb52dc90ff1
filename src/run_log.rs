use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::{RarityError, Result, RunLogEntry};

const RUN_LOG_PREFIX: &str = "rarity-";
const RUN_LOG_DAYS: usize = 7;

pub(crate) fn run_log_path(log_dir: &Path) -> PathBuf {
    let date_str = Utc::now().format("%Y-%m-%d");
    log_dir.join(format!("{RUN_LOG_PREFIX}{date_str}.jsonl"))
}

pub(crate) fn append_run_log(log_dir: &Path, entry: &RunLogEntry) -> Result<PathBuf> {
    fs::create_dir_all(log_dir).map_err(|e| RarityError::io(log_dir, e))?;
    let path = run_log_path(log_dir);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| RarityError::io(&path, e))?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{}", json).map_err(|e| RarityError::io(&path, e))?;
    Ok(path)
}

/// Newest entries first, read from the last week of day files.
pub(crate) fn load_recent_runs(log_dir: &Path, limit: usize) -> Vec<RunLogEntry> {
    let mut files: Vec<PathBuf> = match fs::read_dir(log_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(RUN_LOG_PREFIX) && n.ends_with(".jsonl"))
                    .unwrap_or(false)
            })
            .collect(),
        Err(_) => return Vec::new(),
    };
    files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    files.truncate(RUN_LOG_DAYS);

    let mut collected = Vec::new();
    for path in &files {
        let file = match fs::File::open(path) {
            Ok(f) => f,
            Err(_) => continue,
        };
        let mut day: Vec<RunLogEntry> = BufReader::new(file)
            .lines()
            .map_while(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();
        day.reverse();
        for entry in day {
            collected.push(entry);
            if collected.len() >= limit {
                return collected;
            }
        }
    }
    collected
}
