use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A query with its known-relevant location. A hit is either one of
/// `correct_chunk_ids` or a result whose section path matches
/// `correct_section_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldQuery {
    pub query: String,
    #[serde(default)]
    pub correct_section_path: String,
    #[serde(default)]
    pub correct_chunk_ids: Vec<String>,
}

pub fn load_test_set(path: &Path) -> Result<Vec<GoldQuery>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read test set {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse test set {}", path.display()))
}

fn normalize_path(path: &str) -> String {
    path.replace('→', " ")
        .replace('>', " ")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Loose section comparison: either normalized path contains the other.
pub fn section_match(retrieved: &str, correct: &str) -> bool {
    let retrieved = normalize_path(retrieved);
    let correct = normalize_path(correct);
    if retrieved.is_empty() || correct.is_empty() {
        return false;
    }
    retrieved.contains(&correct) || correct.contains(&retrieved)
}
