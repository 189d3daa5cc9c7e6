use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::research::ResearchResult;

const MAX_SLUG_CHARS: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn slug(query: &str) -> String {
    let kept: String = query
        .chars()
        .filter(|&c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let slug: String = kept
        .trim()
        .replace(' ', "_")
        .chars()
        .take(MAX_SLUG_CHARS)
        .collect();
    if slug.is_empty() {
        "query".to_string()
    } else {
        slug
    }
}

pub fn file_name(result: &ResearchResult) -> String {
    format!(
        "research_{}_{}.json",
        slug(&result.original_query),
        result.timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Same-second saves of the same query get a numeric suffix.
fn unused_path(dir: &Path, result: &ResearchResult) -> PathBuf {
    let name = file_name(result);
    let mut path = dir.join(&name);
    let stem = name.trim_end_matches(".json");
    let mut n = 2;
    while path.exists() {
        path = dir.join(format!("{stem}_{n}.json"));
        n += 1;
    }
    path
}

/// Writes `result` as pretty JSON under `dir`, creating it if needed.
pub fn save_result(result: &ResearchResult, dir: &Path) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = unused_path(dir, result);
    let json = serde_json::to_string_pretty(result)?;
    fs::write(&path, json).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), "research saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::Mode;
    use crate::research::sources::make_result;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn result_at(query: &str, secs: i64) -> ResearchResult {
        ResearchResult {
            original_query: query.into(),
            mode: Mode::Basic,
            follow_up_query: None,
            source_count: 1,
            summary: "summary".into(),
            insights: vec!["insight".into()],
            depth_gained: None,
            sources: vec![make_result("https://a.com", "A", "content")],
            timestamp: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        }
    }

    #[test]
    fn slug_keeps_safe_characters() {
        assert_eq!(slug("What's new in Rust 2024?"), "Whats_new_in_Rust_2024");
        assert_eq!(slug("  ?!  "), "query");
        assert_eq!(slug(&"a".repeat(80)).len(), MAX_SLUG_CHARS);
    }

    #[test]
    fn file_name_includes_timestamp() {
        let name = file_name(&result_at("quantum computing", 0));
        assert_eq!(name, "research_quantum_computing_20231114_221320.json");
    }

    #[test]
    fn save_writes_readable_json() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested/output");

        let path = save_result(&result_at("quantum computing", 0), &out).unwrap();

        assert!(path.starts_with(&out));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"original_query\": \"quantum computing\""));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["source_count"], 1);
        assert_eq!(value["sources"][0]["url"], "https://a.com");
        assert_eq!(value["mode"], "basic");
        assert!(value.get("follow_up_query").is_none());
    }

    #[test]
    fn repeated_runs_do_not_overwrite() {
        let dir = TempDir::new().unwrap();

        let first = save_result(&result_at("same query", 0), dir.path()).unwrap();
        let second = save_result(&result_at("same query", 1), dir.path()).unwrap();

        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
    }

    #[test]
    fn same_second_saves_get_suffix() {
        let dir = TempDir::new().unwrap();
        let result = result_at("same query", 0);

        let first = save_result(&result, dir.path()).unwrap();
        let second = save_result(&result, dir.path()).unwrap();

        assert_ne!(first, second);
        assert!(
            second
                .to_string_lossy()
                .ends_with("research_same_query_20231114_221320_2.json")
        );
    }

    #[test]
    fn saved_result_round_trips() {
        let dir = TempDir::new().unwrap();
        let original = result_at("round trip", 5);

        let path = save_result(&original, dir.path()).unwrap();
        let loaded: ResearchResult =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(loaded.original_query, original.original_query);
        assert_eq!(loaded.sources, original.sources);
        assert_eq!(loaded.timestamp, original.timestamp);
    }
}
