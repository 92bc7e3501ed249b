#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory holding a config file whose database lives
/// alongside it.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a workspace whose config holds `strategies` and points the
    /// database into the temp directory.
    pub fn new(strategies: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = dir.path().join("bankroll.db").display().to_string();
        let config = format!("database = {db:?}\n\n[logging]\nlevel = \"warn\"\n\n{strategies}");
        fs::write(dir.path().join("config.toml"), config).expect("write config");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    /// Write a file next to the config and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("write file");
        path
    }
}

/// Batch JSON with one deep-liquidity entry per
/// `(id, price, probability, confidence)`.
pub fn batch_json(entries: &[(&str, f64, f64, f64)]) -> String {
    let entries: Vec<_> = entries
        .iter()
        .map(|(id, price, probability, confidence)| {
            serde_json::json!({
                "quote": { "market_id": id, "price": price, "liquidity": 20000.0 },
                "forecast": {
                    "market_id": id,
                    "probability": probability,
                    "factors": {
                        "source_quality": confidence,
                        "information_recency": confidence,
                        "consensus": confidence,
                        "base_rate_alignment": confidence,
                        "reasoning_clarity": confidence
                    }
                }
            })
        })
        .collect();
    serde_json::json!({ "entries": entries }).to_string()
}
