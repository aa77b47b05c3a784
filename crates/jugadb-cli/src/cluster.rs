//! `cluster.jbconf` parsing (spec.md §6 "Cluster config file"): named
//! clusters, each listing the database file paths it manages plus an
//! active-database index. Out of scope for the executor itself — this is
//! the thin external wrapper spec.md §1 treats as a collaborator.

use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ClusterConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {0}: expected a cluster before any `db`/`active` entry")]
    EntryBeforeCluster(usize),
    #[error("line {0}: unrecognized directive {1:?}")]
    UnknownDirective(usize, String),
    #[error("line {0}: `active` value {1:?} is not a valid index")]
    BadActiveIndex(usize, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEntry {
    pub name: String,
    pub databases: Vec<PathBuf>,
    pub active: usize,
}

impl fmt::Display for ClusterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} database(s), active={})", self.name, self.databases.len(), self.active)
    }
}

/// Parses the `cluster <name>` / `db <path>` / `active <index>` line format.
/// Blank lines and `#`-prefixed comments are ignored.
pub fn parse(text: &str) -> Result<Vec<ClusterEntry>, ClusterConfigError> {
    let mut clusters = Vec::new();
    let mut current: Option<ClusterEntry> = None;

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (directive, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match directive {
            "cluster" => {
                if let Some(finished) = current.take() {
                    clusters.push(finished);
                }
                current = Some(ClusterEntry { name: rest.to_string(), databases: Vec::new(), active: 0 });
            }
            "db" => {
                let entry = current.as_mut().ok_or(ClusterConfigError::EntryBeforeCluster(lineno + 1))?;
                entry.databases.push(PathBuf::from(rest));
            }
            "active" => {
                let entry = current.as_mut().ok_or(ClusterConfigError::EntryBeforeCluster(lineno + 1))?;
                entry.active = rest.parse().map_err(|_| ClusterConfigError::BadActiveIndex(lineno + 1, rest.to_string()))?;
            }
            other => return Err(ClusterConfigError::UnknownDirective(lineno + 1, other.to_string())),
        }
    }
    if let Some(finished) = current.take() {
        clusters.push(finished);
    }
    Ok(clusters)
}

pub fn load(path: &Path) -> Result<Vec<ClusterEntry>, ClusterConfigError> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_clusters_with_active_index() {
        let text = "\
cluster default
db /data/a.jdb
db /data/b.jdb
active 1

cluster staging
db /data/c.jdb
active 0
";
        let clusters = parse(text).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].name, "default");
        assert_eq!(clusters[0].databases.len(), 2);
        assert_eq!(clusters[0].active, 1);
        assert_eq!(clusters[1].name, "staging");
    }

    #[test]
    fn db_before_cluster_is_an_error() {
        assert!(parse("db /data/a.jdb\n").is_err());
    }
}
