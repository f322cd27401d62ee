//! Ledger of battles already reported, so a battle is never announced twice.
//!
//! Stored as a JSON object mapping each server to its list of battle ids.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::model::{BattleId, Server};

pub struct ReportedBattles {
    path: PathBuf,
    battles: BTreeMap<Server, Vec<BattleId>>,
}

impl ReportedBattles {
    /// Loads the ledger at `path`. A missing or unreadable file yields an
    /// empty ledger that will be written to `path` on save.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let battles = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    log::warn!("Discarding corrupt reported battles file {:?}: {}", path, e);
                    BTreeMap::new()
                }),
                Err(e) => {
                    log::warn!("Failed to read {:?}: {}", path, e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Self { path, battles }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, server: Server, id: BattleId) -> bool {
        self.battles
            .get(&server)
            .is_some_and(|ids| ids.contains(&id))
    }

    /// Records `id`. Returns `false` if it was already reported.
    pub fn mark(&mut self, server: Server, id: BattleId) -> bool {
        let ids = self.battles.entry(server).or_default();
        if ids.contains(&id) {
            return false;
        }
        ids.push(id);
        true
    }

    pub fn len(&self, server: Server) -> usize {
        self.battles.get(&server).map_or(0, Vec::len)
    }

    /// Forgets every reported id but keeps the per-server entries.
    pub fn clear(&mut self) {
        for ids in self.battles.values_mut() {
            ids.clear();
        }
    }

    pub fn save(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.battles)?;
        fs::write(&self.path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let ledger = ReportedBattles::load(dir.path().join("reported.json"));
        assert!(!ledger.contains(Server::Europe, 1));
        assert_eq!(ledger.len(Server::Europe), 0);
    }

    #[test]
    fn test_mark_is_per_server() {
        let dir = tempdir().unwrap();
        let mut ledger = ReportedBattles::load(dir.path().join("reported.json"));

        assert!(ledger.mark(Server::Europe, 10));
        assert!(!ledger.mark(Server::Europe, 10));
        assert!(ledger.mark(Server::Asia, 10));

        assert!(ledger.contains(Server::Europe, 10));
        assert!(!ledger.contains(Server::Americas, 10));
        assert_eq!(ledger.len(Server::Europe), 1);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("reported.json");

        let mut ledger = ReportedBattles::load(&path);
        ledger.mark(Server::Americas, 42);
        ledger.mark(Server::Americas, 43);
        ledger.save().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"americas\""));

        let reloaded = ReportedBattles::load(&path);
        assert!(reloaded.contains(Server::Americas, 42));
        assert!(reloaded.contains(Server::Americas, 43));
        assert!(!reloaded.contains(Server::Europe, 42));
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reported.json");
        fs::write(&path, "[1, 2").unwrap();

        let ledger = ReportedBattles::load(&path);
        assert_eq!(ledger.len(Server::Europe), 0);
    }

    #[test]
    fn test_clear_keeps_servers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reported.json");
        let mut ledger = ReportedBattles::load(&path);
        ledger.mark(Server::Europe, 1);
        ledger.clear();
        ledger.save().unwrap();

        assert!(!ledger.contains(Server::Europe, 1));
        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content, serde_json::json!({"europe": []}));
    }
}
