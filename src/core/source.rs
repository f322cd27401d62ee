//! Where battle summaries and kill events come from.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::SourceError;
use super::model::{BattleId, RawBattle, RawEvent, Server};

#[async_trait]
pub trait BattleSource: Send + Sync {
    /// One page of battle summaries, most recent first.
    async fn recent_battles(
        &self,
        server: Server,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RawBattle>, SourceError>;

    /// Kill events of one battle in chronological order. `None` when the
    /// source has no event list for it.
    async fn battle_events(
        &self,
        server: Server,
        id: BattleId,
    ) -> Result<Option<Vec<RawEvent>>, SourceError>;

    /// Summary of a single battle, looked up by id.
    async fn battle(&self, server: Server, id: BattleId) -> Result<Option<RawBattle>, SourceError>;
}

/// Reads API dumps from disk:
///
/// ```text
/// <root>/<server>/battles.json        summaries, most recent first
/// <root>/<server>/events/<id>.json    event list of one battle
/// ```
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn server_dir(&self, server: Server) -> PathBuf {
        self.root.join(server.key())
    }

    async fn read_optional(path: &Path) -> Result<Option<String>, SourceError> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn all_battles(&self, server: Server) -> Result<Vec<RawBattle>, SourceError> {
        let path = self.server_dir(server).join("battles.json");
        match Self::read_optional(&path).await? {
            Some(content) => Ok(serde_json::from_str(&content)?),
            None => {
                log::debug!("No battle listing at {:?}", path);
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl BattleSource for DirectorySource {
    async fn recent_battles(
        &self,
        server: Server,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RawBattle>, SourceError> {
        let battles = self.all_battles(server).await?;
        Ok(battles.into_iter().skip(offset).take(limit).collect())
    }

    async fn battle_events(
        &self,
        server: Server,
        id: BattleId,
    ) -> Result<Option<Vec<RawEvent>>, SourceError> {
        let path = self
            .server_dir(server)
            .join("events")
            .join(format!("{id}.json"));
        match Self::read_optional(&path).await? {
            // a file holding `null` decodes to None as well
            Some(content) => Ok(serde_json::from_str(&content)?),
            None => Ok(None),
        }
    }

    async fn battle(&self, server: Server, id: BattleId) -> Result<Option<RawBattle>, SourceError> {
        let battles = self.all_battles(server).await?;
        Ok(battles.into_iter().find(|battle| battle.id == id))
    }
}
