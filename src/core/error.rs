use std::io;

use thiserror::Error;

use super::model::BattleId;

/// Input errors that make a single battle unusable.
#[derive(Debug, Error)]
pub enum BattleError {
    /// The events endpoint answered `null` for this battle.
    #[error("battle {0} has no event list")]
    MissingEvents(BattleId),

    #[error("malformed item type {item_type:?}: {reason}")]
    MalformedItem {
        item_type: String,
        reason: &'static str,
    },

    #[error("malformed timestamp {value:?}")]
    MalformedTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("malformed battle payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the battle fetch collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("battle {0} not found")]
    Missing(BattleId),
}

/// Failure to produce one battle from the source.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Battle(#[from] BattleError),
}
