//! Winner/loser resolution and the record handed to persistence.

use std::collections::{BTreeMap, HashSet};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::battle::Battle;
use super::model::{BattleId, PlayerId, Server};

/// Order-independent key for a set of players.
pub fn team_key(ids: &[PlayerId]) -> String {
    let mut sorted: Vec<&str> = ids.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join(",")
}

impl Battle {
    /// `(winners, losers)`. A team whose every member died lost; otherwise
    /// team A is taken as the winner.
    pub fn outcome(&self) -> (&[PlayerId], &[PlayerId]) {
        let victims: HashSet<&str> = self.victim_ids().iter().map(String::as_str).collect();
        let team_a_wiped = self
            .team_a_ids()
            .iter()
            .all(|id| victims.contains(id.as_str()));

        if team_a_wiped {
            (self.team_b_ids(), self.team_a_ids())
        } else {
            (self.team_a_ids(), self.team_b_ids())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub id: BattleId,
    pub server: Server,
    pub start_time: DateTime<Utc>,
    pub winner_ids: Vec<PlayerId>,
    pub loser_ids: Vec<PlayerId>,
    pub winning_team: String,
    pub losing_team: String,
    /// Build key per player.
    pub builds: BTreeMap<PlayerId, String>,
}

impl BattleRecord {
    pub fn from_battle(battle: &Battle, server: Server) -> Self {
        let (winners, losers) = battle.outcome();

        let builds = winners
            .iter()
            .chain(losers)
            .filter_map(|id| {
                let player = battle.player(id)?;
                Some((id.clone(), player.equipment.build().key()))
            })
            .collect();

        Self {
            id: battle.id,
            server,
            start_time: battle.start_time,
            winner_ids: winners.to_vec(),
            loser_ids: losers.to_vec(),
            winning_team: team_key(winners),
            losing_team: team_key(losers),
            builds,
        }
    }

    /// Every unordered pair of players that fought on the same side, with
    /// whether that side won. Pairs are sorted within and across.
    pub fn teammate_pairs(&self) -> Vec<(PlayerId, PlayerId, bool)> {
        let mut pairs = Vec::new();
        for (ids, won) in [(&self.winner_ids, true), (&self.loser_ids, false)] {
            let mut sorted = ids.clone();
            sorted.sort();
            for (i, first) in sorted.iter().enumerate() {
                for second in &sorted[i + 1..] {
                    pairs.push((first.clone(), second.clone(), won));
                }
            }
        }
        pairs
    }
}

/// Appends `records` to `path`, one JSON object per line.
pub fn append_records(path: &Path, records: &[BattleRecord]) -> io::Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for record in records {
        let line = serde_json::to_string(record)?;
        writeln!(file, "{}", line)?;
    }
    Ok(())
}
