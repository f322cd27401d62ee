//! Battle reconstruction from a battle summary and its kill events.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

use super::error::BattleError;
use super::model::{BattleId, PlayerId, RawBattle, RawEvent, RawPlayer};
use super::player::Player;
use super::teams;

/// Position of a player in the battle's roster.
pub type PlayerIndex = usize;

/// One kill. Players are referenced by roster index so that gear merged from
/// later events is visible here as well.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: u64,
    pub timestamp: Option<DateTime<Utc>>,
    pub killer: PlayerIndex,
    pub victim: PlayerIndex,
    pub participants: Vec<PlayerIndex>,
    pub group_members: Vec<PlayerIndex>,
    pub kill_fame: u64,
}

/// Players in first-seen order, deduplicated by id.
#[derive(Debug, Default)]
struct Roster {
    players: Vec<Player>,
    index: HashMap<PlayerId, PlayerIndex>,
}

impl Roster {
    fn observe(&mut self, raw: &RawPlayer) -> Result<PlayerIndex, BattleError> {
        let player = Player::from_raw(raw)?;
        if let Some(&index) = self.index.get(&player.id) {
            self.players[index].merge(&player);
            return Ok(index);
        }
        let index = self.players.len();
        self.index.insert(player.id.clone(), index);
        self.players.push(player);
        Ok(index)
    }

    fn observe_all(&mut self, raws: &[RawPlayer]) -> Result<Vec<PlayerIndex>, BattleError> {
        raws.iter().map(|raw| self.observe(raw)).collect()
    }
}

#[derive(Debug)]
pub struct Battle {
    pub id: BattleId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    events: Vec<Event>,
    roster: Roster,
    victim_ids: Vec<PlayerId>,
    team_a_ids: Vec<PlayerId>,
    team_b_ids: Vec<PlayerId>,
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, BattleError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| BattleError::MalformedTimestamp {
            value: value.to_string(),
            source,
        })
}

impl Battle {
    /// Builds the battle in one pass. `events` is `None` when the events
    /// endpoint answered `null`, which is fatal for this battle.
    pub fn new(summary: &RawBattle, events: Option<Vec<RawEvent>>) -> Result<Self, BattleError> {
        let raw_events = events.ok_or(BattleError::MissingEvents(summary.id))?;
        let start_time = parse_timestamp(&summary.start_time)?;
        let end_time = parse_timestamp(&summary.end_time)?;

        let mut roster = Roster::default();
        let mut events = Vec::with_capacity(raw_events.len());

        for raw in &raw_events {
            let participants = roster.observe_all(&raw.participants)?;
            let group_members = roster.observe_all(&raw.group_members)?;
            let killer = roster.observe(&raw.killer)?;
            let victim = roster.observe(&raw.victim)?;
            let timestamp = raw.time_stamp.as_deref().map(parse_timestamp).transpose()?;

            events.push(Event {
                id: raw.event_id,
                timestamp,
                killer,
                victim,
                participants,
                group_members,
                kill_fame: raw.total_victim_kill_fame,
            });
        }

        let id_of = |index: &PlayerIndex| roster.players[*index].id.clone();
        let victim_ids = events.iter().map(|event| id_of(&event.victim)).collect();
        let (team_a, team_b) = teams::split_teams(roster.players.len(), &events);
        let team_a_ids = team_a.iter().map(id_of).collect();
        let team_b_ids = team_b.iter().map(id_of).collect();

        log::debug!(
            "Built battle {} with {} events and {} players",
            summary.id,
            events.len(),
            roster.players.len()
        );

        Ok(Self {
            id: summary.id,
            start_time,
            end_time,
            events,
            roster,
            victim_ids,
            team_a_ids,
            team_b_ids,
        })
    }

    /// Parses the `/battles/{id}` and `/events/battle/{id}` payloads.
    pub fn from_json(summary_json: &str, events_json: &str) -> Result<Self, BattleError> {
        let summary: RawBattle = serde_json::from_str(summary_json)?;
        let events: Option<Vec<RawEvent>> = serde_json::from_str(events_json)?;
        Self::new(&summary, events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Every distinct player, in first-seen order.
    pub fn players(&self) -> &[Player] {
        &self.roster.players
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.roster
            .index
            .get(id)
            .map(|index| &self.roster.players[*index])
    }

    pub fn player_at(&self, index: PlayerIndex) -> &Player {
        &self.roster.players[index]
    }

    pub fn killer(&self, event: &Event) -> &Player {
        self.player_at(event.killer)
    }

    pub fn victim(&self, event: &Event) -> &Player {
        self.player_at(event.victim)
    }

    /// Victim of every event, in event order. A player killed twice appears twice.
    pub fn victim_ids(&self) -> &[PlayerId] {
        &self.victim_ids
    }

    pub fn team_a_ids(&self) -> &[PlayerId] {
        &self.team_a_ids
    }

    pub fn team_b_ids(&self) -> &[PlayerId] {
        &self.team_b_ids
    }

    pub fn is_victim(&self, id: &str) -> bool {
        self.victim_ids.iter().any(|victim| victim == id)
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }

    fn names<'a>(&'a self, ids: &'a [PlayerId]) -> Vec<&'a str> {
        ids.iter()
            .filter_map(|id| self.player(id))
            .map(|player| player.name.as_str())
            .collect()
    }
}

impl fmt::Display for Battle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let duration = self.duration().num_seconds().max(0);
        writeln!(
            f,
            "Battle: {} \tStart Time: {} UTC \tDuration: {:02}m {:02}s",
            self.id,
            self.start_time.format("%H:%M:%S"),
            duration / 60,
            duration % 60
        )?;
        let players: Vec<&str> = self.players().iter().map(|p| p.name.as_str()).collect();
        writeln!(f, "\tPlayers: {:?}", players)?;
        writeln!(f, "\tVictims: {:?}", self.names(&self.victim_ids))?;
        writeln!(f, "\tTeam A:  {:?}", self.names(&self.team_a_ids))?;
        writeln!(f, "\tTeam B:  {:?}", self.names(&self.team_b_ids))
    }
}
