//! Wire types for the gameinfo API payloads.
//!
//! Field names follow the API exactly; unknown fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type PlayerId = String;
pub type BattleId = u64;

/// Game server region. Battle ids are only unique within a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Server {
    Europe,
    Americas,
    Asia,
}

impl Server {
    pub fn all() -> &'static [Server] {
        &[Self::Europe, Self::Americas, Self::Asia]
    }

    /// Key used in directory names and the reported-battles ledger.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Europe => "europe",
            Self::Americas => "americas",
            Self::Asia => "asia",
        }
    }
}

/// One entry of the `/battles` listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawBattle {
    pub id: BattleId,
    #[serde(rename = "startTime")]
    pub start_time: String,
    #[serde(rename = "endTime")]
    pub end_time: String,
    #[serde(default)]
    pub players: BTreeMap<PlayerId, serde_json::Value>,
}

impl RawBattle {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawEvent {
    #[serde(default)]
    pub event_id: u64,
    #[serde(default)]
    pub time_stamp: Option<String>,
    pub killer: RawPlayer,
    pub victim: RawPlayer,
    #[serde(default)]
    pub total_victim_kill_fame: u64,
    #[serde(default)]
    pub participants: Vec<RawPlayer>,
    #[serde(default)]
    pub group_members: Vec<RawPlayer>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawPlayer {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub guild_name: String,
    #[serde(default)]
    pub alliance_name: String,
    #[serde(default)]
    pub equipment: RawEquipment,
    #[serde(default)]
    pub average_item_power: f64,
}

/// Slot map as sent by the API. Empty slots arrive as `null`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawEquipment {
    #[serde(default)]
    pub main_hand: Option<RawItem>,
    #[serde(default)]
    pub off_hand: Option<RawItem>,
    #[serde(default)]
    pub head: Option<RawItem>,
    #[serde(default)]
    pub armor: Option<RawItem>,
    #[serde(default)]
    pub shoes: Option<RawItem>,
    #[serde(default)]
    pub bag: Option<RawItem>,
    #[serde(default)]
    pub cape: Option<RawItem>,
    #[serde(default)]
    pub potion: Option<RawItem>,
    #[serde(default)]
    pub food: Option<RawItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawItem {
    #[serde(rename = "Type")]
    pub item_type: String,
    #[serde(default)]
    pub quality: u8,
}
