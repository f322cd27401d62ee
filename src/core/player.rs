use std::fmt;

use serde::{Deserialize, Serialize};

use super::equipment::Equipment;
use super::error::BattleError;
use super::item::PowerCap;
use super::model::{PlayerId, RawPlayer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub guild: String,
    pub alliance: String,
    pub equipment: Equipment,
    /// Average item power as reported by the server.
    pub average_item_power: f64,
}

impl Player {
    pub fn from_raw(raw: &RawPlayer) -> Result<Self, BattleError> {
        Ok(Self {
            id: raw.id.clone(),
            name: raw.name.clone(),
            guild: raw.guild_name.clone(),
            alliance: raw.alliance_name.clone(),
            equipment: Equipment::from_raw(&raw.equipment)?,
            average_item_power: raw.average_item_power,
        })
    }

    pub fn max_average_item_power(&self, base_ip: f64, cap: PowerCap) -> i64 {
        self.equipment.max_average_item_power(base_ip, cap)
    }

    /// Folds a later observation of the same player into this one.
    pub fn merge(&mut self, other: &Player) {
        if other.id != self.id {
            return;
        }
        self.equipment.merge(&other.equipment);
        if self.average_item_power == 0.0 && other.average_item_power > 0.0 {
            self.average_item_power = other.average_item_power;
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Player: {}", self.name)?;
        writeln!(f, "Guild: {}", self.guild)?;
        writeln!(f, "Alliance: {}", self.alliance)?;
        write!(f, "Equipment:\n{}", self.equipment)
    }
}
