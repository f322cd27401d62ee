//! Item parsing and the per-item power model.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::BattleError;
use super::model::RawItem;

const MAX_TIER: u8 = 8;
const MAX_ENCHANTMENT: u8 = 4;
const MAX_QUALITY: u8 = 5;

// Category bonuses, all expressed at the maximum character level.
const OVERCHARGE_BONUS: f64 = 100.0;
const MAX_ITEM_LEVEL: f64 = 120.0;
const IP_PER_LEVEL: f64 = 2.0;
const NB_NON_ARTIFACT_ITEMS: f64 = 3.0;
const IP_PER_LEVEL_NON_ARTIFACT_ITEM: f64 = 0.2;
const NB_ARTIFACT_ITEMS: f64 = 4.0;
const IP_PER_LEVEL_ARTIFACT_BRANCH_ITEM: f64 = 0.1;
const NB_CRYSTAL_ITEMS: f64 = 5.0;
const IP_PER_LEVEL_CRYSTAL_ITEM: f64 = 0.025;

lazy_static! {
    // T<tier>_<NAME>@<enchantment>, tier and enchantment both optional
    static ref ITEM_TYPE_REGEX: Regex =
        Regex::new(r"^(?:T(\d+)_)?([A-Za-z0-9_]+?)(?:@(\d+))?$").expect("Invalid item type regex");
}

/// Equipment slot an item was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    MainHand,
    OffHand,
    Armor,
    Head,
    Shoes,
    Cape,
    Bag,
    Potion,
    Food,
}

/// Which bonus formula applies on top of the base stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerScaling {
    Armor,
    Weapon,
    Flat,
}

impl Slot {
    pub fn all() -> &'static [Slot] {
        &[
            Self::MainHand,
            Self::OffHand,
            Self::Armor,
            Self::Head,
            Self::Shoes,
            Self::Cape,
            Self::Bag,
            Self::Potion,
            Self::Food,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MainHand => "MainHand",
            Self::OffHand => "OffHand",
            Self::Armor => "Armor",
            Self::Head => "Head",
            Self::Shoes => "Shoes",
            Self::Cape => "Cape",
            Self::Bag => "Bag",
            Self::Potion => "Potion",
            Self::Food => "Food",
        }
    }

    pub fn scaling(&self) -> PowerScaling {
        match self {
            Self::MainHand | Self::OffHand => PowerScaling::Weapon,
            Self::Armor | Self::Head | Self::Shoes => PowerScaling::Armor,
            Self::Cape | Self::Bag | Self::Potion | Self::Food => PowerScaling::Flat,
        }
    }
}

/// Hard cap plus the share of any excess that still counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerCap {
    pub ip_cap: f64,
    pub softcap_percent: f64,
}

impl PowerCap {
    pub fn new(ip_cap: f64, softcap_percent: f64) -> Self {
        Self {
            ip_cap,
            softcap_percent,
        }
    }

    pub fn apply(&self, ip: f64) -> f64 {
        apply_ip_cap(ip, self.ip_cap, self.softcap_percent)
    }
}

/// Values at or below `ip_cap` pass through; the excess above it counts at
/// `softcap_percent`.
pub fn apply_ip_cap(ip: f64, ip_cap: f64, softcap_percent: f64) -> f64 {
    if ip <= ip_cap {
        return ip;
    }
    ip_cap + (ip - ip_cap) * (softcap_percent / 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub slot: Slot,
    /// Type name without tier prefix and enchantment suffix, e.g. `MAIN_HOLYSTAFF`.
    pub type_name: String,
    pub tier: u8,
    pub enchantment: u8,
    pub quality: u8,
}

impl Item {
    pub fn parse(slot: Slot, item_type: &str, quality: u8) -> Result<Self, BattleError> {
        let malformed = |reason| BattleError::MalformedItem {
            item_type: item_type.to_string(),
            reason,
        };

        let caps = ITEM_TYPE_REGEX
            .captures(item_type.trim())
            .ok_or_else(|| malformed("unrecognised item type"))?;

        let tier = match caps.get(1) {
            Some(m) => m.as_str().parse::<u8>().map_err(|_| malformed("invalid tier"))?,
            None => 0,
        };
        let enchantment = match caps.get(3) {
            Some(m) => m
                .as_str()
                .parse::<u8>()
                .map_err(|_| malformed("invalid enchantment"))?,
            None => 0,
        };
        let type_name = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| malformed("missing type name"))?;

        if tier > MAX_TIER {
            return Err(malformed("tier out of range"));
        }
        if enchantment > MAX_ENCHANTMENT {
            return Err(malformed("enchantment out of range"));
        }
        if quality > MAX_QUALITY {
            return Err(malformed("quality out of range"));
        }

        Ok(Self {
            slot,
            type_name,
            tier,
            enchantment,
            quality,
        })
    }

    pub fn from_raw(slot: Slot, raw: &RawItem) -> Result<Self, BattleError> {
        Self::parse(slot, &raw.item_type, raw.quality)
    }

    fn quality_ip(&self) -> f64 {
        match self.quality {
            2 => 20.0,
            3 => 40.0,
            4 => 60.0,
            5 => 100.0,
            _ => 0.0,
        }
    }

    fn base_item_power(&self, base_ip: f64, cap: PowerCap) -> f64 {
        let item_power = base_ip
            + f64::from(self.tier) * 100.0
            + f64::from(self.enchantment) * 100.0
            + self.quality_ip();
        cap.apply(item_power)
    }

    /// Theoretical maximum power of this item once every mastery and specialisation
    /// bonus is maxed out, capped with `cap`.
    pub fn max_item_power(&self, base_ip: f64, cap: PowerCap) -> f64 {
        let mut item_power = self.base_item_power(base_ip, cap);

        let scaling = self.slot.scaling();
        if scaling == PowerScaling::Flat {
            return item_power;
        }

        let mastery_bonus_percent = f64::from(self.tier) - 20.0;

        item_power += OVERCHARGE_BONUS;
        item_power += MAX_ITEM_LEVEL * IP_PER_LEVEL;
        item_power += NB_NON_ARTIFACT_ITEMS * IP_PER_LEVEL_NON_ARTIFACT_ITEM * MAX_ITEM_LEVEL;
        item_power += NB_ARTIFACT_ITEMS * IP_PER_LEVEL_ARTIFACT_BRANCH_ITEM * MAX_ITEM_LEVEL;
        if scaling == PowerScaling::Weapon {
            item_power += NB_CRYSTAL_ITEMS * IP_PER_LEVEL_CRYSTAL_ITEM * MAX_ITEM_LEVEL;
        }
        item_power += item_power * mastery_bonus_percent / 100.0;

        cap.apply(item_power)
    }

    pub fn is_plate(&self) -> bool {
        self.type_name.to_lowercase().contains("plate")
    }

    pub fn is_leather(&self) -> bool {
        self.type_name.to_lowercase().contains("leather")
    }

    pub fn is_cloth(&self) -> bool {
        self.type_name.to_lowercase().contains("cloth")
    }

    /// Full API type string, e.g. `T4_MAIN_HOLYSTAFF@2`.
    pub fn full_type(&self) -> String {
        let mut full = if self.tier > 0 {
            format!("T{}_{}", self.tier, self.type_name)
        } else {
            self.type_name.clone()
        };
        if self.enchantment > 0 {
            full.push_str(&format!("@{}", self.enchantment));
        }
        full
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<25} \tTier: {} \tEnchantment: {} \tQuality: {}",
            self.type_name, self.tier, self.enchantment, self.quality
        )
    }
}
