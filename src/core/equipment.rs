use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::BattleError;
use super::item::{Item, PowerCap, Slot};
use super::model::{RawEquipment, RawItem};

/// Slots that count toward the character's average item power.
const IP_CONTRIBUTING_SLOTS: [Slot; 6] = [
    Slot::Head,
    Slot::Armor,
    Slot::Shoes,
    Slot::MainHand,
    Slot::OffHand,
    Slot::Cape,
];

/// Slots that make up a build signature, in signature order.
const BUILD_SLOTS: [Slot; 6] = [
    Slot::MainHand,
    Slot::OffHand,
    Slot::Head,
    Slot::Armor,
    Slot::Shoes,
    Slot::Cape,
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub main_hand: Option<Item>,
    pub off_hand: Option<Item>,
    pub armor: Option<Item>,
    pub head: Option<Item>,
    pub shoes: Option<Item>,
    pub cape: Option<Item>,
    pub bag: Option<Item>,
    pub potion: Option<Item>,
    pub food: Option<Item>,
}

impl Equipment {
    pub fn from_raw(raw: &RawEquipment) -> Result<Self, BattleError> {
        fn parse(slot: Slot, raw: &Option<RawItem>) -> Result<Option<Item>, BattleError> {
            raw.as_ref().map(|item| Item::from_raw(slot, item)).transpose()
        }

        Ok(Self {
            main_hand: parse(Slot::MainHand, &raw.main_hand)?,
            off_hand: parse(Slot::OffHand, &raw.off_hand)?,
            armor: parse(Slot::Armor, &raw.armor)?,
            head: parse(Slot::Head, &raw.head)?,
            shoes: parse(Slot::Shoes, &raw.shoes)?,
            cape: parse(Slot::Cape, &raw.cape)?,
            bag: parse(Slot::Bag, &raw.bag)?,
            potion: parse(Slot::Potion, &raw.potion)?,
            food: parse(Slot::Food, &raw.food)?,
        })
    }

    pub fn get(&self, slot: Slot) -> Option<&Item> {
        self.slot_ref(slot).as_ref()
    }

    fn slot_ref(&self, slot: Slot) -> &Option<Item> {
        match slot {
            Slot::MainHand => &self.main_hand,
            Slot::OffHand => &self.off_hand,
            Slot::Armor => &self.armor,
            Slot::Head => &self.head,
            Slot::Shoes => &self.shoes,
            Slot::Cape => &self.cape,
            Slot::Bag => &self.bag,
            Slot::Potion => &self.potion,
            Slot::Food => &self.food,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<Item> {
        match slot {
            Slot::MainHand => &mut self.main_hand,
            Slot::OffHand => &mut self.off_hand,
            Slot::Armor => &mut self.armor,
            Slot::Head => &mut self.head,
            Slot::Shoes => &mut self.shoes,
            Slot::Cape => &mut self.cape,
            Slot::Bag => &mut self.bag,
            Slot::Potion => &mut self.potion,
            Slot::Food => &mut self.food,
        }
    }

    /// Equipped items in slot order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        Slot::all().iter().filter_map(move |slot| self.get(*slot))
    }

    pub fn is_two_handed(&self) -> bool {
        self.main_hand.is_some() && self.off_hand.is_none()
    }

    /// Fills empty slots from `other`. Occupied slots are never replaced.
    pub fn merge(&mut self, other: &Equipment) {
        for slot in Slot::all() {
            let current = self.slot_mut(*slot);
            if current.is_none() {
                if let Some(item) = other.get(*slot) {
                    *current = Some(item.clone());
                }
            }
        }
    }

    /// Highest average item power this gear could show, truncated.
    pub fn max_average_item_power(&self, base_ip: f64, cap: PowerCap) -> i64 {
        let mut total_ip: f64 = IP_CONTRIBUTING_SLOTS
            .iter()
            .filter_map(|slot| self.get(*slot))
            .map(|item| item.max_item_power(base_ip, cap))
            .sum();

        // a two-handed weapon fills the off-hand slot as well
        if self.is_two_handed() {
            if let Some(main_hand) = &self.main_hand {
                total_ip += main_hand.max_item_power(base_ip, cap);
            }
        }

        (total_ip / 6.0) as i64
    }

    /// Item types worn in the build slots, ignoring tier, enchantment and quality.
    pub fn build(&self) -> Build {
        Build {
            slots: BUILD_SLOTS
                .iter()
                .map(|slot| self.get(*slot).map(|item| item.type_name.clone()))
                .collect(),
        }
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in self.items() {
            writeln!(f, "\t{:<10}: \t{}", item.slot.display_name(), item)?;
        }
        Ok(())
    }
}

/// Combination of item types used for meta tracking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Build {
    slots: Vec<Option<String>>,
}

impl Build {
    pub fn item_type(&self, slot: Slot) -> Option<&str> {
        let index = BUILD_SLOTS.iter().position(|s| *s == slot)?;
        self.slots.get(index)?.as_deref()
    }

    /// Stable key: slot types joined by `|`, `empty` for missing slots.
    pub fn key(&self) -> String {
        self.slots
            .iter()
            .map(|slot| slot.as_deref().unwrap_or("empty"))
            .collect::<Vec<_>>()
            .join("|")
    }
}
