//! Display ordering of a team by combat role. Has no effect on classification.

use super::battle::Battle;
use super::config::HellgateConfig;
use super::model::PlayerId;
use super::player::Player;

/// Plate armor carrying one of these markers is worn by melee damage dealers.
const MELEE_PLATE_MARKERS: [&str; 2] = ["ROYAL", "SET1"];

/// Buckets in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Unknown,
    Tank,
    Melee,
    Leather,
    Cloth,
    Healer,
}

impl Role {
    pub fn of(player: &Player, healing_weapons: &[String]) -> Self {
        let equipment = &player.equipment;

        if let Some(main_hand) = &equipment.main_hand {
            if healing_weapons.iter().any(|w| *w == main_hand.type_name) {
                return Self::Healer;
            }
        }

        let Some(armor) = &equipment.armor else {
            return Self::Unknown;
        };

        if armor.is_plate() {
            if MELEE_PLATE_MARKERS
                .iter()
                .any(|marker| armor.type_name.contains(marker))
            {
                Self::Melee
            } else {
                Self::Tank
            }
        } else if armor.is_leather() {
            Self::Leather
        } else if armor.is_cloth() {
            Self::Cloth
        } else {
            Self::Unknown
        }
    }
}

/// Orders `ids` by role, then by main-hand type. Players without a main hand
/// come last within their role. Ids missing from the battle are dropped.
pub fn order_team(battle: &Battle, ids: &[PlayerId], healing_weapons: &[String]) -> Vec<PlayerId> {
    let mut players: Vec<(Role, Option<&str>, &PlayerId)> = ids
        .iter()
        .filter_map(|id| {
            let player = battle.player(id)?;
            let main_hand = player
                .equipment
                .main_hand
                .as_ref()
                .map(|item| item.type_name.as_str());
            Some((Role::of(player, healing_weapons), main_hand, id))
        })
        .collect();

    // stable: ties keep the partition order
    players.sort_by(|a, b| {
        a.0.cmp(&b.0).then_with(|| match (a.1, b.1) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        })
    });

    players.into_iter().map(|(_, _, id)| id.clone()).collect()
}

impl Battle {
    /// Both teams ordered for display.
    pub fn ordered_teams(&self, config: &HellgateConfig) -> (Vec<PlayerId>, Vec<PlayerId>) {
        (
            order_team(self, self.team_a_ids(), &config.healing_weapons),
            order_team(self, self.team_b_ids(), &config.healing_weapons),
        )
    }
}
