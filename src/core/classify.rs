//! Lethal hellgate detection.
//!
//! A battle moves through `Unclassified -> Sized -> TeamShaped -> PowerChecked`
//! for one format and is accepted only if it reaches the end. Every check is a
//! read-only query over an already built [`Battle`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::battle::Battle;
use super::config::HellgateConfig;
use super::item::PowerCap;
use super::model::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HellgateFormat {
    FiveVsFive,
    TwoVsTwo,
}

impl HellgateFormat {
    pub fn team_size(&self) -> usize {
        match self {
            Self::FiveVsFive => 5,
            Self::TwoVsTwo => 2,
        }
    }

    pub fn player_count(&self) -> usize {
        self.team_size() * 2
    }

    pub fn power_cap(&self, config: &HellgateConfig) -> PowerCap {
        match self {
            Self::FiveVsFive => config.five_vs_five,
            Self::TwoVsTwo => config.two_vs_two,
        }
    }

    /// Zero-fame kills mark a depths instance, which only matters for 2v2.
    fn rejects_depths(&self) -> bool {
        matches!(self, Self::TwoVsTwo)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FiveVsFive => "5v5",
            Self::TwoVsTwo => "2v2",
        }
    }
}

impl fmt::Display for HellgateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Last stage a battle reached before it was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationStage {
    Unclassified,
    Sized,
    TeamShaped,
    PowerChecked,
}

/// Why a battle is not a hellgate of a given format.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    PlayerCount { expected: usize, actual: usize },
    GroupTooLarge { max: usize, actual: usize },
    NoFullGroup { size: usize },
    OverPowered {
        player_id: PlayerId,
        average_item_power: f64,
        ceiling: f64,
    },
    Depths,
}

impl Rejection {
    pub fn stage(&self) -> ClassificationStage {
        match self {
            Self::PlayerCount { .. } => ClassificationStage::Unclassified,
            Self::GroupTooLarge { .. } | Self::NoFullGroup { .. } => ClassificationStage::Sized,
            Self::OverPowered { .. } => ClassificationStage::TeamShaped,
            Self::Depths => ClassificationStage::PowerChecked,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerCount { expected, actual } => {
                write!(f, "{actual} players, expected {expected}")
            }
            Self::GroupTooLarge { max, actual } => {
                write!(f, "group of {actual} exceeds {max}")
            }
            Self::NoFullGroup { size } => write!(f, "no group of {size}"),
            Self::OverPowered {
                player_id,
                average_item_power,
                ceiling,
            } => write!(
                f,
                "player {player_id} has {average_item_power} average item power, ceiling {ceiling}"
            ),
            Self::Depths => f.write_str("zero-fame kill (depths)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Hellgate(HellgateFormat),
    Neither,
}

impl Battle {
    /// Runs every stage for `format`, returning the first failed check.
    pub fn evaluate(&self, format: HellgateFormat, config: &HellgateConfig) -> Result<(), Rejection> {
        let team_size = format.team_size();

        let actual = self.players().len();
        if actual != format.player_count() {
            return Err(Rejection::PlayerCount {
                expected: format.player_count(),
                actual,
            });
        }

        let mut has_full_group = false;
        for event in self.events() {
            let group_size = event.group_members.len();
            if group_size > team_size {
                return Err(Rejection::GroupTooLarge {
                    max: team_size,
                    actual: group_size,
                });
            }
            has_full_group |= group_size == team_size;
        }
        if !has_full_group {
            return Err(Rejection::NoFullGroup { size: team_size });
        }

        let cap = format.power_cap(config);
        for player in self.players() {
            let ceiling =
                player.max_average_item_power(config.base_ip, cap) as f64 + config.artifact_allowance;
            if player.average_item_power > ceiling {
                return Err(Rejection::OverPowered {
                    player_id: player.id.clone(),
                    average_item_power: player.average_item_power,
                    ceiling,
                });
            }
        }

        if format.rejects_depths() && self.is_depths() {
            return Err(Rejection::Depths);
        }

        Ok(())
    }

    pub fn is_hellgate(&self, format: HellgateFormat, config: &HellgateConfig) -> bool {
        match self.evaluate(format, config) {
            Ok(()) => {
                log::debug!("Battle {} is a {} hellgate", self.id, format);
                true
            }
            Err(rejection) => {
                log::debug!("Battle {} is not {}: {}", self.id, format, rejection);
                false
            }
        }
    }

    pub fn is_hellgate_5v5(&self, config: &HellgateConfig) -> bool {
        self.is_hellgate(HellgateFormat::FiveVsFive, config)
    }

    pub fn is_hellgate_2v2(&self, config: &HellgateConfig) -> bool {
        self.is_hellgate(HellgateFormat::TwoVsTwo, config)
    }

    /// Any zero-fame kill means the fight happened in the depths.
    pub fn is_depths(&self) -> bool {
        self.events().iter().any(|event| event.kill_fame == 0)
    }

    pub fn classify(&self, config: &HellgateConfig) -> Classification {
        if self.is_hellgate_5v5(config) {
            Classification::Hellgate(HellgateFormat::FiveVsFive)
        } else if self.is_hellgate_2v2(config) {
            Classification::Hellgate(HellgateFormat::TwoVsTwo)
        } else {
            Classification::Neither
        }
    }
}
