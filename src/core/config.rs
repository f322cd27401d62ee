use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::item::PowerCap;
use super::model::Server;

/// Classification policy: power caps per format, the model's base IP, and the
/// weapons that mark a player as a healer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HellgateConfig {
    pub base_ip: f64,
    /// Tolerance added to the computed ceiling for power sources the model
    /// does not compute (artifact bonuses and the like).
    pub artifact_allowance: f64,
    pub five_vs_five: PowerCap,
    pub two_vs_two: PowerCap,
    pub healing_weapons: Vec<String>,
}

impl Default for HellgateConfig {
    fn default() -> Self {
        Self {
            base_ip: 300.0,
            artifact_allowance: 100.0,
            five_vs_five: PowerCap::new(1100.0, 35.0),
            two_vs_two: PowerCap::new(1200.0, 35.0),
            healing_weapons: default_healing_weapons(),
        }
    }
}

fn default_healing_weapons() -> Vec<String> {
    [
        "MAIN_HOLYSTAFF",
        "2H_HOLYSTAFF",
        "2H_DIVINESTAFF",
        "MAIN_HOLYSTAFF_MORGANA",
        "2H_HOLYSTAFF_HELL",
        "2H_HOLYSTAFF_UNDEAD",
        "MAIN_HOLYSTAFF_AVALON",
        "2H_HOLYSTAFF_CRYSTAL",
        "MAIN_NATURESTAFF",
        "2H_NATURESTAFF",
        "2H_WILDSTAFF",
        "MAIN_NATURESTAFF_KEEPER",
        "2H_NATURESTAFF_HELL",
        "2H_NATURESTAFF_KEEPER",
        "MAIN_NATURESTAFF_AVALON",
        "MAIN_NATURESTAFF_CRYSTAL",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Watcher settings, persisted as `settings.json`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Root of the battle dumps read by the directory source.
    pub battle_dir: PathBuf,
    pub reported_battles_path: PathBuf,
    /// Classified battles are appended here as JSON lines when set.
    #[serde(default)]
    pub records_path: Option<PathBuf>,
    pub check_interval_minutes: u64,
    /// How often the reported-battles ledger is emptied.
    #[serde(default = "default_ledger_reset_hours")]
    pub ledger_reset_hours: u64,
    /// Paging stops once a page holds a battle older than this.
    pub battles_max_age_minutes: i64,
    pub battles_page_limit: usize,
    pub servers: Vec<Server>,
    #[serde(default)]
    pub hellgate: HellgateConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            battle_dir: PathBuf::from("./battles"),
            reported_battles_path: PathBuf::from("./reported_battles.json"),
            records_path: None,
            check_interval_minutes: 1,
            ledger_reset_hours: default_ledger_reset_hours(),
            battles_max_age_minutes: 2,
            battles_page_limit: 50,
            servers: Server::all().to_vec(),
            hellgate: HellgateConfig::default(),
        }
    }
}

fn default_ledger_reset_hours() -> u64 {
    24
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Settings {
        if self.config_path.exists() {
            match fs::read_to_string(&self.config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(settings) => return settings,
                    Err(e) => log::warn!(
                        "Ignoring invalid settings at {:?}: {}",
                        self.config_path,
                        e
                    ),
                },
                Err(e) => log::warn!("Failed to read {:?}: {}", self.config_path, e),
            }
        }
        Settings::default()
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)
    }
}
