use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use crate::core::{
    classify::HellgateFormat,
    config::{ConfigManager, HellgateConfig},
    outcome::{append_records, BattleRecord},
    source::DirectorySource,
    watcher::{HellgateWatcher, ServerScan},
};

/// Overrides the directory holding `settings.json`.
pub const CONFIG_DIR_ENV: &str = "HELLGATE_WATCHER_CONFIG";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn report(scan: &ServerScan, config: &HellgateConfig) -> Vec<BattleRecord> {
    let mut records = Vec::new();
    for format in [HellgateFormat::FiveVsFive, HellgateFormat::TwoVsTwo] {
        for battle in scan.battles(format) {
            let (team_a, team_b) = battle.ordered_teams(config);
            log::info!(
                "SERVER: {:<8} {} hellgate\n{}\tTeam A (ordered): {:?}\n\tTeam B (ordered): {:?}",
                scan.server.key(),
                format,
                battle,
                team_a,
                team_b
            );
            records.push(BattleRecord::from_battle(battle, scan.server));
        }
    }
    records
}

pub async fn run() {
    init_logging();

    let config_dir = std::env::var_os(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let config_manager = ConfigManager::new(config_dir);
    if !config_manager.config_path().exists() {
        // leave an editable copy of the defaults behind
        if let Err(e) = config_manager.save(&Default::default()) {
            log::warn!("Failed to write default settings: {}", e);
        }
    }
    let settings = config_manager.load();

    let source = Arc::new(DirectorySource::new(settings.battle_dir.clone()));
    let check_interval = Duration::from_secs(settings.check_interval_minutes.max(1) * 60);
    let ledger_reset = Duration::from_secs(settings.ledger_reset_hours.max(1) * 3600);
    let records_path = settings.records_path.clone();
    let mut watcher = HellgateWatcher::new(source, settings);
    let mut last_reset = Instant::now();

    log::info!(
        "Hellgate watcher started. Reading battles from {:?}",
        watcher.settings().battle_dir
    );

    loop {
        if last_reset.elapsed() >= ledger_reset {
            log::info!("Clearing reported battles");
            watcher.clear_reported();
            last_reset = Instant::now();
        }

        log::info!("Checking for new battle reports...");
        let scans = watcher.scan(chrono::Utc::now()).await;

        let config = &watcher.settings().hellgate;
        let records: Vec<BattleRecord> = scans.iter().flat_map(|scan| report(scan, config)).collect();
        if let Some(path) = &records_path {
            if let Err(e) = append_records(path, &records) {
                log::error!("Failed to write battle records to {:?}: {}", path, e);
            }
        }
        log::info!("Finished checking for new battle reports.");

        tokio::time::sleep(check_interval).await;
    }
}
