//! Polls a [`BattleSource`] for fresh battles and picks out the hellgates.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinSet;

use super::battle::{parse_timestamp, Battle};
use super::classify::{Classification, HellgateFormat};
use super::config::Settings;
use super::error::{SourceError, WatchError};
use super::model::{BattleId, RawBattle, RawEvent, Server};
use super::reported::ReportedBattles;
use super::source::BattleSource;

/// Largest battle worth fetching events for.
pub const MAX_HELLGATE_PLAYERS: usize = 10;

type EventFetch = Result<Option<Vec<RawEvent>>, SourceError>;

/// Result of one pass over a server.
#[derive(Debug)]
pub struct ServerScan {
    pub server: Server,
    pub five_vs_five: Vec<Battle>,
    pub two_vs_two: Vec<Battle>,
    /// Battles seen for the first time.
    pub parsed: usize,
    /// Battles already in the ledger.
    pub skipped: usize,
    /// Battles whose events could not be fetched or built.
    pub failed: usize,
}

impl ServerScan {
    fn empty(server: Server) -> Self {
        Self {
            server,
            five_vs_five: Vec::new(),
            two_vs_two: Vec::new(),
            parsed: 0,
            skipped: 0,
            failed: 0,
        }
    }

    pub fn battles(&self, format: HellgateFormat) -> &[Battle] {
        match format {
            HellgateFormat::FiveVsFive => &self.five_vs_five,
            HellgateFormat::TwoVsTwo => &self.two_vs_two,
        }
    }
}

/// True when the battle started more than `max_age_minutes` before `now`.
/// A summary with an unreadable start time counts as out of range.
pub fn is_out_of_range(battle: &RawBattle, now: DateTime<Utc>, max_age_minutes: i64) -> bool {
    match parse_timestamp(&battle.start_time) {
        Ok(start) => now - start > Duration::minutes(max_age_minutes),
        Err(e) => {
            log::warn!("Battle {}: {}", battle.id, e);
            true
        }
    }
}

pub struct HellgateWatcher<S: BattleSource + 'static> {
    source: Arc<S>,
    settings: Settings,
    reported: ReportedBattles,
}

impl<S: BattleSource + 'static> HellgateWatcher<S> {
    pub fn new(source: Arc<S>, settings: Settings) -> Self {
        let reported = ReportedBattles::load(&settings.reported_battles_path);
        Self {
            source,
            settings,
            reported,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn reported(&self) -> &ReportedBattles {
        &self.reported
    }

    /// Forgets every reported battle and persists the empty ledger.
    pub fn clear_reported(&mut self) {
        self.reported.clear();
        if let Err(e) = self.reported.save() {
            log::error!("Failed to save {:?}: {}", self.reported.path(), e);
        }
    }

    /// Scans every configured server, then persists the ledger.
    pub async fn scan(&mut self, now: DateTime<Utc>) -> Vec<ServerScan> {
        let servers = self.settings.servers.clone();
        let mut scans = Vec::with_capacity(servers.len());
        for server in servers {
            scans.push(self.scan_server(server, now).await);
        }

        if let Err(e) = self.reported.save() {
            log::error!("Failed to save {:?}: {}", self.reported.path(), e);
        }
        scans
    }

    pub async fn scan_server(&mut self, server: Server, now: DateTime<Utc>) -> ServerScan {
        let mut scan = ServerScan::empty(server);

        let summaries = match self.recent_battles(server, now).await {
            Ok(summaries) => summaries,
            Err(e) => {
                log::error!("SERVER: {:<8} Failed to list battles: {}", server.key(), e);
                return scan;
            }
        };

        let mut candidates = Vec::new();
        for summary in summaries {
            if !self.reported.mark(server, summary.id) {
                scan.skipped += 1;
                continue;
            }
            scan.parsed += 1;
            if summary.player_count() <= MAX_HELLGATE_PLAYERS {
                candidates.push(summary);
            }
        }

        let events = self.fetch_events(server, &candidates).await;
        let config = &self.settings.hellgate;

        for (summary, fetched) in candidates.iter().zip(events) {
            // a dead fetch task has already been logged
            let Some(fetched) = fetched else {
                scan.failed += 1;
                continue;
            };

            let battle = fetched
                .map_err(WatchError::from)
                .and_then(|raw_events| Battle::new(summary, raw_events).map_err(WatchError::from));

            let battle = match battle {
                Ok(battle) => battle,
                Err(e) => {
                    log::warn!("An error occurred while parsing battle {}: {}", summary.id, e);
                    scan.failed += 1;
                    continue;
                }
            };

            match battle.classify(config) {
                Classification::Hellgate(HellgateFormat::FiveVsFive) => scan.five_vs_five.push(battle),
                Classification::Hellgate(HellgateFormat::TwoVsTwo) => scan.two_vs_two.push(battle),
                Classification::Neither => {}
            }
        }

        log::info!(
            "SERVER: {:<8} Parsed {} battles, skipped {}, failed {}",
            server.key(),
            scan.parsed,
            scan.skipped,
            scan.failed
        );
        log::info!(
            "SERVER: {:<8} Found {} 5v5 and {} 2v2 hellgate battles",
            server.key(),
            scan.five_vs_five.len(),
            scan.two_vs_two.len()
        );

        scan
    }

    /// Pages through the listing until a page reaches past the age limit or
    /// the listing runs out. Battles on the last page are kept even if old.
    async fn recent_battles(&self, server: Server, now: DateTime<Utc>) -> Result<Vec<RawBattle>, SourceError> {
        let limit = self.settings.battles_page_limit;
        let max_age = self.settings.battles_max_age_minutes;

        let mut battles = Vec::new();
        let mut offset = 0;
        loop {
            let page = self.source.recent_battles(server, offset, limit).await?;
            let page_len = page.len();
            let reached_old = page.iter().any(|b| is_out_of_range(b, now, max_age));
            battles.extend(page);

            if reached_old || page_len == 0 || page_len < limit {
                break;
            }
            offset += limit;
        }

        log::debug!("SERVER: {} listed {} battles", server.key(), battles.len());
        Ok(battles)
    }

    /// Fetches event lists concurrently. The result lines up with `summaries`;
    /// `None` marks a fetch task that died.
    async fn fetch_events(
        &self,
        server: Server,
        summaries: &[RawBattle],
    ) -> Vec<Option<EventFetch>> {
        let mut results: Vec<Option<EventFetch>> = (0..summaries.len()).map(|_| None).collect();

        let mut tasks = JoinSet::new();
        for (index, summary) in summaries.iter().enumerate() {
            let source = Arc::clone(&self.source);
            let id = summary.id;
            tasks.spawn(async move { (index, source.battle_events(server, id).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => log::error!("Event fetch task failed: {}", e),
            }
        }

        results
    }

    /// Builds a single battle by id, regardless of age or ledger.
    pub async fn battle_from_id(&self, server: Server, id: BattleId) -> Result<Battle, WatchError> {
        let summary = self
            .source
            .battle(server, id)
            .await?
            .ok_or(SourceError::Missing(id))?;
        let events = self.source.battle_events(server, id).await?;
        Ok(Battle::new(&summary, events)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tempfile::tempdir;

    use super::*;
    use crate::core::fixtures::{self, raw_battle};

    #[derive(Default)]
    struct MemorySource {
        listings: HashMap<Server, Vec<RawBattle>>,
        events: HashMap<BattleId, Vec<RawEvent>>,
        broken_listings: HashSet<Server>,
        page_requests: AtomicUsize,
    }

    #[async_trait]
    impl BattleSource for MemorySource {
        async fn recent_battles(
            &self,
            server: Server,
            offset: usize,
            limit: usize,
        ) -> Result<Vec<RawBattle>, SourceError> {
            self.page_requests.fetch_add(1, Ordering::SeqCst);
            if self.broken_listings.contains(&server) {
                return Err(SourceError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "listing unavailable",
                )));
            }
            let listing = self.listings.get(&server).cloned().unwrap_or_default();
            Ok(listing.into_iter().skip(offset).take(limit).collect())
        }

        async fn battle_events(
            &self,
            _server: Server,
            id: BattleId,
        ) -> Result<Option<Vec<RawEvent>>, SourceError> {
            Ok(self.events.get(&id).cloned())
        }

        async fn battle(&self, server: Server, id: BattleId) -> Result<Option<RawBattle>, SourceError> {
            Ok(self
                .listings
                .get(&server)
                .and_then(|battles| battles.iter().find(|b| b.id == id).cloned()))
        }
    }

    fn now() -> DateTime<Utc> {
        parse_timestamp(fixtures::START_TIME).unwrap() + Duration::minutes(1)
    }

    fn old_battle(id: BattleId) -> RawBattle {
        let mut battle = raw_battle(id, 4);
        battle.start_time = "2025-03-01T17:00:00Z".to_string();
        battle
    }

    fn settings(dir: &std::path::Path, servers: Vec<Server>) -> Settings {
        Settings {
            reported_battles_path: dir.join("reported.json"),
            servers,
            ..Settings::default()
        }
    }

    fn europe_source() -> MemorySource {
        let mut source = MemorySource::default();
        source.listings.insert(
            Server::Europe,
            vec![raw_battle(1, 10), raw_battle(2, 4), raw_battle(3, 20), raw_battle(4, 4)],
        );
        source.events.insert(1, fixtures::five_vs_five_events(1000.0));
        source.events.insert(2, fixtures::two_vs_two_events(1000.0, 5000));
        source.events.insert(3, fixtures::five_vs_five_events(1000.0));
        // battle 4 has no event list
        source
    }

    #[tokio::test]
    async fn test_scan_classifies_new_battles() {
        let dir = tempdir().unwrap();
        let mut watcher = HellgateWatcher::new(
            Arc::new(europe_source()),
            settings(dir.path(), vec![Server::Europe]),
        );

        let scans = watcher.scan(now()).await;
        assert_eq!(scans.len(), 1);
        let scan = &scans[0];
        assert_eq!(scan.server, Server::Europe);
        assert_eq!(scan.parsed, 4);
        assert_eq!(scan.skipped, 0);
        assert_eq!(scan.failed, 1);

        let five: Vec<BattleId> = scan.five_vs_five.iter().map(|b| b.id).collect();
        let two: Vec<BattleId> = scan.battles(HellgateFormat::TwoVsTwo).iter().map(|b| b.id).collect();
        assert_eq!(five, vec![1]);
        assert_eq!(two, vec![2]);

        // every listed battle is reported, including the oversized one
        for id in 1..=4 {
            assert!(watcher.reported().contains(Server::Europe, id));
        }
        assert!(dir.path().join("reported.json").exists());
    }

    #[tokio::test]
    async fn test_second_scan_skips_reported_battles() {
        let dir = tempdir().unwrap();
        let source = Arc::new(europe_source());
        let settings = settings(dir.path(), vec![Server::Europe]);

        let mut watcher = HellgateWatcher::new(Arc::clone(&source), settings.clone());
        watcher.scan(now()).await;

        // a fresh watcher picks the ledger up from disk
        let mut watcher = HellgateWatcher::new(source, settings);
        let scans = watcher.scan(now()).await;
        assert_eq!(scans[0].parsed, 0);
        assert_eq!(scans[0].skipped, 4);
        assert!(scans[0].five_vs_five.is_empty());
        assert!(scans[0].two_vs_two.is_empty());
    }

    #[tokio::test]
    async fn test_clear_reported_allows_rescan() {
        let dir = tempdir().unwrap();
        let mut watcher = HellgateWatcher::new(
            Arc::new(europe_source()),
            settings(dir.path(), vec![Server::Europe]),
        );
        watcher.scan(now()).await;
        watcher.clear_reported();

        let scans = watcher.scan(now()).await;
        assert_eq!(scans[0].parsed, 4);
        assert_eq!(scans[0].five_vs_five.len(), 1);
    }

    #[tokio::test]
    async fn test_paging_stops_at_old_battle() {
        let dir = tempdir().unwrap();
        let mut source = MemorySource::default();
        let mut listing: Vec<RawBattle> = (1..=4).map(|id| raw_battle(id, 30)).collect();
        listing.push(old_battle(5));
        listing.extend((6..=9).map(old_battle));
        source.listings.insert(Server::Europe, listing);
        let source = Arc::new(source);

        let mut settings = settings(dir.path(), vec![Server::Europe]);
        settings.battles_page_limit = 3;
        let mut watcher = HellgateWatcher::new(Arc::clone(&source), settings);

        let scans = watcher.scan(now()).await;
        assert_eq!(source.page_requests.load(Ordering::SeqCst), 2);
        assert_eq!(scans[0].parsed, 6);
        assert!(watcher.reported().contains(Server::Europe, 6));
        assert!(!watcher.reported().contains(Server::Europe, 7));
    }

    #[tokio::test]
    async fn test_short_page_ends_listing() {
        let dir = tempdir().unwrap();
        let mut source = MemorySource::default();
        source
            .listings
            .insert(Server::Asia, vec![raw_battle(1, 30), raw_battle(2, 30)]);
        let source = Arc::new(source);

        let mut watcher = HellgateWatcher::new(Arc::clone(&source), settings(dir.path(), vec![Server::Asia]));
        let scans = watcher.scan(now()).await;
        assert_eq!(source.page_requests.load(Ordering::SeqCst), 1);
        assert_eq!(scans[0].parsed, 2);
    }

    #[tokio::test]
    async fn test_listing_failure_does_not_stop_other_servers() {
        let dir = tempdir().unwrap();
        let mut source = europe_source();
        source.broken_listings.insert(Server::Americas);

        let mut watcher = HellgateWatcher::new(
            Arc::new(source),
            settings(dir.path(), vec![Server::Americas, Server::Europe]),
        );
        let scans = watcher.scan(now()).await;

        assert_eq!(scans.len(), 2);
        assert_eq!(scans[0].server, Server::Americas);
        assert_eq!(scans[0].parsed, 0);
        assert_eq!(scans[1].five_vs_five.len(), 1);
    }

    #[tokio::test]
    async fn test_battle_from_id() {
        let dir = tempdir().unwrap();
        let watcher = HellgateWatcher::new(
            Arc::new(europe_source()),
            settings(dir.path(), vec![Server::Europe]),
        );

        let battle = watcher.battle_from_id(Server::Europe, 2).await.unwrap();
        assert!(battle.is_hellgate_2v2(&watcher.settings().hellgate));

        assert!(matches!(
            watcher.battle_from_id(Server::Europe, 4).await,
            Err(WatchError::Battle(_))
        ));
        assert!(matches!(
            watcher.battle_from_id(Server::Europe, 99).await,
            Err(WatchError::Source(SourceError::Missing(99)))
        ));
    }

    #[test]
    fn test_is_out_of_range() {
        let recent = raw_battle(1, 2);
        assert!(!is_out_of_range(&recent, now(), 2));
        assert!(is_out_of_range(&old_battle(2), now(), 2));

        let mut garbled = raw_battle(3, 2);
        garbled.start_time = "soon".to_string();
        assert!(is_out_of_range(&garbled, now(), 2));
    }
}
