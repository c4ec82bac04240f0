use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Result;
use rayon::prelude::*;

use crate::evaluate::evaluate_player;
use crate::state::{AlertEvent, MatchRoster, MonitoredPlayer};

/// The statistics-source seam: one roster fetch per match id. `Ok(None)`
/// means no lineup data for that match this cycle.
pub type RosterFetch = dyn Fn(u64) -> Result<Option<MatchRoster>> + Send + Sync;

pub const MIN_POLL_SECS: u64 = 10;
pub const MAX_POLL_SECS: u64 = 120;

#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    pub interval: Duration,
    pub parallelism: usize,
}

impl MonitorConfig {
    pub fn from_env() -> Self {
        let secs = env::var("POLL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(30)
            .clamp(MIN_POLL_SECS, MAX_POLL_SECS);
        let parallelism = env::var("FETCH_PARALLELISM")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(4)
            .clamp(2, 32);
        Self {
            interval: Duration::from_secs(secs),
            parallelism,
        }
    }
}

pub enum MonitorCommand {
    UpdatePlayers(Vec<MonitoredPlayer>),
    SetInterval(u64),
    ForceCheck,
    Stop,
}

pub enum MonitorEvent {
    Log(String),
    Cycle(CycleOutcome),
}

/// Everything one fetch-evaluate pass produced: the registry as it should
/// be persisted, the alerts to dispatch, and any log lines.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub players: Vec<MonitoredPlayer>,
    pub alerts: Vec<AlertEvent>,
    pub logs: Vec<String>,
}

/// One fetch-evaluate-alert pass over the whole watchlist. Players are
/// grouped by match so each match is fetched once; matches are fetched
/// concurrently; a failed match skips only its own players.
pub fn run_cycle(
    players: &[MonitoredPlayer],
    fetch: &(dyn Fn(u64) -> Result<Option<MatchRoster>> + Sync),
    pool: Option<&rayon::ThreadPool>,
) -> CycleOutcome {
    let mut by_event: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
    for (idx, player) in players.iter().enumerate() {
        by_event.entry(player.event_id).or_default().push(idx);
    }

    let event_ids: Vec<u64> = by_event.keys().copied().collect();
    let rosters: Vec<(u64, Result<Option<MatchRoster>>)> = with_fetch_pool(pool, || {
        event_ids.par_iter().map(|id| (*id, fetch(*id))).collect()
    });

    let mut updated = players.to_vec();
    let mut alerts = Vec::new();
    let mut logs = Vec::new();

    for (event_id, result) in rosters {
        let roster = match result {
            Ok(Some(roster)) => roster,
            // No lineup data: nothing to evaluate for this match.
            Ok(None) => continue,
            Err(err) => {
                logs.push(format!(
                    "[WARN] Roster fetch failed for match {event_id}: {err}"
                ));
                continue;
            }
        };

        for idx in &by_event[&event_id] {
            let entry = &updated[*idx];
            let Some(found) = roster.find_player(entry.player_id) else {
                continue;
            };
            let outcome = evaluate_player(entry, found.snapshot.clone());
            if outcome.discarded {
                let had = entry.last_stats.as_ref().map(|s| s.minutes).unwrap_or(0);
                logs.push(format!(
                    "[WARN] Discarded zeroed snapshot for {} (had {had} minutes)",
                    entry.name
                ));
                continue;
            }
            alerts.extend(outcome.alerts);
            updated[*idx] = outcome.player;
        }
    }

    CycleOutcome {
        players: updated,
        alerts,
        logs,
    }
}

/// A monitoring session owning its worker thread and all scheduler state.
/// Cycles never overlap; stopping mid-cycle lets in-flight fetches finish
/// but discards that cycle's alerts and updates.
pub struct MonitorSession {
    cmd_tx: Sender<MonitorCommand>,
    active: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MonitorSession {
    pub fn start(
        players: Vec<MonitoredPlayer>,
        config: MonitorConfig,
        fetch: Arc<RosterFetch>,
        event_tx: Sender<MonitorEvent>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = channel();
        let active = Arc::new(AtomicBool::new(true));
        let running = Arc::new(AtomicBool::new(false));

        let worker_active = active.clone();
        let worker_running = running.clone();
        let handle = thread::spawn(move || {
            worker_loop(
                players,
                config,
                fetch,
                cmd_rx,
                event_tx,
                worker_active,
                worker_running,
            );
        });

        Self {
            cmd_tx,
            active,
            running,
            handle: Some(handle),
        }
    }

    pub fn update_players(&self, players: Vec<MonitoredPlayer>) {
        let _ = self.cmd_tx.send(MonitorCommand::UpdatePlayers(players));
    }

    pub fn set_interval(&self, secs: u64) {
        let _ = self.cmd_tx.send(MonitorCommand::SetInterval(secs));
    }

    /// Ask for an out-of-band check. Coalesced: at most one extra cycle
    /// runs, it never overlaps a cycle in flight, and it resets the
    /// countdown to the next scheduled one.
    pub fn force_check(&self) {
        let _ = self.cmd_tx.send(MonitorCommand::ForceCheck);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop monitoring and join the worker. Takes effect at the next fetch
    /// boundary; a cycle already in flight completes its fetches but its
    /// results are discarded.
    pub fn stop(mut self) {
        self.active.store(false, Ordering::SeqCst);
        let _ = self.cmd_tx.send(MonitorCommand::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MonitorSession {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

fn worker_loop(
    mut players: Vec<MonitoredPlayer>,
    config: MonitorConfig,
    fetch: Arc<RosterFetch>,
    cmd_rx: Receiver<MonitorCommand>,
    event_tx: Sender<MonitorEvent>,
    active: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
) {
    let pool = build_fetch_pool(config.parallelism);
    let tick = Duration::from_millis(250);
    let mut interval = config.interval;
    // First check fires right away, like the countdown starting expired.
    let mut last_cycle = Instant::now() - interval;

    let _ = event_tx.send(MonitorEvent::Log(format!(
        "[INFO] Watching {} players every {}s",
        players.len(),
        interval.as_secs()
    )));

    loop {
        thread::sleep(tick);

        let mut forced = false;
        while let Ok(cmd) = cmd_rx.try_recv() {
            match cmd {
                MonitorCommand::UpdatePlayers(next) => players = next,
                MonitorCommand::SetInterval(secs) => {
                    interval = Duration::from_secs(secs.clamp(MIN_POLL_SECS, MAX_POLL_SECS));
                }
                MonitorCommand::ForceCheck => forced = true,
                MonitorCommand::Stop => return,
            }
        }
        if !active.load(Ordering::SeqCst) {
            return;
        }
        if players.is_empty() {
            continue;
        }
        if !forced && last_cycle.elapsed() < interval {
            continue;
        }
        if running.swap(true, Ordering::SeqCst) {
            // A cycle is already in flight; the request stays coalesced.
            continue;
        }

        let outcome = run_cycle(&players, fetch.as_ref(), pool.as_ref());

        running.store(false, Ordering::SeqCst);
        last_cycle = Instant::now();

        if !active.load(Ordering::SeqCst) {
            // Stopped while fetches were in flight: nothing is committed.
            return;
        }

        players = outcome.players.clone();
        let _ = event_tx.send(MonitorEvent::Cycle(outcome));
    }
}

fn build_fetch_pool(parallelism: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .build()
        .ok()
}

fn with_fetch_pool<T>(pool: Option<&rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool {
        pool.install(action)
    } else {
        action()
    }
}
