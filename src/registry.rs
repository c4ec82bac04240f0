use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::state::{MonitoredPlayer, RosterPlayer};

const STORE_DIR: &str = "stat_radar";
const STORE_FILE: &str = "watchlist.json";
const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct WatchlistFile {
    version: u32,
    players: Vec<MonitoredPlayer>,
}

/// Load the watchlist from the default store. Missing, unreadable, or
/// version-mismatched files all read as an empty list.
pub fn load() -> Vec<MonitoredPlayer> {
    let Some(path) = store_path() else {
        return Vec::new();
    };
    load_from(&path)
}

pub fn load_from(path: &Path) -> Vec<MonitoredPlayer> {
    let Ok(raw) = fs::read_to_string(path) else {
        return Vec::new();
    };
    let Ok(file) = serde_json::from_str::<WatchlistFile>(&raw) else {
        return Vec::new();
    };
    if file.version != STORE_VERSION {
        return Vec::new();
    }
    file.players
}

pub fn save(players: &[MonitoredPlayer]) {
    let Some(path) = store_path() else {
        return;
    };
    let _ = save_to(&path, players);
}

pub fn save_to(path: &Path, players: &[MonitoredPlayer]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("create watchlist dir")?;
    }
    let file = WatchlistFile {
        version: STORE_VERSION,
        players: players.to_vec(),
    };
    let json = serde_json::to_string(&file).context("serialize watchlist")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write watchlist")?;
    fs::rename(&tmp, path).context("swap watchlist")?;
    Ok(())
}

/// Subscribe to one player from a live match's roster. The entry is seeded
/// with the roster snapshot so it does not start from zero, except cards:
/// the upstream's card data is unreliable at selection time, so both card
/// counters start at zero. Returns the new internal id.
pub fn add_player(
    players: &mut Vec<MonitoredPlayer>,
    event_id: u64,
    roster_player: &RosterPlayer,
) -> Result<u64> {
    if players.iter().any(|p| p.player_id == roster_player.id) {
        anyhow::bail!("{} is already on the watchlist", roster_player.name);
    }

    let id = next_id(players);
    let mut seed = roster_player.snapshot.clone();
    seed.yellow_cards = 0;
    seed.red_cards = 0;

    players.push(MonitoredPlayer {
        id,
        player_id: roster_player.id,
        name: roster_player.name.clone(),
        event_id,
        alerts: Default::default(),
        last_stats: Some(seed),
        last_alerted_stats: None,
    });
    Ok(id)
}

pub fn remove_player(players: &mut Vec<MonitoredPlayer>, id: u64) -> bool {
    let before = players.len();
    players.retain(|p| p.id != id);
    players.len() != before
}

/// Flip one alert switch by its CLI name. Returns the new value.
pub fn flip_alert(players: &mut [MonitoredPlayer], id: u64, name: &str) -> Result<bool> {
    let Some(player) = players.iter_mut().find(|p| p.id == id) else {
        anyhow::bail!("no watchlist entry with id {id}");
    };
    player
        .alerts
        .flip(name)
        .with_context(|| format!("unknown alert name {name:?}"))
}

// Millisecond timestamp, bumped past any existing id so rapid adds and
// clock hiccups still produce unique, never-reused ids.
fn next_id(players: &[MonitoredPlayer]) -> u64 {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    let max = players.iter().map(|p| p.id).max().unwrap_or(0);
    now.max(max + 1)
}

fn store_path() -> Option<PathBuf> {
    // Prefer XDG data dir.
    if let Ok(base) = std::env::var("XDG_DATA_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(STORE_DIR).join(STORE_FILE));
    }
    // Fallback to ~/.local/share on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(STORE_DIR)
            .join(STORE_FILE),
    )
}
