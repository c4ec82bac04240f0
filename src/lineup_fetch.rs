use std::env;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CACHE_CONTROL, ORIGIN, REFERER, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;

use crate::state::{LiveMatch, MatchRoster, RosterPlayer, RosterSide};
use crate::stats_normalize::normalize_stats;

const SOFA_API_BASE: &str = "https://api.sofascore.com/api/v1";
const REQUEST_TIMEOUT_SECS: u64 = 10;

// The upstream blocks generic clients intermittently; the mobile-app agent
// passes most of the time, and the browser profile is the fallback strategy
// for the last retry of a blocked request.
const MOBILE_USER_AGENT: &str = "SofaScore/6.1.5 (Android 13; SM-S918B; en)";
const WEB_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Mobile Safari/537.36";

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

fn request_retries() -> u32 {
    env::var("REQUEST_RETRIES")
        .ok()
        .and_then(|val| val.parse::<u32>().ok())
        .unwrap_or(3)
        .clamp(0, 6)
}

enum Attempt {
    Body(String),
    NotFound,
    Retry(String),
}

/// GET a JSON body with bounded exponential backoff. `Ok(None)` is a 404;
/// 403 and 5xx responses are retried, flipping to browser-style headers on
/// the final attempt.
pub fn fetch_json(url: &str) -> Result<Option<String>> {
    let client = http_client()?;
    let retries = request_retries();
    let mut delay = Duration::from_millis(1000);
    let mut web_headers = false;
    let mut attempt = 0u32;

    loop {
        match send_once(client, url, web_headers)? {
            Attempt::Body(body) => return Ok(Some(body)),
            Attempt::NotFound => return Ok(None),
            Attempt::Retry(reason) => {
                if attempt >= retries {
                    anyhow::bail!("request failed after {attempt} retries: {reason}");
                }
                thread::sleep(delay);
                delay *= 2;
                attempt += 1;
                if attempt == retries {
                    web_headers = !web_headers;
                }
            }
        }
    }
}

fn send_once(client: &Client, url: &str, web_headers: bool) -> Result<Attempt> {
    let agent = if web_headers {
        WEB_USER_AGENT
    } else {
        MOBILE_USER_AGENT
    };
    let mut req = client
        .get(url)
        .header(USER_AGENT, agent)
        .header(ACCEPT, "application/json, text/plain, */*")
        .header(CACHE_CONTROL, "no-cache");
    if web_headers {
        req = req
            .header(ORIGIN, "https://www.sofascore.com")
            .header(REFERER, "https://www.sofascore.com/");
    }

    let resp = match req.send() {
        Ok(resp) => resp,
        Err(err) => return Ok(Attempt::Retry(format!("transport: {err}"))),
    };

    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(Attempt::NotFound);
    }
    if status == StatusCode::FORBIDDEN || status.is_server_error() {
        return Ok(Attempt::Retry(format!("http {status}")));
    }

    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        anyhow::bail!("http {}: {}", status, body);
    }
    Ok(Attempt::Body(body))
}

/// All fixtures currently in progress. Falls back to the scheduled-events
/// listing for today when the live endpoint comes back empty, which the
/// upstream does sporadically.
pub fn fetch_live_matches() -> Result<Vec<LiveMatch>> {
    let now = Utc::now().timestamp();

    let url = format!("{SOFA_API_BASE}/sport/football/events/live");
    let live = match fetch_json(&url)? {
        Some(body) => parse_live_events_json(&body, now)?,
        None => Vec::new(),
    };
    if !live.is_empty() {
        return Ok(live);
    }

    let today = Utc::now().date_naive().format("%Y-%m-%d");
    let url = format!("{SOFA_API_BASE}/sport/football/scheduled-events/{today}");
    match fetch_json(&url)? {
        Some(body) => parse_live_events_json(&body, now),
        None => Ok(Vec::new()),
    }
}

/// Both lineups for one match, statistics normalized per player.
/// `Ok(None)` means the match has no lineup data yet (or no longer exists).
pub fn fetch_match_roster(event_id: u64) -> Result<Option<MatchRoster>> {
    let url = format!("{SOFA_API_BASE}/event/{event_id}/lineups");
    let Some(body) = fetch_json(&url)? else {
        return Ok(None);
    };
    let roster = parse_roster_json(&body)?;
    if roster.all_players().next().is_none() {
        return Ok(None);
    }
    Ok(Some(roster))
}

#[derive(Debug, Deserialize)]
struct SofaEventsResponse {
    #[serde(default)]
    events: Vec<SofaEvent>,
}

#[derive(Debug, Deserialize)]
struct SofaEvent {
    id: u64,
    #[serde(rename = "homeTeam")]
    home_team: SofaTeam,
    #[serde(rename = "awayTeam")]
    away_team: SofaTeam,
    #[serde(default, rename = "homeScore")]
    home_score: Option<SofaScoreBox>,
    #[serde(default, rename = "awayScore")]
    away_score: Option<SofaScoreBox>,
    #[serde(default)]
    tournament: Option<SofaTournament>,
    status: SofaStatus,
    #[serde(default)]
    time: Option<SofaTime>,
}

#[derive(Debug, Deserialize)]
struct SofaTeam {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SofaScoreBox {
    #[serde(default)]
    current: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SofaTournament {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SofaStatus {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SofaTime {
    #[serde(default, rename = "currentPeriodStartTimestamp")]
    current_period_start: Option<i64>,
}

/// Parse an events listing, keeping only fixtures in progress. `now` is a
/// unix timestamp used to derive the live minute.
pub fn parse_live_events_json(raw: &str, now: i64) -> Result<Vec<LiveMatch>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let data: SofaEventsResponse =
        serde_json::from_str(trimmed).context("invalid events json")?;

    let mut out = Vec::new();
    for event in data.events {
        if event.status.kind.as_deref() != Some("inprogress") {
            continue;
        }
        let minute = event
            .time
            .as_ref()
            .and_then(|t| t.current_period_start)
            .and_then(|start| live_minute(event.status.code, start, now));
        out.push(LiveMatch {
            id: event.id,
            home: event.home_team.name,
            away: event.away_team.name,
            home_score: event.home_score.and_then(|s| s.current),
            away_score: event.away_score.and_then(|s| s.current),
            tournament: event
                .tournament
                .map(|t| t.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            minute,
            status: event
                .status
                .description
                .unwrap_or_else(|| "Live".to_string()),
        });
    }
    Ok(out)
}

/// Elapsed minute from the current period's start. Status code 7 is the
/// second half, which starts the clock at 45.
pub fn live_minute(status_code: Option<i64>, period_start: i64, now: i64) -> Option<u32> {
    let mut diff = (now - period_start) / 60;
    if status_code == Some(7) {
        diff += 45;
    }
    if diff < 0 {
        diff = 0;
    }
    Some(diff as u32)
}

/// Parse a lineups payload. Tolerates null/empty bodies and missing sides;
/// statistics objects of any shape go through the normalizer.
pub fn parse_roster_json(raw: &str) -> Result<MatchRoster> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(MatchRoster::default());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid lineups json")?;

    Ok(MatchRoster {
        home: parse_roster_side(root.get("home"), "Home"),
        away: parse_roster_side(root.get("away"), "Away"),
    })
}

fn parse_roster_side(value: Option<&Value>, fallback_name: &str) -> RosterSide {
    let Some(value) = value else {
        return RosterSide::default();
    };
    let name = pick_string(value, &["name", "teamName"])
        .unwrap_or_else(|| fallback_name.to_string());

    let mut starters = Vec::new();
    let mut substitutes = Vec::new();
    if let Some(rows) = value.get("players").and_then(|v| v.as_array()) {
        for row in rows {
            let Some(player) = parse_roster_player(row) else {
                continue;
            };
            if player.snapshot.is_substitute {
                substitutes.push(player);
            } else {
                starters.push(player);
            }
        }
    }

    RosterSide {
        name,
        starters,
        substitutes,
    }
}

fn parse_roster_player(row: &Value) -> Option<RosterPlayer> {
    let info = row.get("player").unwrap_or(row);
    let id = pick_u64(info, &["id", "playerId"])?;
    let name = pick_string(info, &["name", "shortName"])
        .unwrap_or_else(|| "Unknown".to_string());
    let position = pick_string(info, &["position"]).unwrap_or_else(|| "?".to_string());
    let shirt_number = pick_string(info, &["shirtNumber", "jerseyNumber"]).unwrap_or_default();
    // The bench flag lives on the row, not the statistics object.
    let substitute = row
        .get("substitute")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let stats = row.get("statistics").unwrap_or(&Value::Null);

    Some(RosterPlayer {
        id,
        name,
        position,
        shirt_number,
        snapshot: normalize_stats(stats, substitute),
    })
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(*key)
            && let Some(s) = as_string(v)
        {
            return Some(s);
        }
    }
    None
}

fn pick_u64(value: &Value, keys: &[&str]) -> Option<u64> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = v.as_u64() {
                return Some(num);
            }
            if let Some(s) = v.as_str()
                && let Ok(num) = s.parse::<u64>()
            {
                return Some(num);
            }
        }
    }
    None
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
