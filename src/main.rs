use std::env;
use std::sync::Arc;
use std::sync::mpsc::channel;

use anyhow::{Context, Result};
use chrono::Local;

use stat_radar::fake_feed::SimFeed;
use stat_radar::monitor::{MonitorConfig, MonitorEvent, MonitorSession, RosterFetch};
use stat_radar::state::{AlertToggles, LiveMatch, MatchRoster, MonitoredPlayer, RosterPlayer};
use stat_radar::{lineup_fetch, registry};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("live") => cmd_live(),
        Some("roster") => cmd_roster(&args[1..]),
        Some("add") => cmd_add(&args[1..]),
        Some("rm") => cmd_rm(&args[1..]),
        Some("toggle") => cmd_toggle(&args[1..]),
        Some("clear") => cmd_clear(),
        Some("list") => cmd_list(),
        Some("watch") | None => cmd_watch(),
        Some(other) => {
            eprintln!("unknown command: {other}");
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    eprintln!("usage: stat_radar [command]");
    eprintln!("  live                     list live matches");
    eprintln!("  roster <match-id>        list a live match's players");
    eprintln!("  add <match-id> <player>  watch a player from that match");
    eprintln!("  toggle <id> <alert>      flip an alert for a watchlist entry");
    eprintln!("  rm <id>                  drop a watchlist entry");
    eprintln!("  list                     show the watchlist");
    eprintln!("  clear                    drop every watchlist entry");
    eprintln!("  watch                    poll and print alerts (default)");
    eprintln!();
    eprintln!("alerts: {}", AlertToggles::NAMES.join(", "));
}

fn sim_mode() -> bool {
    env::var("STAT_SOURCE")
        .map(|val| val.trim().eq_ignore_ascii_case("sim"))
        .unwrap_or(false)
}

fn fetch_live_matches() -> Result<Vec<LiveMatch>> {
    if sim_mode() {
        Ok(SimFeed::new().live_matches())
    } else {
        lineup_fetch::fetch_live_matches()
    }
}

fn fetch_roster(event_id: u64) -> Result<Option<MatchRoster>> {
    if sim_mode() {
        SimFeed::new().fetch_roster(event_id)
    } else {
        lineup_fetch::fetch_match_roster(event_id)
    }
}

fn roster_fetch_source() -> Arc<RosterFetch> {
    if sim_mode() {
        let feed = SimFeed::new();
        Arc::new(move |event_id| feed.fetch_roster(event_id))
    } else {
        Arc::new(lineup_fetch::fetch_match_roster)
    }
}

fn cmd_live() -> Result<()> {
    let matches = fetch_live_matches()?;
    if matches.is_empty() {
        println!("no live matches right now");
        return Ok(());
    }
    for m in matches {
        let score = match (m.home_score, m.away_score) {
            (Some(h), Some(a)) => format!("{h}-{a}"),
            _ => "-".to_string(),
        };
        let minute = m.minute.map(|v| format!("{v}'")).unwrap_or_default();
        println!(
            "{:>10}  {} {} {}  [{}] {} {}",
            m.id, m.home, score, m.away, m.tournament, m.status, minute
        );
    }
    Ok(())
}

fn cmd_roster(args: &[String]) -> Result<()> {
    let event_id = parse_id(args.first(), "match id")?;
    let Some(roster) = fetch_roster(event_id)? else {
        println!("no lineup data for match {event_id}");
        return Ok(());
    };
    for side in [&roster.home, &roster.away] {
        println!("{}:", side.name);
        for player in side.starters.iter().chain(side.substitutes.iter()) {
            let bench = if player.snapshot.is_substitute {
                " (bench)"
            } else {
                ""
            };
            println!(
                "  {:>9}  #{:<3} {:<28} {}{}",
                player.id, player.shirt_number, player.name, player.position, bench
            );
        }
    }
    Ok(())
}

fn cmd_add(args: &[String]) -> Result<()> {
    let event_id = parse_id(args.first(), "match id")?;
    let player_id = parse_id(args.get(1), "player id")?;

    let roster = fetch_roster(event_id)?
        .with_context(|| format!("no lineup data for match {event_id}"))?;
    let roster_player: &RosterPlayer = roster
        .find_player(player_id)
        .with_context(|| format!("player {player_id} is not in match {event_id}'s lineups"))?;

    let mut players = registry::load();
    let id = registry::add_player(&mut players, event_id, roster_player)?;
    registry::save(&players);
    println!(
        "watching {} (entry {id}); enable alerts with: stat_radar toggle {id} <alert>",
        roster_player.name
    );
    Ok(())
}

fn cmd_rm(args: &[String]) -> Result<()> {
    let id = parse_id(args.first(), "entry id")?;
    let mut players = registry::load();
    if registry::remove_player(&mut players, id) {
        registry::save(&players);
        println!("removed entry {id}");
    } else {
        println!("no entry {id}");
    }
    Ok(())
}

fn cmd_toggle(args: &[String]) -> Result<()> {
    let id = parse_id(args.first(), "entry id")?;
    let name = args.get(1).context("missing alert name")?;
    let mut players = registry::load();
    let now_on = registry::flip_alert(&mut players, id, name)?;
    registry::save(&players);
    println!("{name} is now {}", if now_on { "on" } else { "off" });
    Ok(())
}

fn cmd_clear() -> Result<()> {
    registry::save(&[]);
    println!("watchlist cleared");
    Ok(())
}

fn cmd_list() -> Result<()> {
    let players = registry::load();
    if players.is_empty() {
        println!("watchlist is empty; use `stat_radar add <match-id> <player-id>`");
        return Ok(());
    }
    for p in &players {
        println!(
            "{:>4}  {:<28} player {:<9} match {:<10} alerts: {}",
            p.id,
            p.name,
            p.player_id,
            p.event_id,
            enabled_alerts(p)
        );
    }
    Ok(())
}

fn enabled_alerts(player: &MonitoredPlayer) -> String {
    let mut names = Vec::new();
    let t = &player.alerts;
    for (on, name) in [
        (t.tackles, "tackles"),
        (t.fouls, "fouls"),
        (t.fouls_drawn, "fouls-drawn"),
        (t.shots, "shots"),
        (t.shots_on, "shots-on"),
        (t.yellow, "yellow"),
        (t.sub_out, "sub-out"),
        (t.interceptions, "interceptions"),
        (t.duels_won, "duels-won"),
    ] {
        if on {
            names.push(name);
        }
    }
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

fn cmd_watch() -> Result<()> {
    let players = registry::load();
    if players.is_empty() {
        anyhow::bail!("watchlist is empty; add players first (see `stat_radar list`)");
    }
    for p in &players {
        if !p.alerts.any_enabled() {
            println!(
                "{} [INFO] {} has no alerts enabled",
                timestamp(),
                p.name
            );
        }
    }
    if sim_mode() {
        println!("{} [INFO] Using simulated feed", timestamp());
    }

    let (tx, rx) = channel();
    let _session = MonitorSession::start(players, MonitorConfig::from_env(), roster_fetch_source(), tx);

    for event in rx {
        match event {
            MonitorEvent::Log(line) => println!("{} {line}", timestamp()),
            MonitorEvent::Cycle(outcome) => {
                for line in &outcome.logs {
                    println!("{} {line}", timestamp());
                }
                for alert in &outcome.alerts {
                    println!(
                        "{} [ALERT] {}: {}",
                        timestamp(),
                        alert.title(),
                        alert.body()
                    );
                }
                registry::save(&outcome.players);
            }
        }
    }
    Ok(())
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

fn parse_id(arg: Option<&String>, what: &str) -> Result<u64> {
    arg.with_context(|| format!("missing {what}"))?
        .parse::<u64>()
        .with_context(|| format!("invalid {what}"))
}
