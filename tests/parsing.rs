use std::fs;
use std::path::PathBuf;

use stat_radar::lineup_fetch::{live_minute, parse_live_events_json, parse_roster_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_live_events_fixture() {
    let raw = read_fixture("live_events.json");
    // Ten minutes after both fixtures' period start.
    let rows = parse_live_events_json(&raw, 1000000 + 600).expect("fixture should parse");

    // The not-started fixture is filtered out.
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].id, 111);
    assert_eq!(rows[0].home, "Arsenal");
    assert_eq!(rows[0].away, "Chelsea");
    assert_eq!(rows[0].home_score, Some(1));
    assert_eq!(rows[0].away_score, Some(0));
    assert_eq!(rows[0].tournament, "Premier League");
    assert_eq!(rows[0].status, "1st half");
    assert_eq!(rows[0].minute, Some(10));

    // Second half starts the clock at 45; no tournament falls back.
    assert_eq!(rows[1].id, 222);
    assert_eq!(rows[1].minute, Some(55));
    assert_eq!(rows[1].tournament, "Unknown");
}

#[test]
fn live_minute_clamps_and_offsets() {
    assert_eq!(live_minute(Some(6), 1000, 1000 + 300), Some(5));
    assert_eq!(live_minute(Some(7), 1000, 1000 + 300), Some(50));
    // Clock skew must not go negative.
    assert_eq!(live_minute(Some(6), 1000, 900), Some(0));
}

#[test]
fn parses_roster_fixture_with_variant_keys() {
    let raw = read_fixture("lineups.json");
    let roster = parse_roster_json(&raw).expect("fixture should parse");

    assert_eq!(roster.home.name, "Arsenal");
    assert_eq!(roster.away.name, "Chelsea");
    assert_eq!(roster.home.starters.len(), 1);
    assert_eq!(roster.home.substitutes.len(), 1);

    let saka = roster.find_player(305).expect("saka in roster");
    assert_eq!(saka.name, "Saka");
    assert_eq!(saka.shirt_number, "7");
    let s = &saka.snapshot;
    assert_eq!(s.minutes, 34);
    assert_eq!(s.goals, 1);
    assert_eq!(s.assists, 1);
    // String-typed counter still parses.
    assert_eq!(s.shots_total, 3);
    assert_eq!(s.shots_on_target, 1);
    assert_eq!(s.key_passes, 1);
    assert_eq!(s.total_passes, 25);
    assert_eq!(s.tackles, 2);
    assert_eq!(s.fouls_drawn, 2);
    assert_eq!(s.yellow_cards, 1);
    // Nested under the defensive sub-object.
    assert_eq!(s.interceptions, 2);
    // Variant duel key.
    assert_eq!(s.duels_won, 3);
    assert!((s.rating - 7.4).abs() < f32::EPSILON);
    assert!(!s.is_substitute);

    // No statistics object at all: an all-zero snapshot, not an error.
    let trossard = roster.find_player(306).expect("trossard in roster");
    assert_eq!(trossard.position, "?");
    assert_eq!(trossard.snapshot.minutes, 0);
    assert_eq!(trossard.snapshot.tackles, 0);
    assert!(trossard.snapshot.is_substitute);

    // Alternate spellings and the keyword fallback on the away side.
    let palmer = roster.find_player(404).expect("palmer in roster");
    let p = &palmer.snapshot;
    assert_eq!(p.minutes, 34);
    assert_eq!(p.shots_total, 2);
    assert_eq!(p.shots_on_target, 2);
    assert_eq!(p.tackles, 1);
    assert_eq!(p.fouls, 1);
    assert_eq!(p.interceptions, 4);
    assert!((p.rating - 7.9).abs() < f32::EPSILON);
}

#[test]
fn null_bodies_parse_as_empty() {
    assert!(
        parse_live_events_json("null", 0)
            .expect("null should parse")
            .is_empty()
    );
    let roster = parse_roster_json("null").expect("null should parse");
    assert!(roster.all_players().next().is_none());

    let roster = parse_roster_json("  ").expect("blank should parse");
    assert!(roster.all_players().next().is_none());
}

#[test]
fn roster_without_sides_is_empty() {
    let roster = parse_roster_json(r#"{"confirmed":false}"#).expect("should parse");
    assert!(roster.all_players().next().is_none());
}
