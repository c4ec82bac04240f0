use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use rand::Rng;

use crate::state::{LiveMatch, MatchRoster, PlayerSnapshot, RosterPlayer, RosterSide};

/// Offline statistics source: a pair of scripted fixtures whose counters
/// advance a little on every fetch. Selected with `STAT_SOURCE=sim`.
/// Occasionally serves a fully zeroed roster to exercise the glitch guard
/// the way the real upstream does on a bad day.
pub struct SimFeed {
    matches: Mutex<HashMap<u64, SimMatch>>,
}

struct SimMatch {
    home: String,
    away: String,
    tournament: String,
    minute: u32,
    roster: MatchRoster,
}

impl SimFeed {
    pub fn new() -> Self {
        let mut matches = HashMap::new();
        matches.insert(
            9001,
            SimMatch {
                home: "Brazil".to_string(),
                away: "Germany".to_string(),
                tournament: "Friendly".to_string(),
                minute: 12,
                roster: seed_roster_bra_ger(),
            },
        );
        matches.insert(
            9002,
            SimMatch {
                home: "Arsenal".to_string(),
                away: "Chelsea".to_string(),
                tournament: "Premier League".to_string(),
                minute: 33,
                roster: seed_roster_ars_che(),
            },
        );
        Self {
            matches: Mutex::new(matches),
        }
    }

    pub fn live_matches(&self) -> Vec<LiveMatch> {
        let guard = self.matches.lock().expect("sim feed lock poisoned");
        let mut out: Vec<LiveMatch> = guard
            .iter()
            .map(|(id, m)| LiveMatch {
                id: *id,
                home: m.home.clone(),
                away: m.away.clone(),
                home_score: Some(0),
                away_score: Some(0),
                tournament: m.tournament.clone(),
                minute: Some(m.minute),
                status: "1st half".to_string(),
            })
            .collect();
        out.sort_by_key(|m| m.id);
        out
    }

    /// Advance the scripted match one step and return its roster.
    pub fn fetch_roster(&self, event_id: u64) -> Result<Option<MatchRoster>> {
        let mut guard = self.matches.lock().expect("sim feed lock poisoned");
        let Some(sim) = guard.get_mut(&event_id) else {
            return Ok(None);
        };

        let mut rng = rand::thread_rng();

        // Rare upstream wipe: zeroed counters served once, state untouched.
        if rng.gen_bool(0.03) {
            return Ok(Some(zeroed(&sim.roster)));
        }

        sim.minute = (sim.minute + 1).min(90);
        let minute = sim.minute;
        for player in sides_mut(&mut sim.roster) {
            advance_player(player, minute, &mut rng);
        }

        Ok(Some(sim.roster.clone()))
    }
}

impl Default for SimFeed {
    fn default() -> Self {
        Self::new()
    }
}

fn sides_mut(roster: &mut MatchRoster) -> impl Iterator<Item = &mut RosterPlayer> {
    roster
        .home
        .starters
        .iter_mut()
        .chain(roster.home.substitutes.iter_mut())
        .chain(roster.away.starters.iter_mut())
        .chain(roster.away.substitutes.iter_mut())
}

fn advance_player(player: &mut RosterPlayer, minute: u32, rng: &mut impl Rng) {
    let s = &mut player.snapshot;
    if !s.is_substitute {
        s.minutes = minute;
    }
    if rng.gen_bool(0.08) {
        s.tackles += 1;
    }
    if rng.gen_bool(0.05) {
        s.fouls += 1;
    }
    if rng.gen_bool(0.05) {
        s.fouls_drawn += 1;
    }
    if rng.gen_bool(0.06) {
        s.shots_total += 1;
        if rng.gen_bool(0.5) {
            s.shots_on_target += 1;
        }
    }
    if rng.gen_bool(0.06) {
        s.interceptions += 1;
    }
    if rng.gen_bool(0.10) {
        s.duels_won += 1;
    }
    if s.yellow_cards == 0 && rng.gen_bool(0.015) {
        s.yellow_cards = 1;
    }
    if minute > 60 && !s.is_substitute && rng.gen_bool(0.02) {
        s.is_substitute = true;
    }
    s.total_passes += rng.gen_range(0..3);
    s.rating = (s.rating + rng.gen_range(-0.05..0.08)).clamp(5.0, 10.0);
}

fn zeroed(roster: &MatchRoster) -> MatchRoster {
    let wipe_side = |side: &RosterSide| RosterSide {
        name: side.name.clone(),
        starters: side.starters.iter().map(wipe_player).collect(),
        substitutes: side.substitutes.iter().map(wipe_player).collect(),
    };
    MatchRoster {
        home: wipe_side(&roster.home),
        away: wipe_side(&roster.away),
    }
}

fn wipe_player(player: &RosterPlayer) -> RosterPlayer {
    RosterPlayer {
        id: player.id,
        name: player.name.clone(),
        position: player.position.clone(),
        shirt_number: player.shirt_number.clone(),
        snapshot: PlayerSnapshot {
            is_substitute: player.snapshot.is_substitute,
            ..Default::default()
        },
    }
}

fn seed_roster_bra_ger() -> MatchRoster {
    MatchRoster {
        home: RosterSide {
            name: "Brazil".to_string(),
            starters: vec![
                starter(101, "Alisson", 1, "G"),
                starter(102, "Marquinhos", 4, "D"),
                starter(103, "Casemiro", 5, "M"),
                starter(104, "Paqueta", 7, "M"),
                starter(105, "Vini Jr", 10, "F"),
            ],
            substitutes: vec![bench(106, "Rodrygo", 11, "F")],
        },
        away: RosterSide {
            name: "Germany".to_string(),
            starters: vec![
                starter(201, "Neuer", 1, "G"),
                starter(202, "Rudiger", 2, "D"),
                starter(203, "Kimmich", 6, "M"),
                starter(204, "Musiala", 10, "M"),
                starter(205, "Gnabry", 11, "F"),
            ],
            substitutes: vec![bench(206, "Havertz", 9, "F")],
        },
    }
}

fn seed_roster_ars_che() -> MatchRoster {
    MatchRoster {
        home: RosterSide {
            name: "Arsenal".to_string(),
            starters: vec![
                starter(301, "Raya", 22, "G"),
                starter(302, "Saliba", 2, "D"),
                starter(303, "Rice", 41, "M"),
                starter(304, "Odegaard", 8, "M"),
                starter(305, "Saka", 7, "F"),
            ],
            substitutes: vec![bench(306, "Trossard", 19, "F")],
        },
        away: RosterSide {
            name: "Chelsea".to_string(),
            starters: vec![
                starter(401, "Sanchez", 1, "G"),
                starter(402, "Colwill", 26, "D"),
                starter(403, "Caicedo", 25, "M"),
                starter(404, "Palmer", 10, "M"),
                starter(405, "Jackson", 15, "F"),
            ],
            substitutes: vec![bench(406, "Nkunku", 18, "F")],
        },
    }
}

fn starter(id: u64, name: &str, number: u32, pos: &str) -> RosterPlayer {
    sim_player(id, name, number, pos, false)
}

fn bench(id: u64, name: &str, number: u32, pos: &str) -> RosterPlayer {
    sim_player(id, name, number, pos, true)
}

fn sim_player(id: u64, name: &str, number: u32, pos: &str, substitute: bool) -> RosterPlayer {
    RosterPlayer {
        id,
        name: name.to_string(),
        position: pos.to_string(),
        shirt_number: number.to_string(),
        snapshot: PlayerSnapshot {
            rating: 6.5,
            is_substitute: substitute,
            ..Default::default()
        },
    }
}
