use serde::{Deserialize, Serialize};

/// Per-player alert switches. Everything starts off; the user opts in per
/// player and per stat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertToggles {
    #[serde(default)]
    pub tackles: bool,
    #[serde(default)]
    pub fouls: bool,
    #[serde(default)]
    pub fouls_drawn: bool,
    #[serde(default)]
    pub shots: bool,
    #[serde(default)]
    pub shots_on: bool,
    #[serde(default)]
    pub yellow: bool,
    #[serde(default)]
    pub sub_out: bool,
    #[serde(default)]
    pub interceptions: bool,
    #[serde(default)]
    pub duels_won: bool,
}

impl AlertToggles {
    pub const NAMES: &'static [&'static str] = &[
        "tackles",
        "fouls",
        "fouls-drawn",
        "shots",
        "shots-on",
        "yellow",
        "sub-out",
        "interceptions",
        "duels-won",
    ];

    /// Flip one switch by its CLI name. Returns the new value, or `None`
    /// for an unknown name.
    pub fn flip(&mut self, name: &str) -> Option<bool> {
        let slot = match name {
            "tackles" => &mut self.tackles,
            "fouls" => &mut self.fouls,
            "fouls-drawn" => &mut self.fouls_drawn,
            "shots" => &mut self.shots,
            "shots-on" => &mut self.shots_on,
            "yellow" => &mut self.yellow,
            "sub-out" => &mut self.sub_out,
            "interceptions" => &mut self.interceptions,
            "duels-won" => &mut self.duels_won,
            _ => return None,
        };
        *slot = !*slot;
        Some(*slot)
    }

    pub fn any_enabled(&self) -> bool {
        self.tackles
            || self.fouls
            || self.fouls_drawn
            || self.shots
            || self.shots_on
            || self.yellow
            || self.sub_out
            || self.interceptions
            || self.duels_won
    }
}

/// Point-in-time cumulative statistics for one player. Counters only move
/// up within a match when the upstream feed behaves; the glitch guard in
/// `evaluate` handles the times it does not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub minutes: u32,
    // Attack
    pub goals: u32,
    pub assists: u32,
    pub shots_total: u32,
    pub shots_on_target: u32,
    pub key_passes: u32,
    // Defense
    pub tackles: u32,
    pub interceptions: u32,
    pub duels_won: u32,
    // Discipline
    pub fouls: u32,
    pub fouls_drawn: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    // General
    pub total_passes: u32,
    pub rating: f32,
    pub is_substitute: bool,
}

/// One watchlist entry: a user's subscription to one player in one match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoredPlayer {
    /// Internal id, assigned once at creation and never reused.
    pub id: u64,
    /// The upstream API's player id.
    pub player_id: u64,
    pub name: String,
    /// The upstream API's match id.
    pub event_id: u64,
    pub alerts: AlertToggles,
    /// Most recent snapshot accepted by the glitch guard.
    #[serde(default)]
    pub last_stats: Option<PlayerSnapshot>,
    /// Snapshot at which an alert last fired; the comparison baseline.
    /// Stays put across quiet cycles so jitter cannot erase what was
    /// already alerted.
    #[serde(default)]
    pub last_alerted_stats: Option<PlayerSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    ShotOnTarget,
    Shot,
    Tackle,
    Interception,
    DuelWon,
    FoulCommitted,
    FoulDrawn,
    YellowCard,
    SubbedOut,
}

/// An emitted alert. Consumed once by the notification channel; the engine
/// keeps no record of it beyond the advanced baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub player_name: String,
    pub message: String,
}

impl AlertEvent {
    /// Title/body pair for the notification channel.
    pub fn title(&self) -> &str {
        &self.player_name
    }

    pub fn body(&self) -> &str {
        &self.message
    }
}

/// One live fixture as listed by the live-events endpoint.
#[derive(Debug, Clone)]
pub struct LiveMatch {
    pub id: u64,
    pub home: String,
    pub away: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub tournament: String,
    pub minute: Option<u32>,
    pub status: String,
}

/// A roster row: one player as found in a match's lineup payload, with the
/// statistics object already normalized.
#[derive(Debug, Clone)]
pub struct RosterPlayer {
    pub id: u64,
    pub name: String,
    pub position: String,
    pub shirt_number: String,
    pub snapshot: PlayerSnapshot,
}

#[derive(Debug, Clone, Default)]
pub struct RosterSide {
    pub name: String,
    pub starters: Vec<RosterPlayer>,
    pub substitutes: Vec<RosterPlayer>,
}

/// Both lineups for one match.
#[derive(Debug, Clone, Default)]
pub struct MatchRoster {
    pub home: RosterSide,
    pub away: RosterSide,
}

impl MatchRoster {
    /// Starters and bench of both sides, in payload order.
    pub fn all_players(&self) -> impl Iterator<Item = &RosterPlayer> {
        self.home
            .starters
            .iter()
            .chain(self.home.substitutes.iter())
            .chain(self.away.starters.iter())
            .chain(self.away.substitutes.iter())
    }

    pub fn find_player(&self, player_id: u64) -> Option<&RosterPlayer> {
        self.all_players().find(|p| p.id == player_id)
    }
}
