use serde_json::Value;

use crate::state::PlayerSnapshot;

/// Prioritized lookup for one semantic field. `keys` are known upstream
/// spellings tried in order; `fragment` is a lowercase keyword used for a
/// last-resort substring scan over all keys, for fields the upstream keeps
/// renaming.
pub struct FieldLookup {
    pub keys: &'static [&'static str],
    pub fragment: Option<&'static str>,
}

/// Category sub-objects the upstream sometimes nests statistics under.
const CATEGORY_KEYS: &[&str] = &["defensive", "offensive", "passing", "duels", "general"];

pub const MINUTES: FieldLookup = FieldLookup {
    keys: &["minutesPlayed", "minutes"],
    fragment: None,
};
pub const GOALS: FieldLookup = FieldLookup {
    keys: &["goals"],
    fragment: None,
};
pub const ASSISTS: FieldLookup = FieldLookup {
    keys: &["goalAssist", "assists"],
    fragment: None,
};
pub const SHOTS_TOTAL: FieldLookup = FieldLookup {
    keys: &["totalShots", "shotsTotal"],
    fragment: None,
};
pub const SHOTS_ON_TARGET: FieldLookup = FieldLookup {
    keys: &["onTargetScoringAttempt", "shotsOnTarget"],
    fragment: None,
};
pub const KEY_PASSES: FieldLookup = FieldLookup {
    keys: &["keyPass", "keyPasses"],
    fragment: None,
};
pub const TOTAL_PASSES: FieldLookup = FieldLookup {
    keys: &["totalPass", "totalPasses"],
    fragment: None,
};
pub const TACKLES: FieldLookup = FieldLookup {
    keys: &["totalTackle", "tackles"],
    fragment: None,
};
pub const INTERCEPTIONS: FieldLookup = FieldLookup {
    keys: &[
        "interception",
        "interceptions",
        "totalInterception",
        "totalInterceptions",
        "interceptionWon",
        "interceptedPass",
    ],
    fragment: Some("intercept"),
};
pub const DUELS_WON: FieldLookup = FieldLookup {
    keys: &[
        "totalDuelWon",
        "duelsWon",
        "duelWon",
        "groundDuelsWon",
        "aerialDuelsWon",
    ],
    fragment: Some("duelwon"),
};
pub const FOULS: FieldLookup = FieldLookup {
    keys: &["fouls", "totalFoul", "foulsCommitted", "foul", "totalFouls"],
    fragment: None,
};
pub const FOULS_DRAWN: FieldLookup = FieldLookup {
    keys: &["wasFouled", "foulsDrawn", "foulsSuffered", "was_fouled"],
    fragment: None,
};
pub const YELLOW_CARDS: FieldLookup = FieldLookup {
    keys: &["yellowCards", "yellowCard"],
    fragment: None,
};
pub const RED_CARDS: FieldLookup = FieldLookup {
    keys: &["redCards", "redCard"],
    fragment: None,
};
pub const RATING: FieldLookup = FieldLookup {
    keys: &["rating"],
    fragment: None,
};

/// Resolve one field against a raw statistics object. Absence is not an
/// error; anything unresolvable is 0.
pub fn lookup_stat(stats: &Value, field: &FieldLookup) -> f64 {
    let Some(map) = stats.as_object() else {
        return 0.0;
    };

    // Known spellings first.
    for key in field.keys {
        if let Some(value) = map.get(*key)
            && let Some(num) = coerce_number(value)
        {
            return num;
        }
    }

    // Same spellings inside category sub-objects.
    for category in CATEGORY_KEYS {
        if let Some(Value::Object(sub)) = map.get(*category) {
            for key in field.keys {
                if let Some(value) = sub.get(*key)
                    && let Some(num) = coerce_number(value)
                {
                    return num;
                }
            }
        }
    }

    // Keyword scan over all keys as the last resort.
    if let Some(fragment) = field.fragment {
        for (key, value) in map {
            if key.to_lowercase().contains(fragment)
                && let Some(num) = coerce_number(value)
            {
                return num;
            }
        }
    }

    0.0
}

/// Map a raw, shape-varying statistics object into a canonical snapshot.
/// `is_substitute` comes from the roster row, not the statistics object.
/// Never fails: a missing or malformed object yields an all-zero snapshot.
pub fn normalize_stats(stats: &Value, is_substitute: bool) -> PlayerSnapshot {
    PlayerSnapshot {
        minutes: lookup_counter(stats, &MINUTES),
        goals: lookup_counter(stats, &GOALS),
        assists: lookup_counter(stats, &ASSISTS),
        shots_total: lookup_counter(stats, &SHOTS_TOTAL),
        shots_on_target: lookup_counter(stats, &SHOTS_ON_TARGET),
        key_passes: lookup_counter(stats, &KEY_PASSES),
        tackles: lookup_counter(stats, &TACKLES),
        interceptions: lookup_counter(stats, &INTERCEPTIONS),
        duels_won: lookup_counter(stats, &DUELS_WON),
        fouls: lookup_counter(stats, &FOULS),
        fouls_drawn: lookup_counter(stats, &FOULS_DRAWN),
        yellow_cards: lookup_counter(stats, &YELLOW_CARDS),
        red_cards: lookup_counter(stats, &RED_CARDS),
        total_passes: lookup_counter(stats, &TOTAL_PASSES),
        rating: lookup_stat(stats, &RATING) as f32,
        is_substitute,
    }
}

fn lookup_counter(stats: &Value, field: &FieldLookup) -> u32 {
    lookup_stat(stats, field).max(0.0) as u32
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
