use crate::state::{AlertEvent, AlertKind, MonitoredPlayer, PlayerSnapshot};

/// Result of running one player through the guard and the evaluator.
#[derive(Debug, Clone)]
pub struct PlayerOutcome {
    pub player: MonitoredPlayer,
    pub alerts: Vec<AlertEvent>,
    /// True when the glitch guard rejected the snapshot; `player` is then
    /// the entry unchanged.
    pub discarded: bool,
}

/// True when the new snapshot looks like an upstream data wipe rather than
/// real play: minutes reset to zero after the player had been on the pitch.
/// Deliberately narrow; partial corruption is indistinguishable from
/// legitimate substitution resets and is not guarded.
pub fn glitch_guard(prev: &PlayerSnapshot, next: &PlayerSnapshot) -> bool {
    next.minutes == 0 && prev.minutes > 0
}

/// Compare a fresh snapshot against the player's alerting baseline and emit
/// one alert per enabled, strictly-increased stat. The baseline is
/// `last_alerted_stats` when an alert has fired before, else `last_stats`;
/// every condition is evaluated against that same baseline, so several
/// alerts can fire in one cycle.
///
/// On return: `last_stats` is the new snapshot (unless the guard tripped),
/// and `last_alerted_stats` advanced to it only if something fired.
pub fn evaluate_player(entry: &MonitoredPlayer, next: PlayerSnapshot) -> PlayerOutcome {
    if let Some(prev) = &entry.last_stats
        && glitch_guard(prev, &next)
    {
        return PlayerOutcome {
            player: entry.clone(),
            alerts: Vec::new(),
            discarded: true,
        };
    }

    let mut alerts = Vec::new();

    if let Some(base) = entry.last_alerted_stats.as_ref().or(entry.last_stats.as_ref()) {
        let toggles = &entry.alerts;

        if toggles.shots_on && next.shots_on_target > base.shots_on_target {
            alerts.push(alert(
                entry,
                AlertKind::ShotOnTarget,
                format!("Shot on target (total {})", next.shots_on_target),
            ));
        }
        if toggles.tackles && next.tackles > base.tackles {
            alerts.push(alert(
                entry,
                AlertKind::Tackle,
                format!("New tackle (total {})", next.tackles),
            ));
        }
        if toggles.yellow && next.yellow_cards > base.yellow_cards {
            alerts.push(alert(
                entry,
                AlertKind::YellowCard,
                format!("Yellow card (total {})", next.yellow_cards),
            ));
        }
        if toggles.fouls && next.fouls > base.fouls {
            alerts.push(alert(
                entry,
                AlertKind::FoulCommitted,
                format!("Foul committed (total {})", next.fouls),
            ));
        }
        if toggles.fouls_drawn && next.fouls_drawn > base.fouls_drawn {
            alerts.push(alert(
                entry,
                AlertKind::FoulDrawn,
                format!("Foul drawn (total {})", next.fouls_drawn),
            ));
        }
        if toggles.shots && next.shots_total > base.shots_total {
            // When the extra shot is also on target and the on-target alert
            // is armed, that alert already covers this kick.
            let on_target = next.shots_on_target > base.shots_on_target;
            if !on_target || !toggles.shots_on {
                alerts.push(alert(
                    entry,
                    AlertKind::Shot,
                    format!("Shot attempt (total {})", next.shots_total),
                ));
            }
        }
        if toggles.interceptions && next.interceptions > base.interceptions {
            alerts.push(alert(
                entry,
                AlertKind::Interception,
                format!("Interception (total {})", next.interceptions),
            ));
        }
        if toggles.duels_won && next.duels_won > base.duels_won {
            alerts.push(alert(
                entry,
                AlertKind::DuelWon,
                format!("Duel won (total {})", next.duels_won),
            ));
        }
        if toggles.sub_out && !base.is_substitute && next.is_substitute {
            alerts.push(alert(
                entry,
                AlertKind::SubbedOut,
                "Substituted out".to_string(),
            ));
        }
    }

    let mut player = entry.clone();
    if !alerts.is_empty() {
        player.last_alerted_stats = Some(next.clone());
    }
    player.last_stats = Some(next);

    PlayerOutcome {
        player,
        alerts,
        discarded: false,
    }
}

fn alert(entry: &MonitoredPlayer, kind: AlertKind, message: String) -> AlertEvent {
    AlertEvent {
        kind,
        player_name: entry.name.clone(),
        message,
    }
}
