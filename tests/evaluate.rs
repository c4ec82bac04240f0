use stat_radar::evaluate::{evaluate_player, glitch_guard};
use stat_radar::state::{AlertKind, AlertToggles, MonitoredPlayer, PlayerSnapshot};

fn playing(minutes: u32) -> PlayerSnapshot {
    PlayerSnapshot {
        minutes,
        rating: 6.8,
        ..Default::default()
    }
}

fn entry(alerts: AlertToggles, last: Option<PlayerSnapshot>) -> MonitoredPlayer {
    MonitoredPlayer {
        id: 1,
        player_id: 305,
        name: "Saka".to_string(),
        event_id: 9002,
        alerts,
        last_stats: last,
        last_alerted_stats: None,
    }
}

#[test]
fn tackle_alert_fires_on_strict_increase() {
    let base = PlayerSnapshot {
        tackles: 2,
        ..playing(30)
    };
    let next = PlayerSnapshot {
        tackles: 3,
        ..playing(35)
    };
    let alerts = AlertToggles {
        tackles: true,
        ..Default::default()
    };

    let out = evaluate_player(&entry(alerts, Some(base)), next.clone());
    assert_eq!(out.alerts.len(), 1);
    assert_eq!(out.alerts[0].kind, AlertKind::Tackle);
    assert_eq!(out.alerts[0].player_name, "Saka");
    assert!(out.alerts[0].message.contains("total 3"));
    assert_eq!(out.player.last_stats, Some(next.clone()));
    assert_eq!(out.player.last_alerted_stats, Some(next));
}

#[test]
fn equal_counters_fire_nothing() {
    let base = PlayerSnapshot {
        tackles: 2,
        ..playing(30)
    };
    let next = PlayerSnapshot {
        tackles: 2,
        ..playing(35)
    };
    let alerts = AlertToggles {
        tackles: true,
        ..Default::default()
    };

    let out = evaluate_player(&entry(alerts, Some(base)), next.clone());
    assert!(out.alerts.is_empty());
    assert_eq!(out.player.last_stats, Some(next));
    // No alert fired, so the baseline must not move.
    assert_eq!(out.player.last_alerted_stats, None);
}

#[test]
fn disabled_toggle_suppresses_alert() {
    let base = PlayerSnapshot {
        tackles: 2,
        ..playing(30)
    };
    let next = PlayerSnapshot {
        tackles: 5,
        ..playing(35)
    };

    let out = evaluate_player(&entry(AlertToggles::default(), Some(base)), next);
    assert!(out.alerts.is_empty());
}

#[test]
fn decreased_counter_fires_nothing() {
    // A mid-match partial correction is not a glitch (minutes kept moving)
    // and must not alert either way.
    let base = PlayerSnapshot {
        tackles: 3,
        ..playing(30)
    };
    let next = PlayerSnapshot {
        tackles: 2,
        ..playing(35)
    };
    let alerts = AlertToggles {
        tackles: true,
        ..Default::default()
    };

    let out = evaluate_player(&entry(alerts, Some(base)), next);
    assert!(out.alerts.is_empty());
    assert!(!out.discarded);
}

#[test]
fn every_counter_alert_kind_fires() {
    let base = playing(40);
    let next = PlayerSnapshot {
        shots_on_target: 1,
        tackles: 1,
        yellow_cards: 1,
        fouls: 1,
        fouls_drawn: 1,
        interceptions: 1,
        duels_won: 1,
        ..playing(45)
    };
    let alerts = AlertToggles {
        tackles: true,
        fouls: true,
        fouls_drawn: true,
        shots_on: true,
        yellow: true,
        interceptions: true,
        duels_won: true,
        ..Default::default()
    };

    let out = evaluate_player(&entry(alerts, Some(base)), next);
    let kinds: Vec<AlertKind> = out.alerts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds.len(), 7);
    for kind in [
        AlertKind::ShotOnTarget,
        AlertKind::Tackle,
        AlertKind::YellowCard,
        AlertKind::FoulCommitted,
        AlertKind::FoulDrawn,
        AlertKind::Interception,
        AlertKind::DuelWon,
    ] {
        assert!(kinds.contains(&kind), "missing {kind:?}");
    }
}

#[test]
fn sub_out_fires_on_transition_only() {
    let on_pitch = PlayerSnapshot {
        is_substitute: false,
        ..playing(60)
    };
    let benched = PlayerSnapshot {
        is_substitute: true,
        ..playing(61)
    };
    let alerts = AlertToggles {
        sub_out: true,
        ..Default::default()
    };

    let out = evaluate_player(&entry(alerts, Some(on_pitch)), benched.clone());
    assert_eq!(out.alerts.len(), 1);
    assert_eq!(out.alerts[0].kind, AlertKind::SubbedOut);

    // Already on the bench: no transition, no alert.
    let still_benched = PlayerSnapshot {
        is_substitute: true,
        ..playing(62)
    };
    let out = evaluate_player(&out.player, still_benched);
    assert!(out.alerts.is_empty());
}

#[test]
fn shot_alert_suppressed_when_on_target_covers_it() {
    let base = PlayerSnapshot {
        shots_on_target: 1,
        shots_total: 3,
        ..playing(30)
    };
    let next = PlayerSnapshot {
        shots_on_target: 2,
        shots_total: 4,
        ..playing(35)
    };
    let alerts = AlertToggles {
        shots: true,
        shots_on: true,
        ..Default::default()
    };

    let out = evaluate_player(&entry(alerts, Some(base)), next);
    assert_eq!(out.alerts.len(), 1);
    assert_eq!(out.alerts[0].kind, AlertKind::ShotOnTarget);
}

#[test]
fn off_target_shot_still_alerts_alongside_shots_on() {
    let base = PlayerSnapshot {
        shots_on_target: 1,
        shots_total: 3,
        ..playing(30)
    };
    let next = PlayerSnapshot {
        shots_on_target: 1,
        shots_total: 4,
        ..playing(35)
    };
    let alerts = AlertToggles {
        shots: true,
        shots_on: true,
        ..Default::default()
    };

    let out = evaluate_player(&entry(alerts, Some(base)), next);
    assert_eq!(out.alerts.len(), 1);
    assert_eq!(out.alerts[0].kind, AlertKind::Shot);
}

#[test]
fn shot_alert_not_suppressed_when_shots_on_disabled() {
    let base = PlayerSnapshot {
        shots_on_target: 1,
        shots_total: 3,
        ..playing(30)
    };
    let next = PlayerSnapshot {
        shots_on_target: 2,
        shots_total: 4,
        ..playing(35)
    };
    let alerts = AlertToggles {
        shots: true,
        ..Default::default()
    };

    let out = evaluate_player(&entry(alerts, Some(base)), next);
    assert_eq!(out.alerts.len(), 1);
    assert_eq!(out.alerts[0].kind, AlertKind::Shot);
}

#[test]
fn first_observation_is_silent() {
    let next = PlayerSnapshot {
        tackles: 6,
        fouls: 3,
        yellow_cards: 1,
        ..playing(70)
    };
    let alerts = AlertToggles {
        tackles: true,
        fouls: true,
        yellow: true,
        ..Default::default()
    };

    let out = evaluate_player(&entry(alerts, None), next.clone());
    assert!(out.alerts.is_empty());
    assert_eq!(out.player.last_stats, Some(next));
    assert_eq!(out.player.last_alerted_stats, None);
}

#[test]
fn glitch_guard_rejects_zeroed_minutes() {
    let prev = playing(67);
    let zeroed = PlayerSnapshot::default();
    assert!(glitch_guard(&prev, &zeroed));
    assert!(!glitch_guard(&zeroed, &prev));
    assert!(!glitch_guard(&playing(0), &playing(0)));
}

#[test]
fn glitched_snapshot_is_a_no_op() {
    let prev = PlayerSnapshot {
        tackles: 4,
        ..playing(67)
    };
    let alerts = AlertToggles {
        tackles: true,
        ..Default::default()
    };
    let before = entry(alerts, Some(prev.clone()));

    let out = evaluate_player(&before, PlayerSnapshot::default());
    assert!(out.discarded);
    assert!(out.alerts.is_empty());
    assert_eq!(out.player.last_stats, Some(prev));
    assert_eq!(out.player.last_alerted_stats, None);
}

#[test]
fn alert_does_not_refire_after_baseline_advances() {
    let base = PlayerSnapshot {
        tackles: 2,
        ..playing(30)
    };
    let next = PlayerSnapshot {
        tackles: 3,
        ..playing(35)
    };
    let alerts = AlertToggles {
        tackles: true,
        ..Default::default()
    };

    let first = evaluate_player(&entry(alerts, Some(base)), next.clone());
    assert_eq!(first.alerts.len(), 1);

    let second = evaluate_player(&first.player, next);
    assert!(second.alerts.is_empty());
}

#[test]
fn baseline_is_last_alerted_not_last_fetched() {
    // A tackle was observed while the toggle was off, so the baseline never
    // advanced. Once the toggle is on, the increase over the baseline still
    // counts.
    let mut player = entry(AlertToggles::default(), Some(playing(30)));
    player.last_alerted_stats = Some(PlayerSnapshot {
        tackles: 2,
        ..playing(20)
    });
    player.last_stats = Some(PlayerSnapshot {
        tackles: 3,
        ..playing(30)
    });
    player.alerts.tackles = true;

    let next = PlayerSnapshot {
        tackles: 3,
        ..playing(35)
    };
    let out = evaluate_player(&player, next);
    assert_eq!(out.alerts.len(), 1);
    assert!(out.alerts[0].message.contains("total 3"));
}

#[test]
fn multiple_alerts_share_one_baseline() {
    let base = PlayerSnapshot {
        tackles: 1,
        fouls: 1,
        ..playing(30)
    };
    let next = PlayerSnapshot {
        tackles: 2,
        fouls: 2,
        ..playing(35)
    };
    let alerts = AlertToggles {
        tackles: true,
        fouls: true,
        ..Default::default()
    };

    let out = evaluate_player(&entry(alerts, Some(base)), next);
    assert_eq!(out.alerts.len(), 2);
}
