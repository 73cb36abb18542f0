//! Monster turns played by the server.

mod common;

use combat_core::{
    CapturedMonster, CollisionMap, CombatEvent, CombatIndex, DamageCause, MonsterId, PlayerId,
    PlayerProfile, SpellId, SummonId, TilePos, UnitRef,
};
use combat_runtime::{ClientCommand, ProfileStore, RuntimeConfig};
use tokio::time::{Duration, Instant};

use common::{advance, config, harness};

const PLAYER: UnitRef = UnitRef::Player(PlayerId(1));
const PIOU: UnitRef = UnitRef::Monster(CombatIndex(0));
const SUMMON: UnitRef = UnitRef::Summon(SummonId(1));

#[tokio::test(start_paused = true)]
async fn monster_walks_into_melee_then_bites() {
    let mut h = harness(
        config((3, 0), (0, 0), &[(0, 0)]),
        Some(CollisionMap::new(8, 8)),
    );
    let combat_id = h.started(1, TilePos::new(0, 0), &[("piou", 1)]).await;
    h.drain();

    h.send(1, ClientCommand::EndTurn { combat_id }).await;

    // The walk is broadcast at once; the bite waits for the walk to finish.
    let events = h.drain_events();
    assert!(events.contains(&CombatEvent::UnitMoved {
        unit: PIOU,
        path: vec![TilePos::new(1, 0), TilePos::new(2, 0)],
        seq: 1,
    }));
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, CombatEvent::SpellCast { .. }))
    );
    let session = h.session(combat_id).await.unwrap();
    assert_eq!(session.active, Some(PIOU));
    assert!(session.ai_running);

    // 2 steps at 300 ms each.
    advance(500).await;
    assert!(h.drain().is_empty());
    advance(200).await;

    let events = h.drain_events();
    assert!(matches!(
        &events[0],
        CombatEvent::SpellCast { caster, spell_id, target, authoritative: true, .. }
            if *caster == PIOU && *spell_id == SpellId::from("bite") && *target == TilePos::new(3, 0)
    ));
    assert!(matches!(
        &events[1],
        CombatEvent::DamageApplied { target, amount: 4, hp: 46, cause: DamageCause::Spell, .. }
            if *target == PLAYER
    ));
    assert!(events.contains(&CombatEvent::TurnStarted {
        unit: PLAYER,
        round: 2
    }));
    let session = h.session(combat_id).await.unwrap();
    assert!(!session.ai_running);
    assert_eq!(session.snapshot().unwrap().tile_of(PIOU), Some(TilePos::new(2, 0)));
}

#[tokio::test(start_paused = true)]
async fn adjacent_monster_attacks_without_moving() {
    let mut h = harness(
        config((1, 0), (0, 0), &[(0, 0)]),
        Some(CollisionMap::new(8, 8)),
    );
    let combat_id = h.started(1, TilePos::new(2, 2), &[("piou", 1)]).await;
    h.drain();

    h.send(1, ClientCommand::EndTurn { combat_id }).await;

    let events = h.drain_events();
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, CombatEvent::UnitMoved { .. }))
    );
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::DamageApplied { target, amount: 4, .. } if *target == PLAYER
    )));
    assert_eq!(h.session(combat_id).await.unwrap().active, Some(PLAYER));
}

#[tokio::test(start_paused = true)]
async fn ending_the_combat_cancels_a_pending_attack() {
    let mut h = harness(
        config((3, 0), (0, 0), &[(0, 0)]),
        Some(CollisionMap::new(8, 8)),
    );
    let combat_id = h.started(1, TilePos::new(0, 0), &[("piou", 1)]).await;
    h.send(1, ClientCommand::EndTurn { combat_id }).await;
    h.drain();

    assert!(h.handle.abort(combat_id).await.unwrap());
    advance(1_000).await;

    let events = h.drain_events();
    assert_eq!(events.len(), 1, "{events:?}");
    assert!(matches!(events[0], CombatEvent::CombatEnded { .. }));
    assert_eq!(h.profile(1).hp, 50);
}

#[tokio::test(start_paused = true)]
async fn summon_hunts_monsters_on_its_own_turn() {
    let mut h = harness(
        config((0, 0), (4, 0), &[(0, 0)]),
        Some(CollisionMap::new(8, 8)),
    );
    h.profiles
        .put(PlayerProfile {
            captured: Some(CapturedMonster {
                monster_id: MonsterId::from("piou"),
                level: 1,
            }),
            ..h.profile(1)
        })
        .unwrap();
    let combat_id = h.started(1, TilePos::new(0, 0), &[("piou", 1)]).await;
    let summoned = h
        .send(
            1,
            ClientCommand::CastSpell {
                combat_id,
                spell_id: SpellId::from("call"),
                target: TilePos::new(1, 0),
            },
        )
        .await;
    assert!(summoned.is_applied(), "{summoned:?}");
    h.drain();

    h.send(1, ClientCommand::EndTurn { combat_id }).await;

    let events = h.drain_events();
    assert!(events.contains(&CombatEvent::TurnStarted {
        unit: SUMMON,
        round: 1
    }));
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::UnitMoved { unit, path, .. }
            if *unit == SUMMON && *path == vec![TilePos::new(2, 0), TilePos::new(3, 0)]
    )));
    let session = h.session(combat_id).await.unwrap();
    assert_eq!(session.active, Some(SUMMON));
    assert!(session.ai_running);

    advance(700).await;

    let events = h.drain_events();
    assert!(matches!(
        &events[0],
        CombatEvent::SpellCast { caster, spell_id, target, authoritative: true, .. }
            if *caster == SUMMON && *spell_id == SpellId::from("bite") && *target == TilePos::new(4, 0)
    ));
    assert!(matches!(
        &events[1],
        CombatEvent::DamageApplied { target, amount: 4, hp: 16, cause: DamageCause::Spell, .. }
            if *target == PIOU
    ));
    assert!(events.contains(&CombatEvent::TurnStarted {
        unit: PIOU,
        round: 1
    }));
}

#[tokio::test(start_paused = true)]
async fn settling_waits_for_the_walk_but_not_for_players() {
    let mut h = harness(
        RuntimeConfig {
            player_turn_timeout_ms: Some(30_000),
            ..config((3, 0), (0, 0), &[(0, 0)])
        },
        Some(CollisionMap::new(8, 8)),
    );
    let combat_id = h.started(1, TilePos::new(0, 0), &[("piou", 1)]).await;
    h.send(1, ClientCommand::EndTurn { combat_id }).await;
    h.drain();

    let before = Instant::now();
    h.handle.settled().await.unwrap();

    assert!(before.elapsed() >= Duration::from_millis(600));
    let events = h.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::SpellCast { caster, .. } if *caster == PIOU
    )));
    assert_eq!(h.session(combat_id).await.unwrap().active, Some(PLAYER));

    // The player's turn is open; settling returns at once.
    let before = Instant::now();
    h.handle.settled().await.unwrap();
    assert_eq!(before.elapsed(), Duration::ZERO);
}
