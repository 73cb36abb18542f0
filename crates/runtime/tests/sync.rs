//! Client synchronization: checksums, snapshot bootstrap and reported damage.

mod common;

use combat_core::{
    CollisionMap, CombatEvent, CombatIndex, PlayerId, TilePos, UnitRef, session_checksum,
};
use combat_runtime::{ClientCommand, Topic};

use common::{config, harness};

const PLAYER: UnitRef = UnitRef::Player(PlayerId(1));
const PIOU: UnitRef = UnitRef::Monster(CombatIndex(0));

#[tokio::test(start_paused = true)]
async fn checksum_mismatch_resends_the_full_state() {
    let mut h = harness(
        config((0, 0), (3, 0), &[(0, 0)]),
        Some(CollisionMap::new(10, 6)),
    );
    let combat_id = h.started(1, TilePos::new(2, 2), &[("piou", 1)]).await;
    let mut sync = h.handle.subscribe(Topic::Sync);
    let session = h.session(combat_id).await.unwrap();
    let good = session_checksum(&session);
    h.drain();

    let matched = h
        .send(1, ClientCommand::ReportChecksum { combat_id, checksum: good })
        .await;
    assert!(matched.is_applied());
    assert!(h.drain().is_empty());

    h.send(
        1,
        ClientCommand::ReportChecksum {
            combat_id,
            checksum: good.wrapping_add(1),
        },
    )
    .await;

    let resync = sync.try_recv().unwrap();
    assert!(matches!(
        &resync.event,
        CombatEvent::CombatState { resync: true, checksum, .. } if *checksum == good
    ));
    let after = h.session(combat_id).await.unwrap();
    assert_eq!(after.snapshot(), session.snapshot());
    assert_eq!(session_checksum(&after), good);
}

#[tokio::test(start_paused = true)]
async fn first_bootstrap_wins_then_locks() {
    let mut h = harness(
        config((0, 0), (3, 0), &[(0, 0)]),
        Some(CollisionMap::new(10, 6)),
    );
    let combat_id = h.started(1, TilePos::new(2, 2), &[("piou", 1)]).await;
    let session = h.session(combat_id).await.unwrap();
    let mut reported = session.snapshot().unwrap().clone();
    reported.set_tile(PIOU, TilePos::new(7, 4));
    reported.set_hp(PIOU, 1);

    let first = h
        .send(
            1,
            ClientCommand::ReportState {
                combat_id,
                snapshot: reported.clone(),
            },
        )
        .await;
    assert!(first.is_applied());
    let second = h
        .send(
            1,
            ClientCommand::ReportState {
                combat_id,
                snapshot: reported,
            },
        )
        .await;
    assert_eq!(second.code(), Some("SESSION_SNAPSHOT_LOCKED"));

    let session = h.session(combat_id).await.unwrap();
    let snapshot = session.snapshot().unwrap();
    assert_eq!(snapshot.tile_of(PIOU), Some(TilePos::new(7, 4)));
    assert_eq!(snapshot.monster(CombatIndex(0)).unwrap().hp, 20);
    assert!(session.snapshot_locked);
    assert!(
        h.drain_events()
            .iter()
            .any(|e| matches!(e, CombatEvent::CombatState { resync: false, .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn reported_damage_quoting_a_resolved_cast_is_ignored() {
    let mut h = harness(
        config((0, 0), (2, 0), &[(0, 0)]),
        Some(CollisionMap::new(10, 6)),
    );
    let combat_id = h.started(1, TilePos::new(2, 2), &[("piou", 1)]).await;
    h.send(
        1,
        ClientCommand::CastSpell {
            combat_id,
            spell_id: "jab".into(),
            target: TilePos::new(4, 2),
        },
    )
    .await;
    h.drain();

    let duplicate = h
        .send(
            1,
            ClientCommand::ReportDamage {
                combat_id,
                source: PLAYER,
                target: PIOU,
                amount: 2,
                cast_id: Some(1),
            },
        )
        .await;
    assert_eq!(duplicate.code(), Some("SESSION_DUPLICATE_REPORT"));
    assert!(h.drain().is_empty());

    let untrusted = h
        .send(
            2,
            ClientCommand::ReportDamage {
                combat_id,
                source: PLAYER,
                target: PIOU,
                amount: 5,
                cast_id: None,
            },
        )
        .await;
    assert!(!untrusted.is_applied());

    let accepted = h
        .send(
            1,
            ClientCommand::ReportDamage {
                combat_id,
                source: PLAYER,
                target: PIOU,
                amount: 5,
                cast_id: None,
            },
        )
        .await;
    assert!(accepted.is_applied());
    let session = h.session(combat_id).await.unwrap();
    assert_eq!(session.snapshot().unwrap().monster(CombatIndex(0)).unwrap().hp, 13);
}
