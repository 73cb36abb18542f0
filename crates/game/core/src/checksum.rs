//! State checksum used for desync detection.
//!
//! The hash is FNV-1a (32-bit) over a pipe-joined token stream:
//!
//! ```text
//! turn|round|activePlayer|activeMonster|actorIndex|<players>|M|<monsters>|S|<summons>
//! ```
//!
//! where every entity contributes one `id,x,y,hp,hpMax` token and each group
//! is sorted by numeric id. Absent active ids are written as `-`. Storage
//! order never affects the result.

use crate::state::{CombatSession, Snapshot, TurnKind};

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Turn-level fields mixed into the checksum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TurnMarker {
    pub turn: TurnKind,
    pub round: u32,
    pub active_player: Option<u32>,
    pub active_monster: Option<u32>,
    pub actor_index: usize,
}

impl TurnMarker {
    pub fn of(session: &CombatSession) -> Self {
        Self {
            turn: session.turn,
            round: session.round,
            active_player: session.active_player_id().map(|id| id.0),
            active_monster: session.active_monster().map(|index| index.0),
            actor_index: session.actor_index,
        }
    }
}

fn opt(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| v.to_string())
}

fn entity(id: u32, x: i32, y: i32, hp: u32, hp_max: u32) -> String {
    format!("{id},{x},{y},{hp},{hp_max}")
}

/// Canonical token stream for a snapshot at a given turn position.
pub fn tokens(marker: &TurnMarker, snapshot: &Snapshot) -> Vec<String> {
    let turn: &'static str = marker.turn.into();
    let mut tokens = vec![
        turn.to_owned(),
        marker.round.to_string(),
        opt(marker.active_player),
        opt(marker.active_monster),
        marker.actor_index.to_string(),
    ];

    let mut players: Vec<_> = snapshot.players().iter().collect();
    players.sort_by_key(|p| p.player_id);
    tokens.extend(
        players
            .iter()
            .map(|p| entity(p.player_id.0, p.tile.x, p.tile.y, p.hp, p.hp_max)),
    );

    tokens.push("M".to_owned());
    let mut monsters: Vec<_> = snapshot.monsters().iter().collect();
    monsters.sort_by_key(|m| m.combat_index);
    tokens.extend(
        monsters
            .iter()
            .map(|m| entity(m.combat_index.0, m.tile.x, m.tile.y, m.hp, m.hp_max)),
    );

    tokens.push("S".to_owned());
    let mut summons: Vec<_> = snapshot.summons().iter().collect();
    summons.sort_by_key(|s| s.summon_id);
    tokens.extend(
        summons
            .iter()
            .map(|s| entity(s.summon_id.0, s.tile.x, s.tile.y, s.hp, s.hp_max)),
    );

    tokens
}

pub fn checksum(marker: &TurnMarker, snapshot: &Snapshot) -> u32 {
    fnv1a(tokens(marker, snapshot).join("|").as_bytes())
}

/// Checksum of a session's current state. An unmaterialized snapshot hashes as empty.
pub fn session_checksum(session: &CombatSession) -> u32 {
    let marker = TurnMarker::of(session);
    match session.snapshot() {
        Some(snapshot) => checksum(&marker, snapshot),
        None => checksum(&marker, &Snapshot::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        CombatIndex, EntityId, MonsterEntry, MonsterId, PlayerEntry, PlayerId, StatusEffects,
        TilePos,
    };

    fn player(id: u32, x: i32, hp: u32) -> PlayerEntry {
        PlayerEntry {
            player_id: PlayerId(id),
            tile: TilePos::new(x, 0),
            hp,
            hp_max: 50,
            status_effects: StatusEffects::new(),
        }
    }

    fn monster(index: u32, x: i32) -> MonsterEntry {
        MonsterEntry {
            combat_index: CombatIndex(index),
            entity_id: EntityId(100),
            monster_id: MonsterId::from("piou"),
            tile: TilePos::new(x, 3),
            hp: 20,
            hp_max: 20,
            status_effects: StatusEffects::new(),
        }
    }

    #[test]
    fn fnv1a_matches_reference_vectors() {
        assert_eq!(fnv1a(b""), 0x811c_9dc5);
        assert_eq!(fnv1a(b"a"), 0xe40c_292c);
    }

    #[test]
    fn token_stream_is_canonical() {
        let mut snapshot = Snapshot::new();
        snapshot.upsert_player(player(2, 1, 50));
        snapshot.upsert_monster(monster(0, 5));
        let marker = TurnMarker {
            round: 3,
            active_player: Some(2),
            ..TurnMarker::default()
        };

        assert_eq!(
            tokens(&marker, &snapshot).join("|"),
            "player|3|2|-|0|2,1,0,50,50|M|0,5,3,20,20|S"
        );
    }

    #[test]
    fn insertion_order_does_not_change_checksum() {
        let marker = TurnMarker::default();
        let mut a = Snapshot::new();
        a.upsert_player(player(1, 0, 50));
        a.upsert_player(player(2, 1, 40));
        a.upsert_monster(monster(0, 5));
        a.upsert_monster(monster(1, 6));

        let mut b = Snapshot::new();
        b.upsert_monster(monster(1, 6));
        b.upsert_player(player(2, 1, 40));
        b.upsert_monster(monster(0, 5));
        b.upsert_player(player(1, 0, 50));

        assert_eq!(checksum(&marker, &a), checksum(&marker, &b));
    }

    #[test]
    fn any_field_change_changes_checksum() {
        let marker = TurnMarker::default();
        let mut base = Snapshot::new();
        base.upsert_player(player(1, 0, 50));
        base.upsert_monster(monster(0, 5));
        let reference = checksum(&marker, &base);

        let mut hurt = base.clone();
        hurt.upsert_player(player(1, 0, 49));
        assert_ne!(checksum(&marker, &hurt), reference);

        let mut moved = base.clone();
        moved.upsert_monster(monster(0, 4));
        assert_ne!(checksum(&marker, &moved), reference);

        let later = TurnMarker {
            round: 2,
            ..marker
        };
        assert_ne!(checksum(&later, &base), reference);

        let other_turn = TurnMarker {
            active_monster: Some(0),
            ..marker
        };
        assert_ne!(checksum(&other_turn, &base), reference);
    }
}
