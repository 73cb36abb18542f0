#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::TryRecvError};

use combat_content::{CollisionCache, ContentCatalog};
use combat_core::{
    CastPattern, ClassDef, ClassId, CollisionMap, CombatConfig, CombatEvent, CombatId,
    CombatSession, CombatStats, DamageSpan, Element, EntityId, GroupMember, MapId, MonsterDef,
    MonsterGroup, MonsterId, PlayerId, PlayerProfile, SpellDamage, SpellDef, SpellEffect,
    SpellId, TilePos,
};
use combat_runtime::{
    ClientCommand, ClientMessage, CommandOutcome, Envelope, InMemoryProfileStore, NoMaps,
    OracleManager, ProfileStore, Runtime, RuntimeConfig, RuntimeHandle,
};

pub const ARENA: &str = "arena";

pub fn spell(id: &str, pa_cost: u32, range: (u32, u32), damage: Option<u32>) -> SpellDef {
    SpellDef {
        id: SpellId::from(id),
        name: id.to_owned(),
        pa_cost,
        range_min: range.0,
        range_max: range.1,
        pattern: CastPattern::Free,
        line_of_sight: false,
        cooldown: 0,
        max_casts_per_turn: None,
        max_casts_per_target: None,
        element: Element::Neutral,
        damage: damage.map(|d| SpellDamage {
            min: d,
            max: d,
            crit_min: d,
            crit_max: d,
            crit_chance: 0,
        }),
        effects: if damage.is_some() {
            vec![SpellEffect::Damage]
        } else {
            Vec::new()
        },
        rule: None,
    }
}

fn monster(id: &str, base_hp: u32, initiative: i32) -> MonsterDef {
    MonsterDef {
        id: MonsterId::from(id),
        name: id.to_owned(),
        base_hp,
        hp_per_level: 5,
        initiative,
        pm: 3,
        spells: vec![SpellId::from("bite")],
        stats: CombatStats::default(),
        capturable: true,
        fallback_damage: Some(DamageSpan::new(3, 3)),
    }
}

pub fn catalog() -> ContentCatalog {
    let spells = [
        spell("strike", 3, (1, 1), Some(10)),
        spell("bite", 0, (1, 1), Some(4)),
        SpellDef {
            max_casts_per_turn: Some(3),
            ..spell("jab", 1, (1, 4), Some(2))
        },
        SpellDef {
            pattern: CastPattern::Orthogonal,
            effects: vec![SpellEffect::Push { distance: 2 }],
            ..spell("shove", 2, (1, 1), None)
        },
        SpellDef {
            effects: vec![SpellEffect::Capture { turns: 2 }],
            ..spell("snare", 2, (1, 3), None)
        },
        SpellDef {
            effects: vec![SpellEffect::SummonCaptured],
            ..spell("call", 2, (0, 3), None)
        },
    ];
    let monsters = [monster("piou", 20, 5), monster("tofu", 30, 3)];
    let classes = [ClassDef {
        id: ClassId::from("warrior"),
        name: "Warrior".into(),
        elemental_charges: false,
    }];
    ContentCatalog::from_parts(spells, monsters, classes)
}

/// Level 5 warrior with 50 hp, 6 PA, 3 PM and initiative 10.
pub fn profile(id: u32) -> PlayerProfile {
    PlayerProfile {
        player_id: PlayerId(id),
        name: format!("player-{id}"),
        class_id: ClassId::from("warrior"),
        level: 5,
        hp: 50,
        hp_max: 50,
        pa: 6,
        pm: 3,
        stats: CombatStats {
            initiative: 10,
            ..CombatStats::default()
        },
        spells: ["strike", "jab", "shove", "snare", "call"]
            .into_iter()
            .map(SpellId::from)
            .collect(),
        captured: None,
    }
}

pub fn group(members: &[(&str, u32)]) -> Vec<MonsterGroup> {
    vec![MonsterGroup {
        entity_id: EntityId(100),
        members: members
            .iter()
            .map(|(id, level)| GroupMember {
                monster_id: MonsterId::from(*id),
                level: *level,
            })
            .collect(),
    }]
}

/// Rule config with a single player slot and monsters lined up from `anchor`.
pub fn config(player: (i32, i32), anchor: (i32, i32), monsters: &[(i32, i32)]) -> RuntimeConfig {
    let mut combat = CombatConfig::default();
    combat.placement.player_offsets = vec![player];
    combat.placement.monster_anchor = anchor;
    combat.placement.monster_offsets = monsters.to_vec();
    RuntimeConfig {
        combat,
        rng_seed: Some(7),
        ..RuntimeConfig::default()
    }
}

pub struct Harness {
    pub runtime: Runtime,
    pub handle: RuntimeHandle,
    pub profiles: Arc<InMemoryProfileStore>,
    pub events: broadcast::Receiver<Envelope>,
}

/// Runtime over the test catalog, players 1 to 3 and an optional arena map.
pub fn harness(config: RuntimeConfig, map: Option<CollisionMap>) -> Harness {
    let catalog = Arc::new(catalog());
    let oracles = match map {
        Some(map) => OracleManager::from_catalog(
            catalog,
            Arc::new(CollisionCache::new(std::env::temp_dir()).with_map(ARENA, map)),
            CombatConfig::default(),
        ),
        None => OracleManager::from_catalog(catalog, Arc::new(NoMaps), CombatConfig::default()),
    };
    let profiles = Arc::new(InMemoryProfileStore::with_profiles((1..=3).map(profile)));
    let runtime = Runtime::builder()
        .config(config)
        .oracles(oracles)
        .profile_store(profiles.clone())
        .build()
        .expect("runtime builds");
    let handle = runtime.handle();
    let events = handle.subscribe_all();
    Harness {
        runtime,
        handle,
        profiles,
        events,
    }
}

impl Harness {
    pub async fn send(&self, player: u32, command: ClientCommand) -> CommandOutcome {
        self.handle
            .submit(ClientMessage::new(PlayerId(player), command))
            .await
            .expect("worker alive")
    }

    /// Player `player` opens a combat on the arena at `origin`.
    pub async fn start(&self, player: u32, origin: TilePos, monsters: &[(&str, u32)]) -> CombatId {
        let outcome = self
            .send(
                player,
                ClientCommand::StartCombat {
                    map_id: MapId::from(ARENA),
                    origin,
                    groups: group(monsters),
                    seed: None,
                },
            )
            .await;
        outcome.combat_id().expect("combat created")
    }

    /// Opens a combat and readies its initiator, leaving player `player` to act.
    pub async fn started(&self, player: u32, origin: TilePos, monsters: &[(&str, u32)]) -> CombatId {
        let combat_id = self.start(player, origin, monsters).await;
        let ready = self.send(player, ClientCommand::Ready { combat_id }).await;
        assert!(ready.is_applied(), "{ready:?}");
        combat_id
    }

    pub fn profile(&self, player: u32) -> PlayerProfile {
        self.profiles
            .get(PlayerId(player))
            .expect("store readable")
            .expect("profile exists")
    }

    /// Drops every handle and waits for the worker to stop.
    pub async fn shutdown(self) {
        let Harness {
            runtime,
            handle,
            events,
            ..
        } = self;
        drop(events);
        drop(handle);
        runtime.shutdown().await.expect("worker joins");
    }

    pub async fn session(&self, combat_id: CombatId) -> Option<CombatSession> {
        self.handle.session(combat_id).await.expect("worker alive")
    }

    /// Every envelope published so far.
    pub fn drain(&mut self) -> Vec<Envelope> {
        let mut envelopes = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(envelope) => envelopes.push(envelope),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return envelopes,
            }
        }
    }

    /// Drains the events only.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.drain().into_iter().map(|e| e.event).collect()
    }
}

pub async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
