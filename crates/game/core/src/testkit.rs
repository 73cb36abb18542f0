//! Shared fixtures for engine tests.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::CombatConfig;
use crate::engine::{CombatEngine, CombatStart, create_session};
use crate::env::{
    AreaPattern, BuffSide, CastPattern, ClassDef, CollisionMap, CombatEnv, FixedRng, MonsterDef,
    SpellDamage, SpellDef, SpellEffect, SpellRule, StatusTemplate,
};
use crate::event::CombatEvent;
use crate::state::{
    ClassId, CombatId, CombatSession, CombatStats, DamageSpan, Element, EntityId, GroupMember,
    MapId, MonsterGroup, MonsterId, PlayerId, PlayerProfile, SpellId, StatusKind, TilePos,
};

pub(crate) struct Fixture {
    pub spells: HashMap<SpellId, SpellDef>,
    pub monsters: HashMap<MonsterId, MonsterDef>,
    pub classes: HashMap<ClassId, ClassDef>,
    pub rng: FixedRng,
    pub config: CombatConfig,
}

fn spell(id: &str, pa_cost: u32, range: (u32, u32), damage: Option<u32>) -> SpellDef {
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

fn monster(id: &str, base_hp: u32, initiative: i32, capturable: bool) -> MonsterDef {
    MonsterDef {
        id: MonsterId::from(id),
        name: id.to_owned(),
        base_hp,
        hp_per_level: 5,
        initiative,
        pm: 3,
        spells: vec![SpellId::from("bite")],
        stats: CombatStats::default(),
        capturable,
        fallback_damage: Some(DamageSpan::new(3, 3)),
    }
}

fn status(id: &str, kind: StatusKind, turns: u32) -> StatusTemplate {
    StatusTemplate {
        id: id.to_owned(),
        kind,
        turns,
        amount: 0,
        damage: None,
        element: Element::Neutral,
    }
}

impl Fixture {
    pub fn new() -> Self {
        let spells = [
            spell("strike", 3, (1, 1), Some(10)),
            spell("bite", 0, (1, 1), Some(4)),
            SpellDef {
                max_casts_per_turn: Some(3),
                ..spell("jab", 1, (1, 4), Some(2))
            },
            SpellDef {
                element: Element::Fire,
                line_of_sight: true,
                ..spell("bolt", 2, (1, 6), Some(5))
            },
            SpellDef {
                pattern: CastPattern::Orthogonal,
                ..spell("lance", 1, (1, 5), Some(3))
            },
            SpellDef {
                element: Element::Fire,
                rule: Some(SpellRule::ChargeSurge),
                ..spell("surge", 2, (1, 6), Some(10))
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
            SpellDef {
                effects: vec![
                    SpellEffect::Damage,
                    SpellEffect::LifeSteal { basis: None },
                ],
                ..spell("leech", 2, (1, 1), Some(6))
            },
            SpellDef {
                effects: vec![
                    SpellEffect::PatternDamage {
                        area: AreaPattern::Cross { radius: 1 },
                    },
                    SpellEffect::LifeSteal { basis: None },
                ],
                ..spell("blast", 2, (1, 4), Some(2))
            },
            SpellDef {
                effects: vec![SpellEffect::AreaBuff {
                    radius: 2,
                    side: BuffSide::Allies,
                    statuses: vec![status("ward", StatusKind::Shield, 2)],
                    shield_percent_of_max_hp: Some(20),
                }],
                ..spell("ward", 2, (0, 0), None)
            },
            SpellDef {
                effects: vec![SpellEffect::PullCasterToMelee { distance: 4 }],
                ..spell("bond", 1, (1, 6), None)
            },
            SpellDef {
                effects: vec![SpellEffect::Status {
                    status: status("curse", StatusKind::Marker, 3),
                    on_caster: false,
                }],
                ..spell("curse", 1, (1, 6), None)
            },
        ];
        let spells = spells
            .into_iter()
            .map(|def| (def.id.clone(), def))
            .collect();

        let monsters = [
            monster("piou", 20, 5, true),
            monster("tofu", 30, 3, false),
        ]
        .into_iter()
        .map(|def| (def.id.clone(), def))
        .collect();

        let classes = [
            ClassDef {
                id: ClassId::from("warrior"),
                name: "Warrior".into(),
                elemental_charges: false,
            },
            ClassDef {
                id: ClassId::from("mage"),
                name: "Mage".into(),
                elemental_charges: true,
            },
        ]
        .into_iter()
        .map(|def| (def.id.clone(), def))
        .collect();

        Self {
            spells,
            monsters,
            classes,
            rng: FixedRng(0),
            config: CombatConfig::default(),
        }
    }

    pub fn env(&self) -> CombatEnv<'_> {
        CombatEnv::new(
            &self.spells,
            &self.monsters,
            &self.classes,
            &self.rng,
            &self.config,
        )
    }

    pub fn group(entity: u32, members: &[(&str, u32)]) -> MonsterGroup {
        MonsterGroup {
            entity_id: EntityId(entity),
            members: members
                .iter()
                .map(|(id, level)| GroupMember {
                    monster_id: MonsterId::from(*id),
                    level: *level,
                })
                .collect(),
        }
    }

    /// Level 5 warrior with 50 hp, 6 PA, 3 PM and every test spell.
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
                push_damage: 1,
                ..CombatStats::default()
            },
            spells: [
                "strike", "jab", "bolt", "lance", "shove", "snare", "call", "leech", "blast",
                "ward", "bond", "curse",
            ]
            .into_iter()
            .map(SpellId::from)
            .collect(),
            captured: None,
        }
    }

    pub fn mage(id: u32) -> PlayerProfile {
        PlayerProfile {
            class_id: ClassId::from("mage"),
            spells: vec![SpellId::from("bolt"), SpellId::from("surge")],
            ..Self::profile(id)
        }
    }

    pub fn map() -> Arc<CollisionMap> {
        Arc::new(CollisionMap::new(12, 8))
    }

    /// Prep-phase session on a 12x8 map at origin (2, 2), opened by player 1.
    pub fn session(&self, monsters: &[(&str, u32)], out: &mut Vec<CombatEvent>) -> CombatSession {
        self.session_as(Self::profile(1), monsters, out)
    }

    pub fn session_as(
        &self,
        initiator: PlayerProfile,
        monsters: &[(&str, u32)],
        out: &mut Vec<CombatEvent>,
    ) -> CombatSession {
        let start = CombatStart {
            id: CombatId(1),
            map_id: MapId::from("arena"),
            origin: TilePos::new(2, 2),
            seed: 7,
            collision: Some(Self::map()),
            initiator,
            groups: vec![Self::group(100, monsters)],
        };
        create_session(start, &self.env(), out).expect("fixture session")
    }

    /// Session in combat with player 1 active.
    pub fn started(&self, monsters: &[(&str, u32)], out: &mut Vec<CombatEvent>) -> CombatSession {
        self.started_as(Self::profile(1), monsters, out)
    }

    pub fn started_as(
        &self,
        initiator: PlayerProfile,
        monsters: &[(&str, u32)],
        out: &mut Vec<CombatEvent>,
    ) -> CombatSession {
        let player_id = initiator.player_id;
        let mut session = self.session_as(initiator, monsters, out);
        CombatEngine::new(&mut session, self.env())
            .set_ready(player_id, out)
            .expect("fixture ready");
        session
    }
}
