use crate::state::TilePos;

/// Which amount a life-steal effect heals for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum LifeStealBasis {
    /// Damage rolled before resistance and shields.
    Raw,
    /// Hit points actually removed from the target.
    #[default]
    Dealt,
}

/// Tile offsets used to place units when combat starts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PlacementConfig {
    /// Player slots, relative to the combat origin. Slot `i` goes to the
    /// `i`-th participant in join order.
    pub player_offsets: Vec<(i32, i32)>,
    /// Anchor of the monster formation, relative to the combat origin.
    pub monster_anchor: (i32, i32),
    /// Monster slots, relative to the monster anchor.
    pub monster_offsets: Vec<(i32, i32)>,
}

impl PlacementConfig {
    const DEFAULT_OFFSETS: [(i32, i32); 8] = [
        (0, 0),
        (0, 1),
        (1, 0),
        (-1, 0),
        (0, -1),
        (1, 1),
        (-1, 1),
        (1, -1),
    ];

    pub fn player_slot(&self, origin: TilePos, index: usize) -> Option<TilePos> {
        self.player_offsets
            .get(index)
            .map(|&(dx, dy)| origin.offset(dx, dy))
    }

    pub fn monster_slot(&self, origin: TilePos, index: usize) -> Option<TilePos> {
        let anchor = origin.offset(self.monster_anchor.0, self.monster_anchor.1);
        self.monster_offsets
            .get(index)
            .map(|&(dx, dy)| anchor.offset(dx, dy))
    }

    /// Whether `tile` is one of the player slots around `origin`.
    pub fn is_player_slot(&self, origin: TilePos, tile: TilePos) -> bool {
        self.player_offsets
            .iter()
            .any(|&(dx, dy)| origin.offset(dx, dy) == tile)
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            player_offsets: Self::DEFAULT_OFFSETS.to_vec(),
            monster_anchor: (5, 0),
            monster_offsets: Self::DEFAULT_OFFSETS.to_vec(),
        }
    }
}

/// Combat rule constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CombatConfig {
    /// Blunt damage per tile of push distance that could not be travelled.
    pub wall_damage_per_tile: u32,
    /// Duration of one movement step, used to schedule AI continuations.
    pub step_duration_ms: u64,
    pub max_elemental_charges: u32,
    /// Damage bonus per accumulated charge, in percent.
    pub charge_bonus_percent: u32,
    /// Damage bonus per elemental stat point, in percent.
    pub stat_bonus_percent: i32,
    pub life_steal_basis: LifeStealBasis,
    /// Movement points for monsters whose definition has none.
    pub default_monster_pm: u32,
    pub placement: PlacementConfig,
}

impl CombatConfig {
    pub const DEFAULT_WALL_DAMAGE_PER_TILE: u32 = 9;
    pub const DEFAULT_STEP_DURATION_MS: u64 = 300;
    pub const DEFAULT_MAX_ELEMENTAL_CHARGES: u32 = 5;
    pub const DEFAULT_CHARGE_BONUS_PERCENT: u32 = 10;
    pub const DEFAULT_STAT_BONUS_PERCENT: i32 = 2;
    pub const DEFAULT_MONSTER_PM: u32 = 3;

    pub fn new() -> Self {
        Self {
            wall_damage_per_tile: Self::DEFAULT_WALL_DAMAGE_PER_TILE,
            step_duration_ms: Self::DEFAULT_STEP_DURATION_MS,
            max_elemental_charges: Self::DEFAULT_MAX_ELEMENTAL_CHARGES,
            charge_bonus_percent: Self::DEFAULT_CHARGE_BONUS_PERCENT,
            stat_bonus_percent: Self::DEFAULT_STAT_BONUS_PERCENT,
            life_steal_basis: LifeStealBasis::default(),
            default_monster_pm: Self::DEFAULT_MONSTER_PM,
            placement: PlacementConfig::default(),
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
