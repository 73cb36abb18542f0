use std::fmt;

/// Identifier of a connected player (also the participant key of a combat).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct PlayerId(pub u32);

/// World entity that carried a monster group into the fight.
///
/// Every member expanded from the same group shares the leader's entity id;
/// [`CombatIndex`] is what tells the instances apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct EntityId(pub u32);

/// Position of a monster instance inside the combat roster. Unique per combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct CombatIndex(pub u32);

/// Identifier of a player-owned summon, allocated by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct SummonId(pub u32);

/// Identifier of a combat session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct CombatId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

impl fmt::Display for CombatIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "monster#{}", self.0)
    }
}

impl fmt::Display for SummonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "summon#{}", self.0)
    }
}

impl fmt::Display for CombatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "combat#{}", self.0)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Key into the spell catalog.
    SpellId
);
string_id!(
    /// Key into the monster catalog.
    MonsterId
);
string_id!(
    /// Key into the class catalog.
    ClassId
);
string_id!(
    /// Level identifier used to look up the collision map.
    MapId
);

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: TilePos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Right, left, down, up. Callers relying on tie-breaks depend on this order.
    pub fn neighbors4(self) -> [TilePos; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }

    pub fn is_adjacent(self, other: TilePos) -> bool {
        self.manhattan(other) == 1
    }

    /// True when both tiles share a row or a column.
    pub fn is_aligned(self, other: TilePos) -> bool {
        self.x == other.x || self.y == other.y
    }

    /// Unit step from `self` towards `other` along the dominant axis.
    ///
    /// Exact diagonals keep both components. Returns `(0, 0)` for the same tile.
    pub fn direction_to(self, other: TilePos) -> (i32, i32) {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        match dx.abs().cmp(&dy.abs()) {
            std::cmp::Ordering::Greater => (dx.signum(), 0),
            std::cmp::Ordering::Less => (0, dy.signum()),
            std::cmp::Ordering::Equal => (dx.signum(), dy.signum()),
        }
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Damage element. Each element scales with one characteristic.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, strum::Display, strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Element {
    #[default]
    Neutral,
    Earth,
    Fire,
    Water,
    Air,
}

/// One value per element (resistances, flat elemental damage bonuses).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ElementValues {
    pub neutral: i32,
    pub earth: i32,
    pub fire: i32,
    pub water: i32,
    pub air: i32,
}

impl ElementValues {
    pub fn get(&self, element: Element) -> i32 {
        match element {
            Element::Neutral => self.neutral,
            Element::Earth => self.earth,
            Element::Fire => self.fire,
            Element::Water => self.water,
            Element::Air => self.air,
        }
    }
}

/// Which team a unit fights for. Players and their summons share a side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Players,
    Monsters,
}

impl Side {
    pub fn opposing(self) -> Self {
        match self {
            Side::Players => Side::Monsters,
            Side::Monsters => Side::Players,
        }
    }
}

/// Reference to any unit on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", content = "id", rename_all = "snake_case")
)]
pub enum UnitRef {
    Player(PlayerId),
    Monster(CombatIndex),
    Summon(SummonId),
}

impl UnitRef {
    pub fn side(self) -> Side {
        match self {
            UnitRef::Player(_) | UnitRef::Summon(_) => Side::Players,
            UnitRef::Monster(_) => Side::Monsters,
        }
    }

    pub fn is_hostile_to(self, other: UnitRef) -> bool {
        self.side() != other.side()
    }

    pub fn as_player(self) -> Option<PlayerId> {
        match self {
            UnitRef::Player(id) => Some(id),
            _ => None,
        }
    }

    /// Stable numeric key used for seeding rolls and canonical ordering.
    pub fn numeric_id(self) -> u32 {
        match self {
            UnitRef::Player(id) => id.0,
            UnitRef::Monster(index) => index.0,
            UnitRef::Summon(id) => id.0,
        }
    }
}

impl fmt::Display for UnitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitRef::Player(id) => id.fmt(f),
            UnitRef::Monster(index) => index.fmt(f),
            UnitRef::Summon(id) => id.fmt(f),
        }
    }
}
