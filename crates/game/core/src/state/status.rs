//! Status effects carried by snapshot entries.
//!
//! Effects are keyed by a string id: applying an effect whose id is already
//! present replaces it. Durations count the bearer's own turns; they are
//! decremented when the bearer starts a turn.

use crate::state::Element;

/// Inclusive damage interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageSpan {
    pub min: u32,
    pub max: u32,
}

impl DamageSpan {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Kinds of status effects understood by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum StatusKind {
    /// Absorbs damage amount-for-amount before hp is touched.
    Shield,
    /// Adds `amount` to the elemental characteristic used by damage rolls.
    Puissance,
    /// Visible marker of an armed capture.
    Capture,
    /// Rolls `damage` at the start of each of the bearer's turns.
    DamageOverTime,
    /// Cosmetic or scripted marker with no engine semantics.
    Marker,
}

/// A single active status effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub id: String,
    pub kind: StatusKind,
    pub turns_left: u32,
    /// Shield capacity or puissance bonus, depending on `kind`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub amount: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: Option<DamageSpan>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub element: Element,
    /// Label of whatever applied the effect (usually a spell id).
    #[cfg_attr(feature = "serde", serde(default))]
    pub source: String,
}

impl StatusEffect {
    pub fn new(id: impl Into<String>, kind: StatusKind, turns_left: u32) -> Self {
        Self {
            id: id.into(),
            kind,
            turns_left,
            amount: 0,
            damage: None,
            element: Element::Neutral,
            source: String::new(),
        }
    }

    pub fn shield(id: impl Into<String>, amount: u32, turns_left: u32) -> Self {
        Self {
            amount,
            ..Self::new(id, StatusKind::Shield, turns_left)
        }
    }

    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_damage(mut self, damage: DamageSpan, element: Element) -> Self {
        self.damage = Some(damage);
        self.element = element;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    fn is_spent(&self) -> bool {
        self.turns_left == 0 || (self.kind == StatusKind::Shield && self.amount == 0)
    }
}

/// Result of running incoming damage through the bearer's shields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Absorption {
    pub absorbed: u32,
    pub remaining: u32,
}

/// Ordered set of status effects on one unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&StatusEffect> {
        self.effects.iter().find(|effect| effect.id == id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Inserts the effect, replacing any existing effect with the same id in place.
    pub fn upsert(&mut self, effect: StatusEffect) {
        match self.effects.iter_mut().find(|e| e.id == effect.id) {
            Some(existing) => *existing = effect,
            None => self.effects.push(effect),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<StatusEffect> {
        let position = self.effects.iter().position(|effect| effect.id == id)?;
        Some(self.effects.remove(position))
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Sum of active puissance bonuses.
    pub fn puissance(&self) -> i32 {
        self.effects
            .iter()
            .filter(|effect| effect.kind == StatusKind::Puissance)
            .map(|effect| effect.amount as i32)
            .sum()
    }

    /// Consumes shields in application order. Spent shields are dropped.
    pub fn absorb(&mut self, incoming: u32) -> Absorption {
        let mut remaining = incoming;
        let mut absorbed = 0;

        for shield in self
            .effects
            .iter_mut()
            .filter(|effect| effect.kind == StatusKind::Shield && effect.turns_left > 0)
        {
            if remaining == 0 {
                break;
            }
            let taken = shield.amount.min(remaining);
            shield.amount -= taken;
            remaining -= taken;
            absorbed += taken;
            if shield.amount == 0 {
                shield.turns_left = 0;
            }
        }

        self.effects.retain(|effect| !effect.is_spent());
        Absorption {
            absorbed,
            remaining,
        }
    }

    /// Damage-over-time effects due at the start of the bearer's turn.
    pub fn due_damage(&self) -> Vec<StatusEffect> {
        self.effects
            .iter()
            .filter(|effect| effect.kind == StatusKind::DamageOverTime && effect.damage.is_some())
            .cloned()
            .collect()
    }

    /// Decrements every duration and returns the ids of effects that expired.
    ///
    /// Capture markers are driven by the capture countdown and are skipped here.
    pub fn decrement(&mut self) -> Vec<String> {
        for effect in self
            .effects
            .iter_mut()
            .filter(|effect| effect.kind != StatusKind::Capture)
        {
            effect.turns_left = effect.turns_left.saturating_sub(1);
        }

        let mut expired = Vec::new();
        self.effects.retain(|effect| {
            if effect.is_spent() {
                expired.push(effect.id.clone());
                false
            } else {
                true
            }
        });
        expired
    }
}
