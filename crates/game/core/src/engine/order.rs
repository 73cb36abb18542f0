//! Actor order construction.
//!
//! Without history, players and monsters are sorted independently by
//! [`Actor::priority_cmp`] and interleaved side by side, starting with the
//! side whose best actor wins the comparison. With history, the previous order
//! is kept and repaired: dead actors drop out, new actors are appended in
//! priority order. In both cases a player's summons follow it immediately and
//! summons whose owner is not in the order go last.

use std::collections::BTreeMap;

use crate::state::{Actor, ActorKind, PlayerId, UnitRef};

fn sorted(mut actors: Vec<Actor>) -> Vec<Actor> {
    actors.sort_by(Actor::priority_cmp);
    actors
}

/// Splits summons off and groups them by owner, each group in priority order.
fn split_summons(actors: &[Actor]) -> (Vec<Actor>, BTreeMap<PlayerId, Vec<Actor>>) {
    let mut others = Vec::new();
    let mut summons: BTreeMap<PlayerId, Vec<Actor>> = BTreeMap::new();
    for actor in actors {
        match actor.owner() {
            Some(owner) => summons.entry(owner).or_default().push(*actor),
            None => others.push(*actor),
        }
    }
    for group in summons.values_mut() {
        group.sort_by(Actor::priority_cmp);
    }
    (others, summons)
}

/// Inserts every summon right after its owner; orphans go last.
fn attach_summons(order: Vec<Actor>, mut summons: BTreeMap<PlayerId, Vec<Actor>>) -> Vec<Actor> {
    let mut result = Vec::with_capacity(order.len());
    for actor in order {
        result.push(actor);
        if let ActorKind::Player { player_id } = actor.kind
            && let Some(group) = summons.remove(&player_id)
        {
            result.extend(group);
        }
    }
    let orphans: Vec<Actor> = summons.into_values().flatten().collect();
    result.extend(sorted(orphans));
    result
}

/// Fresh order from living actors.
pub fn build_actor_order(actors: &[Actor]) -> Vec<Actor> {
    let (others, summons) = split_summons(actors);
    let (players, monsters): (Vec<Actor>, Vec<Actor>) = others
        .into_iter()
        .partition(|actor| matches!(actor.kind, ActorKind::Player { .. }));
    let mut players = sorted(players).into_iter().peekable();
    let mut monsters = sorted(monsters).into_iter().peekable();

    let mut players_next = match (players.peek(), monsters.peek()) {
        (Some(player), Some(monster)) => player.priority_cmp(monster).is_le(),
        (Some(_), None) => true,
        _ => false,
    };

    let mut order = Vec::with_capacity(actors.len());
    loop {
        let next = if players_next {
            players.next().or_else(|| monsters.next())
        } else {
            monsters.next().or_else(|| players.next())
        };
        let Some(actor) = next else { break };
        order.push(actor);
        players_next = !players_next;
    }

    attach_summons(order, summons)
}

/// Keeps the relative sequence of `previous` for actors still in `actors`,
/// appending newcomers in priority order.
pub fn repair_actor_order(previous: &[Actor], actors: &[Actor]) -> Vec<Actor> {
    if previous.is_empty() {
        return build_actor_order(actors);
    }

    let (others, summons) = split_summons(actors);
    let by_unit: BTreeMap<UnitRef, Actor> = others.iter().map(|a| (a.unit(), *a)).collect();

    let mut order: Vec<Actor> = previous
        .iter()
        .filter(|actor| actor.owner().is_none())
        .filter_map(|actor| by_unit.get(&actor.unit()).copied())
        .collect();

    let newcomers: Vec<Actor> = others
        .iter()
        .filter(|actor| !order.iter().any(|kept| kept.unit() == actor.unit()))
        .copied()
        .collect();
    order.extend(sorted(newcomers));

    attach_summons(order, summons)
}
