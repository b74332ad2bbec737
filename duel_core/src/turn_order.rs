//! TurnOrderResolver - who acts first each round

use crate::actor::ActorRuntime;
use balance_core::Side;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Acting order for one round, one entry per living actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOrder {
    pub order: Vec<Side>,
}

/// Order two actors by descending speed, `fallback_first` winning exact ties
pub fn determine_round_order(
    a: &ActorRuntime,
    b: &ActorRuntime,
    fallback_first: Side,
) -> RoundOrder {
    let mut living: Vec<&ActorRuntime> = [a, b].into_iter().filter(|x| x.is_alive()).collect();

    living.sort_by(|x, y| {
        y.stats
            .speed
            .partial_cmp(&x.stats.speed)
            .unwrap_or(Ordering::Equal)
            .then_with(|| tie_rank(x.side, fallback_first).cmp(&tie_rank(y.side, fallback_first)))
    });

    RoundOrder {
        order: living.into_iter().map(|actor| actor.side).collect(),
    }
}

fn tie_rank(side: Side, fallback_first: Side) -> u8 {
    if side == fallback_first {
        0
    } else {
        1
    }
}
