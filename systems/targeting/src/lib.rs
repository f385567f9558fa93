#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that rebuilds the enemy registry from the world's actor view.

use arena_ai_core::{ActorSnapshot, ActorView};
use arena_ai_hints::{Enemy, HintAggregator};
use tracing::debug;

/// Registers every attackable actor as a potential target once per tick.
#[derive(Debug, Default)]
pub struct Targeting;

impl Targeting {
    /// Creates a new targeting system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Registers the tick's potential targets.
    ///
    /// Actors engaged with the party start at priority zero and should be
    /// tanked; bystanders start as [`Enemy::PRIORITY_UNDESIRABLE`] so area
    /// attacks keep away from them. Dead, untargetable and friendly actors are
    /// ignored. Must run after the snapshot was cleared and before producers
    /// adjust priorities.
    pub fn handle(&mut self, actors: &ActorView, hints: &mut HintAggregator) {
        let mut registered = 0usize;
        for actor in actors.iter().filter(|actor| is_attackable(actor)) {
            let priority = if actor.in_combat {
                0
            } else {
                Enemy::PRIORITY_UNDESIRABLE
            };
            if hints.add_enemy(*actor, priority, actor.in_combat).is_some() {
                registered += 1;
            }
        }
        debug!(actors = actors.len(), registered, "rebuilt enemy registry");
    }
}

fn is_attackable(actor: &ActorSnapshot) -> bool {
    actor.targetable && actor.hostile && !actor.dead
}
