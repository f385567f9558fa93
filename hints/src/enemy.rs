use arena_ai_core::{ActorSnapshot, Angle};
use glam::Vec2;

/// Per-tick record of a potential target and the tank-positioning hints attached to it.
///
/// Holds a value copy of the actor taken when the registry was rebuilt; it is
/// never shared with the world and never survives the next clear.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    /// Actor state captured when the enemy was registered.
    pub actor: ActorSnapshot,
    /// Attack priority; values at or below [`Enemy::PRIORITY_POINTLESS`] are sentinels.
    pub priority: i32,
    /// Fraction of the target's health predicted to be removed by the party each tick.
    pub attack_strength: f32,
    /// Position the tank should drag the enemy to.
    pub desired_position: Vec2,
    /// Facing the tank should turn the enemy to.
    pub desired_rotation: Angle,
    /// Hitbox gap beyond which the tank starts repositioning the enemy.
    pub tank_distance: f32,
    /// Whether a tank should hold this enemy.
    pub should_be_tanked: bool,
    /// Whether a tank should provoke this enemy when it is not targeting them.
    pub prefer_provoking: bool,
    /// Whether damage-over-time effects on this enemy are forbidden.
    pub forbid_dots: bool,
    /// Whether interruptible casts from this enemy should be interrupted.
    pub should_be_interrupted: bool,
    /// Whether this enemy should be stunned when possible.
    pub should_be_stunned: bool,
    /// Whether ranged attackers should keep to maximum range.
    pub stay_at_long_range: bool,
}

impl Enemy {
    /// Attacking changes nothing of value but still feeds resources and combos.
    pub const PRIORITY_POINTLESS: i32 = -1;
    /// Attacking has no effect; area attacks that also clip it are fine.
    pub const PRIORITY_INVINCIBLE: i32 = -2;
    /// May be attacked when targeted by hand but must be kept out of area attacks.
    pub const PRIORITY_UNDESIRABLE: i32 = -3;
    /// Must never be attacked.
    pub const PRIORITY_FORBIDDEN: i32 = -4;

    /// Default predicted health fraction removed per tick.
    pub const DEFAULT_ATTACK_STRENGTH: f32 = 0.05;
    /// Default hitbox gap tolerated before the tank repositions the enemy.
    pub const DEFAULT_TANK_DISTANCE: f32 = 2.0;

    /// Creates a record whose positioning hints start at the actor's current state.
    #[must_use]
    pub fn new(actor: ActorSnapshot, priority: i32, should_be_tanked: bool) -> Self {
        Self {
            actor,
            priority,
            attack_strength: Self::DEFAULT_ATTACK_STRENGTH,
            desired_position: actor.position,
            desired_rotation: actor.rotation,
            tank_distance: Self::DEFAULT_TANK_DISTANCE,
            should_be_tanked,
            prefer_provoking: false,
            forbid_dots: false,
            should_be_interrupted: false,
            should_be_stunned: false,
            stay_at_long_range: false,
        }
    }

    /// Raises the priority to at least `priority`; never lowers it.
    pub fn raise_priority(&mut self, priority: i32) {
        self.priority = self.priority.max(priority);
    }

    /// Reports whether the enemy must be kept out of area attacks.
    #[must_use]
    pub const fn is_forbidden_for_aoe(&self) -> bool {
        self.priority <= Self::PRIORITY_UNDESIRABLE
    }
}

#[cfg(test)]
mod tests {
    use super::Enemy;
    use arena_ai_core::{ActorId, ActorSnapshot, Angle};
    use glam::Vec2;

    #[test]
    fn hints_start_at_actor_state() {
        let actor = ActorSnapshot::hostile(ActorId::new(1), 7, Vec2::new(3.0, 4.0), 1.5)
            .with_rotation(Angle::from_degrees(90.0));
        let enemy = Enemy::new(actor, 0, true);
        assert_eq!(enemy.desired_position, actor.position);
        assert_eq!(enemy.desired_rotation, actor.rotation);
        assert_eq!(enemy.tank_distance, 2.0);
        assert_eq!(enemy.attack_strength, 0.05);
    }

    #[test]
    fn raises_are_monotonic_in_either_order() {
        let actor = ActorSnapshot::hostile(ActorId::new(1), 7, Vec2::ZERO, 1.0);
        let mut first = Enemy::new(actor, 0, false);
        first.raise_priority(5);
        first.raise_priority(3);
        let mut second = Enemy::new(actor, 0, false);
        second.raise_priority(3);
        second.raise_priority(5);
        assert_eq!(first.priority, 5);
        assert_eq!(second.priority, 5);
    }

    #[test]
    fn undesirable_and_forbidden_are_kept_out_of_aoe() {
        let actor = ActorSnapshot::hostile(ActorId::new(1), 7, Vec2::ZERO, 1.0);
        let kept_out = |priority| Enemy::new(actor, priority, false).is_forbidden_for_aoe();
        assert!(kept_out(Enemy::PRIORITY_FORBIDDEN));
        assert!(kept_out(Enemy::PRIORITY_UNDESIRABLE));
        assert!(!kept_out(Enemy::PRIORITY_INVINCIBLE));
    }
}
