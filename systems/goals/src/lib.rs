#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Factories for position-scoring goal functions.
//!
//! Scores follow a shared scale: 1 where a single-target action can be used, 2
//! where it also satisfies its positional, 3 where an area action reaches its
//! minimum useful target count and one more for every extra target. Functions
//! that depend on the snapshot copy what they need when built, so later
//! changes to the snapshot do not leak into scoring. Malformed parameters
//! produce a function that always scores zero.

use arena_ai_core::{ortho_left, shape, ActorSnapshot, Angle, Positional};
use arena_ai_hints::{GoalFn, HintAggregator};
use glam::Vec2;

/// Melee reach assumed by positional goals before hitboxes are added.
pub const DEFAULT_MELEE_RANGE: f32 = 2.6;

/// Minimum area target count treated as unreachable by [`combined`].
pub const UNREACHABLE_AOE_TARGETS: u32 = 50;

fn zero() -> GoalFn {
    Box::new(|_| 0.0)
}

/// Scores `weight` within `radius` of `target`, zero elsewhere.
#[must_use]
pub fn single_target(target: Vec2, radius: f32, weight: f32) -> GoalFn {
    if !(radius >= 0.0) {
        return zero();
    }
    let radius_sq = radius * radius;
    Box::new(move |position| {
        if (position - target).length_squared() <= radius_sq {
            weight
        } else {
            0.0
        }
    })
}

/// Scores `weight` wherever an action of `range` reaches the target, counting both hitboxes.
#[must_use]
pub fn single_target_actor(
    target: &ActorSnapshot,
    agent_hitbox_radius: f32,
    range: f32,
    weight: f32,
) -> GoalFn {
    single_target(
        target.position,
        range + target.hitbox_radius + agent_hitbox_radius,
        weight,
    )
}

/// Scores 2 where the requested positional is satisfied within `radius`, 1 elsewhere in range.
///
/// [`Positional::Front`] is a best-effort approximation: the front quadrant
/// of the target.
#[must_use]
pub fn single_target_positional(
    target: Vec2,
    rotation: Angle,
    positional: Positional,
    radius: f32,
) -> GoalFn {
    if positional == Positional::Any {
        return single_target(target, radius, 1.0);
    }
    if !(radius >= 0.0) {
        return zero();
    }

    let radius_sq = radius * radius;
    let facing = rotation.to_direction();
    Box::new(move |position| {
        let offset = position - target;
        if offset.length_squared() > radius_sq {
            return 0.0;
        }
        let front = facing.dot(offset);
        let side = facing.dot(ortho_left(offset)).abs();
        let satisfied = match positional {
            Positional::Flank => side > front.abs(),
            Positional::Rear => -front > side,
            Positional::Front => front > side,
            Positional::Any => false,
        };
        if satisfied {
            2.0
        } else {
            1.0
        }
    })
}

/// Positional goal around an actor, counting both hitboxes.
#[must_use]
pub fn single_target_positional_actor(
    target: &ActorSnapshot,
    agent_hitbox_radius: f32,
    positional: Positional,
    range: f32,
) -> GoalFn {
    single_target_positional(
        target.position,
        target.rotation,
        positional,
        range + target.hitbox_radius + agent_hitbox_radius,
    )
}

#[derive(Clone, Copy, Debug)]
struct TargetPoint {
    position: Vec2,
    radius: f32,
}

fn snapshot_priority_targets(hints: &HintAggregator) -> Vec<TargetPoint> {
    hints
        .priority_targets()
        .iter()
        .map(|enemy| TargetPoint {
            position: enemy.actor.position,
            radius: enemy.actor.hitbox_radius,
        })
        .collect()
}

/// Counts the priority targets a circle centered on the scored position would hit.
#[must_use]
pub fn aoe_circle(hints: &HintAggregator, radius: f32) -> GoalFn {
    let targets = snapshot_priority_targets(hints);
    if targets.is_empty() || !(radius >= 0.0) {
        return zero();
    }
    Box::new(move |position| {
        targets
            .iter()
            .filter(|target| {
                shape::in_circle(target.position, position, radius + target.radius)
            })
            .count() as f32
    })
}

/// Counts the priority targets a cone aimed from the scored position at `primary` would hit.
///
/// Positions from which `primary` is out of reach score zero.
#[must_use]
pub fn aoe_cone(
    hints: &HintAggregator,
    primary: &ActorSnapshot,
    radius: f32,
    half_angle: Angle,
) -> GoalFn {
    let targets = snapshot_priority_targets(hints);
    if targets.is_empty() || !(radius > 0.0) || !(half_angle.radians() > 0.0) {
        return zero();
    }

    let aim_point = primary.position;
    let reach = radius + primary.hitbox_radius;
    let reach_sq = reach * reach;
    Box::new(move |position| {
        let to_target = aim_point - position;
        if to_target.length_squared() > reach_sq {
            return 0.0;
        }
        let Some(direction) = to_target.try_normalize() else {
            return 0.0;
        };
        targets
            .iter()
            .filter(|target| {
                shape::in_circle_cone(
                    target.position,
                    position,
                    radius + target.radius,
                    direction,
                    half_angle,
                )
            })
            .count() as f32
    })
}

/// Counts the priority targets a rectangle aimed from the scored position at `primary` would hit.
///
/// Positions from which `primary` is out of reach score zero.
#[must_use]
pub fn aoe_rect(
    hints: &HintAggregator,
    primary: &ActorSnapshot,
    len_front: f32,
    half_width: f32,
    len_back: f32,
) -> GoalFn {
    let targets = snapshot_priority_targets(hints);
    if targets.is_empty() || !(len_front > 0.0) || !(half_width > 0.0) || len_back < 0.0 {
        return zero();
    }

    let aim_point = primary.position;
    let reach = len_front + primary.hitbox_radius;
    let reach_sq = reach * reach;
    Box::new(move |position| {
        let to_target = aim_point - position;
        if to_target.length_squared() > reach_sq {
            return 0.0;
        }
        let Some(direction) = to_target.try_normalize() else {
            return 0.0;
        };
        targets
            .iter()
            .filter(|target| {
                shape::in_rect(
                    target.position,
                    position,
                    direction,
                    len_front + target.radius,
                    len_back,
                    half_width,
                )
            })
            .count() as f32
    })
}

/// Prefers the area action where it reaches `min_aoe_targets`, otherwise the single-target score.
///
/// Thresholds of [`UNREACHABLE_AOE_TARGETS`] or more return `single_target` unchanged.
#[must_use]
pub fn combined(single_target: GoalFn, aoe: GoalFn, min_aoe_targets: u32) -> GoalFn {
    if min_aoe_targets >= UNREACHABLE_AOE_TARGETS {
        return single_target;
    }
    let minimum = min_aoe_targets as f32;
    Box::new(move |position| {
        let extra = aoe(position) - minimum;
        if extra >= 0.0 {
            3.0 + extra
        } else {
            single_target(position)
        }
    })
}

/// Falls off linearly from `max_weight` at `destination` to zero at `max_distance`.
#[must_use]
pub fn proximity(destination: Vec2, max_distance: f32, max_weight: f32) -> GoalFn {
    if !(max_distance > 0.0) {
        return zero();
    }
    let inverse = 1.0 / max_distance;
    Box::new(move |position| {
        let distance = (position - destination).length();
        max_weight * (1.0 - (distance * inverse).clamp(0.0, 1.0))
    })
}
