use arena_ai_bounds::AoeShape;
use arena_ai_core::{ActorId, ActorSnapshot, Angle, PlayerMask, SpawnSlot, Timestamp};
use arena_ai_hints::{Enemy, HintAggregator};
use glam::Vec2;

fn actor(id: u64, oid: u32, position: Vec2) -> ActorSnapshot {
    ActorSnapshot::hostile(ActorId::new(id), oid, position, 0.5)
        .with_spawn_slot(SpawnSlot::new(u32::try_from(id).expect("small id")))
}

fn ids(enemies: &[Enemy]) -> Vec<u64> {
    enemies.iter().map(|enemy| enemy.actor.id.get()).collect()
}

#[test]
fn priority_raises_converge_regardless_of_order() {
    for order in [[5, 3], [3, 5]] {
        let mut hints = HintAggregator::default();
        let _ = hints.add_enemy(actor(1, 100, Vec2::ZERO), 0, false);
        for priority in order {
            hints.prioritize_targets_by_oid(100, priority);
        }
        hints.normalize();
        assert_eq!(
            hints.potential_targets()[0].priority, 5,
            "order {order:?} lowered the priority"
        );
    }
}

#[test]
fn oid_sets_and_prioritize_all_never_lower() {
    let mut hints = HintAggregator::default();
    let _ = hints.add_enemy(actor(1, 100, Vec2::ZERO), Enemy::PRIORITY_FORBIDDEN, false);
    let _ = hints.add_enemy(actor(2, 200, Vec2::ZERO), 4, false);
    let _ = hints.add_enemy(actor(3, 300, Vec2::ZERO), Enemy::PRIORITY_POINTLESS, false);

    hints.prioritize_targets_by_oids(&[200, 300], 2);
    hints.prioritize_all();
    hints.normalize();

    let priorities: Vec<i32> = hints
        .potential_targets()
        .iter()
        .map(|enemy| enemy.priority)
        .collect();
    assert_eq!(priorities, vec![4, 2, 0]);
}

#[test]
fn equal_priorities_keep_registration_order() {
    let mut hints = HintAggregator::default();
    let _ = hints.add_enemy(actor(1, 1, Vec2::ZERO), 5, false);
    let _ = hints.add_enemy(actor(2, 1, Vec2::ZERO), 2, false);
    let _ = hints.add_enemy(actor(3, 1, Vec2::ZERO), 5, false);
    hints.normalize();

    assert_eq!(hints.highest_potential_target_priority(), 5);
    assert_eq!(ids(hints.priority_targets()), vec![1, 3]);
    assert_eq!(ids(hints.potential_targets()), vec![1, 3, 2]);
}

#[test]
fn highest_priority_never_drops_below_zero() {
    let mut hints = HintAggregator::default();
    let _ = hints.add_enemy(actor(1, 1, Vec2::ZERO), Enemy::PRIORITY_INVINCIBLE, false);
    hints.normalize();
    assert_eq!(hints.highest_potential_target_priority(), 0);
    assert!(hints.priority_targets().is_empty());

    let empty = {
        let mut hints = HintAggregator::default();
        hints.normalize();
        hints
    };
    assert_eq!(empty.highest_potential_target_priority(), 0);
    assert!(empty.forbidden_targets().is_empty());
}

#[test]
fn forbidden_targets_are_the_sentinel_suffix() {
    let mut hints = HintAggregator::default();
    let _ = hints.add_enemy(actor(1, 1, Vec2::ZERO), Enemy::PRIORITY_FORBIDDEN, false);
    let _ = hints.add_enemy(actor(2, 1, Vec2::ZERO), 0, false);
    let _ = hints.add_enemy(actor(3, 1, Vec2::ZERO), Enemy::PRIORITY_UNDESIRABLE, false);
    let _ = hints.add_enemy(actor(4, 1, Vec2::ZERO), Enemy::PRIORITY_INVINCIBLE, false);
    hints.normalize();

    assert_eq!(ids(hints.forbidden_targets()), vec![3, 1]);
}

#[test]
fn forbidden_target_vetoes_aoe_that_also_hits_priority_targets() {
    let mut hints = HintAggregator::default();
    for id in 1..=3 {
        let _ = hints.add_enemy(actor(id, 1, Vec2::new(id as f32, 0.0)), 0, false);
    }
    let _ = hints.add_enemy(
        actor(9, 2, Vec2::new(0.0, 2.0)),
        Enemy::PRIORITY_FORBIDDEN,
        false,
    );
    hints.normalize();

    let wide = hints.num_priority_targets_in_aoe_circle(Vec2::new(2.0, 0.0), 5.0);
    assert_eq!(wide, 0, "the forbidden target vetoes the wide circle");
    let narrow = hints.num_priority_targets_in_aoe_circle(Vec2::new(3.0, 0.0), 1.0);
    assert_eq!(narrow, 2);
}

#[test]
fn cone_and_rect_counts_extend_by_hitbox() {
    let mut hints = HintAggregator::default();
    let _ = hints.add_enemy(actor(1, 1, Vec2::new(0.0, 5.4)), 0, false);
    let _ = hints.add_enemy(actor(2, 1, Vec2::new(0.0, -3.0)), 0, false);
    hints.normalize();

    let forward = Vec2::Y;
    let half = Angle::from_degrees(30.0);
    assert_eq!(
        hints.num_priority_targets_in_aoe_cone(Vec2::ZERO, 5.0, forward, half),
        1
    );
    assert_eq!(
        hints.num_priority_targets_in_aoe_rect(Vec2::ZERO, forward, 5.0, 1.0, 0.0),
        1
    );
    assert_eq!(
        hints.num_priority_targets_in_aoe_rect(Vec2::ZERO, forward, 5.0, 1.0, 3.0),
        2
    );
}

#[test]
fn time_ordered_lists_sort_by_activation() {
    let t1 = Timestamp::from_secs_f32(1.0);
    let t2 = Timestamp::from_secs_f32(2.0);
    let t3 = Timestamp::from_secs_f32(3.0);

    let mut hints = HintAggregator::default();
    let circle = AoeShape::Circle { radius: 3.0 };
    for activation in [t3, t1, t2] {
        hints.add_forbidden_zone_shape(&circle, Vec2::ZERO, Angle::default(), activation);
        hints.add_forbidden_direction(Angle::default(), Angle::HALF_PI, activation);
        hints.add_predicted_damage(PlayerMask::single(0), activation);
    }
    hints.normalize();

    let zones: Vec<_> = hints
        .forbidden_zones()
        .iter()
        .map(|zone| zone.activation)
        .collect();
    let directions: Vec<_> = hints
        .forbidden_directions()
        .iter()
        .map(|direction| direction.activation)
        .collect();
    let damage: Vec<_> = hints
        .predicted_damage()
        .iter()
        .map(|prediction| prediction.activation)
        .collect();
    assert_eq!(zones, vec![t1, t2, t3]);
    assert_eq!(directions, vec![t1, t2, t3]);
    assert_eq!(damage, vec![t1, t2, t3]);
    assert!((hints.forbidden_zones()[0].distance)(Vec2::ZERO) < 0.0);
}

#[test]
fn goal_values_sum_every_contribution() {
    let mut hints = HintAggregator::default();
    hints.add_goal_zone(Box::new(|position| position.x));
    hints.add_goal_zone(Box::new(|_| 0.5));
    assert!((hints.goal_value(Vec2::new(2.0, 0.0)) - 2.5).abs() < 1e-6);
}
