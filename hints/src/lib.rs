#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick decision snapshot shared by every producer and consumer.
//!
//! A tick runs in three phases. [`HintAggregator::clear`] discards the previous
//! snapshot; producers then register enemies, raise priorities and append
//! hazards, goals and constraints in any order; finally
//! [`HintAggregator::normalize`] freezes the ordering once, after which
//! consumers only read. Reading before normalization or after the next clear
//! is a caller error and is not guarded at runtime.

mod action_queue;
mod config;
mod enemy;

use std::fmt;

use arena_ai_bounds::{AoeShape, ObstacleRegion, PathfindMap, ShapeBounds, ShapeDistance};
use arena_ai_core::{
    shape, ActorId, ActorSnapshot, ActorView, Angle, PlayerMask, Positional, SpawnSlot,
    SpecialMode, Timestamp,
};
use glam::Vec2;
use tracing::{debug, trace, warn};

pub use action_queue::{ActionQueue, QueuedAction};
pub use config::{ConfigError, HintsConfig, MAX_ENEMY_CAPACITY};
pub use enemy::Enemy;

/// Position-to-score function contributed as a goal zone; consumers sum every goal.
pub type GoalFn = Box<dyn Fn(Vec2) -> f32>;

/// Area the agent must not stand in once `activation` has passed.
pub struct ForbiddenZone {
    /// Signed distance to the hazard; negative inside.
    pub distance: ShapeDistance,
    /// Time the hazard becomes dangerous.
    pub activation: Timestamp,
}

impl fmt::Debug for ForbiddenZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForbiddenZone")
            .field("activation", &self.activation)
            .finish_non_exhaustive()
    }
}

/// Facing arc the agent must avoid once `activation` has passed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForbiddenDirection {
    /// Center of the forbidden arc.
    pub center: Angle,
    /// Half of the arc width.
    pub half_width: Angle,
    /// Time the constraint takes effect.
    pub activation: Timestamp,
}

/// Incoming damage predicted for a set of party members.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamagePrediction {
    /// Party members expected to be hit.
    pub players: PlayerMask,
    /// Time the damage lands.
    pub activation: Timestamp,
}

/// Next positional the agent should aim for.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RecommendedPositional {
    /// Target the positional refers to.
    pub target: Option<ActorId>,
    /// Requested position relative to the target.
    pub positional: Positional,
    /// Whether the positional action is about to be used.
    pub imminent: bool,
    /// Whether the agent already stands in the correct spot.
    pub correct: bool,
}

/// Status effect that should be removed as soon as possible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusToCancel {
    /// Identifier of the status effect.
    pub status_id: u32,
    /// Actor that applied the status.
    pub source: ActorId,
}

/// Closest special mode proposed this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImminentSpecialMode {
    /// Restriction that applies.
    pub mode: SpecialMode,
    /// Time the restriction takes effect.
    pub activation: Timestamp,
}

/// Mutable aggregation point for one tick of decision data.
pub struct HintAggregator {
    config: HintsConfig,
    pathfind_map_bounds: ShapeBounds,
    pathfind_map_obstacles: Option<ObstacleRegion>,
    pathfind_map: Option<PathfindMap>,
    enemies: Vec<Enemy>,
    slots: Vec<Option<usize>>,
    highest_potential_target_priority: i32,
    forced_target: Option<ActorId>,
    forced_movement: Option<Vec2>,
    interact_with_target: Option<ActorId>,
    forbidden_zones: Vec<ForbiddenZone>,
    goal_zones: Vec<GoalFn>,
    recommended_positional: RecommendedPositional,
    forbidden_directions: Vec<ForbiddenDirection>,
    imminent_special_mode: Option<ImminentSpecialMode>,
    misdirection_threshold: Angle,
    predicted_damage: Vec<DamagePrediction>,
    max_cast_time: f32,
    force_cancel_cast: bool,
    actions_to_execute: ActionQueue,
    statuses_to_cancel: Vec<StatusToCancel>,
    want_jump: bool,
    want_dismount: bool,
}

impl fmt::Debug for HintAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HintAggregator")
            .field("enemies", &self.enemies.len())
            .field(
                "highest_potential_target_priority",
                &self.highest_potential_target_priority,
            )
            .field("forbidden_zones", &self.forbidden_zones.len())
            .field("goal_zones", &self.goal_zones.len())
            .field("forbidden_directions", &self.forbidden_directions.len())
            .field("predicted_damage", &self.predicted_damage.len())
            .field("imminent_special_mode", &self.imminent_special_mode)
            .finish_non_exhaustive()
    }
}

impl Default for HintAggregator {
    fn default() -> Self {
        Self::new(HintsConfig::default())
    }
}

impl HintAggregator {
    /// Creates an empty snapshot driven by the provided configuration.
    ///
    /// A configuration that fails [`HintsConfig::validate`] is logged and
    /// replaced by the defaults.
    #[must_use]
    pub fn new(config: HintsConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(error) => {
                warn!(%error, "invalid hints config, falling back to defaults");
                HintsConfig::default()
            }
        };
        let mut hints = Self {
            pathfind_map_bounds: default_bounds(&config),
            pathfind_map_obstacles: None,
            pathfind_map: None,
            enemies: Vec::new(),
            slots: vec![None; config.enemy_capacity],
            highest_potential_target_priority: 0,
            forced_target: None,
            forced_movement: None,
            interact_with_target: None,
            forbidden_zones: Vec::new(),
            goal_zones: Vec::new(),
            recommended_positional: RecommendedPositional::default(),
            forbidden_directions: Vec::new(),
            imminent_special_mode: None,
            misdirection_threshold: Angle::from_degrees(config.misdirection_threshold_degrees),
            predicted_damage: Vec::new(),
            max_cast_time: f32::MAX,
            force_cancel_cast: false,
            actions_to_execute: ActionQueue::new(),
            statuses_to_cancel: Vec::new(),
            want_jump: false,
            want_dismount: false,
            config,
        };
        hints.clear();
        hints
    }

    /// Configuration the snapshot was created with.
    #[must_use]
    pub const fn config(&self) -> &HintsConfig {
        &self.config
    }

    /// Resets every list and override; called once at the start of each tick.
    pub fn clear(&mut self) {
        self.pathfind_map_bounds = default_bounds(&self.config);
        self.pathfind_map_obstacles = None;
        self.pathfind_map = None;
        self.enemies.clear();
        self.slots.clear();
        self.slots.resize(self.config.enemy_capacity, None);
        self.highest_potential_target_priority = 0;
        self.forced_target = None;
        self.forced_movement = None;
        self.interact_with_target = None;
        self.forbidden_zones.clear();
        self.goal_zones.clear();
        self.recommended_positional = RecommendedPositional::default();
        self.forbidden_directions.clear();
        self.imminent_special_mode = None;
        self.misdirection_threshold =
            Angle::from_degrees(self.config.misdirection_threshold_degrees);
        self.predicted_damage.clear();
        self.max_cast_time = f32::MAX;
        self.force_cancel_cast = false;
        self.actions_to_execute.clear();
        self.statuses_to_cancel.clear();
        self.want_jump = false;
        self.want_dismount = false;
    }

    /// Registers a potential target.
    ///
    /// Actors whose spawn slot lies past the registry capacity are skipped.
    /// Actors without a slot become potential targets but cannot be looked up
    /// through [`HintAggregator::find_enemy`].
    pub fn add_enemy(
        &mut self,
        actor: ActorSnapshot,
        priority: i32,
        should_be_tanked: bool,
    ) -> Option<&mut Enemy> {
        let slot = match actor.spawn_slot {
            Some(slot) => match slot.index().filter(|index| *index < self.slots.len()) {
                Some(index) => Some(index),
                None => {
                    warn!(
                        actor = actor.id.get(),
                        slot = slot.get(),
                        capacity = self.slots.len(),
                        "skipping enemy with spawn slot past registry capacity"
                    );
                    return None;
                }
            },
            None => None,
        };

        let enemy = Enemy::new(actor, priority, should_be_tanked);
        let index = match slot.and_then(|slot| self.slots[slot]) {
            Some(existing) => {
                self.enemies[existing] = enemy;
                existing
            }
            None => {
                self.enemies.push(enemy);
                self.enemies.len() - 1
            }
        };
        if let Some(slot) = slot {
            self.slots[slot] = Some(index);
        }
        self.enemies.get_mut(index)
    }

    /// Enemy registered for a spawn slot; slots past capacity report `None`.
    #[must_use]
    pub fn find_enemy(&self, slot: SpawnSlot) -> Option<&Enemy> {
        let index = self.slot_index(slot)?;
        self.enemies.get(index)
    }

    /// Mutable access to the enemy registered for a spawn slot.
    pub fn find_enemy_mut(&mut self, slot: SpawnSlot) -> Option<&mut Enemy> {
        let index = self.slot_index(slot)?;
        self.enemies.get_mut(index)
    }

    fn slot_index(&self, slot: SpawnSlot) -> Option<usize> {
        let index = slot.index()?;
        self.slots.get(index).copied().flatten()
    }

    /// Potential targets; sorted by descending priority once normalized.
    #[must_use]
    pub fn potential_targets(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Mutable access to the potential targets for producers refining hints.
    pub fn potential_targets_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    /// Highest priority among potential targets, never below zero.
    #[must_use]
    pub const fn highest_potential_target_priority(&self) -> i32 {
        self.highest_potential_target_priority
    }

    /// Raises every target of the given object type to at least `priority`.
    pub fn prioritize_targets_by_oid(&mut self, oid: u32, priority: i32) {
        self.enemies
            .iter_mut()
            .filter(|enemy| enemy.actor.oid == oid)
            .for_each(|enemy| enemy.raise_priority(priority));
    }

    /// Raises every target whose object type is listed to at least `priority`.
    pub fn prioritize_targets_by_oids(&mut self, oids: &[u32], priority: i32) {
        self.enemies
            .iter_mut()
            .filter(|enemy| oids.contains(&enemy.actor.oid))
            .for_each(|enemy| enemy.raise_priority(priority));
    }

    /// Raises every target to at least priority zero.
    pub fn prioritize_all(&mut self) {
        self.enemies
            .iter_mut()
            .for_each(|enemy| enemy.raise_priority(0));
    }

    /// Target the agent must attack, overriding its own choice.
    #[must_use]
    pub const fn forced_target(&self) -> Option<ActorId> {
        self.forced_target
    }

    /// Sets or removes the forced target.
    pub fn set_forced_target(&mut self, target: Option<ActorId>) {
        self.forced_target = target;
    }

    /// Direction the agent must move in, ignoring every other hint; zero means stand still.
    #[must_use]
    pub const fn forced_movement(&self) -> Option<Vec2> {
        self.forced_movement
    }

    /// Sets or removes the forced movement.
    pub fn set_forced_movement(&mut self, movement: Option<Vec2>) {
        self.forced_movement = movement;
    }

    /// Object the agent should interact with.
    #[must_use]
    pub const fn interact_with_target(&self) -> Option<ActorId> {
        self.interact_with_target
    }

    /// Sets or removes the interaction target.
    pub fn set_interact_with_target(&mut self, target: Option<ActorId>) {
        self.interact_with_target = target;
    }

    /// Selects the first targetable actor of the given object type for interaction.
    pub fn interact_with_oid(&mut self, actors: &ActorView, oid: u32) {
        self.interact_with_target = actors
            .iter()
            .find(|actor| actor.oid == oid && actor.targetable)
            .map(|actor| actor.id);
    }

    /// Appends a hazard described by a signed distance function.
    pub fn add_forbidden_zone(&mut self, distance: ShapeDistance, activation: Timestamp) {
        self.forbidden_zones.push(ForbiddenZone {
            distance,
            activation,
        });
    }

    /// Appends a hazard described by an area-of-effect shape.
    pub fn add_forbidden_zone_shape(
        &mut self,
        shape: &AoeShape,
        origin: Vec2,
        rotation: Angle,
        activation: Timestamp,
    ) {
        self.add_forbidden_zone(shape.distance(origin, rotation), activation);
    }

    /// Hazards; sorted by ascending activation once normalized.
    #[must_use]
    pub fn forbidden_zones(&self) -> &[ForbiddenZone] {
        &self.forbidden_zones
    }

    /// Appends a goal function.
    pub fn add_goal_zone(&mut self, goal: GoalFn) {
        self.goal_zones.push(goal);
    }

    /// Goal functions in insertion order.
    #[must_use]
    pub fn goal_zones(&self) -> &[GoalFn] {
        &self.goal_zones
    }

    /// Sum of every goal function at `position`.
    #[must_use]
    pub fn goal_value(&self, position: Vec2) -> f32 {
        self.goal_zones.iter().map(|goal| goal(position)).sum()
    }

    /// Next positional hint.
    #[must_use]
    pub const fn recommended_positional(&self) -> RecommendedPositional {
        self.recommended_positional
    }

    /// Replaces the positional hint.
    pub fn set_recommended_positional(&mut self, positional: RecommendedPositional) {
        self.recommended_positional = positional;
    }

    /// Appends a forbidden facing arc.
    pub fn add_forbidden_direction(
        &mut self,
        center: Angle,
        half_width: Angle,
        activation: Timestamp,
    ) {
        self.forbidden_directions.push(ForbiddenDirection {
            center,
            half_width,
            activation,
        });
    }

    /// Forbidden facing arcs; sorted by ascending activation once normalized.
    #[must_use]
    pub fn forbidden_directions(&self) -> &[ForbiddenDirection] {
        &self.forbidden_directions
    }

    /// Proposes a special mode, keeping only the earliest activation.
    ///
    /// On an exact tie the proposal already stored is kept.
    pub fn add_special_mode(&mut self, mode: SpecialMode, activation: Timestamp) {
        let replace = self
            .imminent_special_mode
            .map_or(true, |current| activation < current.activation);
        if replace {
            self.imminent_special_mode = Some(ImminentSpecialMode { mode, activation });
        }
    }

    /// Earliest special mode proposed this tick.
    #[must_use]
    pub const fn imminent_special_mode(&self) -> Option<ImminentSpecialMode> {
        self.imminent_special_mode
    }

    /// Maximum deviation between forced movement and the real movement under misdirection.
    #[must_use]
    pub const fn misdirection_threshold(&self) -> Angle {
        self.misdirection_threshold
    }

    /// Overrides the misdirection threshold until the next clear.
    pub fn set_misdirection_threshold(&mut self, threshold: Angle) {
        self.misdirection_threshold = threshold;
    }

    /// Appends a damage prediction.
    pub fn add_predicted_damage(&mut self, players: PlayerMask, activation: Timestamp) {
        self.predicted_damage.push(DamagePrediction {
            players,
            activation,
        });
    }

    /// Damage predictions; sorted by ascending activation once normalized.
    #[must_use]
    pub fn predicted_damage(&self) -> &[DamagePrediction] {
        &self.predicted_damage
    }

    /// Longest cast, in seconds, the agent can start before it must move.
    #[must_use]
    pub const fn max_cast_time(&self) -> f32 {
        self.max_cast_time
    }

    /// Lowers the cast-time bound to at most `seconds`; never raises it.
    pub fn limit_max_cast_time(&mut self, seconds: f32) {
        if seconds < self.max_cast_time {
            self.max_cast_time = seconds;
        }
    }

    /// Whether an ongoing cast must be cancelled.
    #[must_use]
    pub const fn force_cancel_cast(&self) -> bool {
        self.force_cancel_cast
    }

    /// Requests that any ongoing cast be cancelled.
    pub fn set_force_cancel_cast(&mut self) {
        self.force_cancel_cast = true;
    }

    /// Actions gathered for the action-priority collaborator.
    #[must_use]
    pub const fn actions_to_execute(&self) -> &ActionQueue {
        &self.actions_to_execute
    }

    /// Mutable access to the outgoing action queue.
    pub fn actions_to_execute_mut(&mut self) -> &mut ActionQueue {
        &mut self.actions_to_execute
    }

    /// Requests removal of a status effect.
    pub fn add_status_to_cancel(&mut self, status_id: u32, source: ActorId) {
        self.statuses_to_cancel.push(StatusToCancel { status_id, source });
    }

    /// Status effects to remove.
    #[must_use]
    pub fn statuses_to_cancel(&self) -> &[StatusToCancel] {
        &self.statuses_to_cancel
    }

    /// Whether the agent should jump.
    #[must_use]
    pub const fn want_jump(&self) -> bool {
        self.want_jump
    }

    /// Requests a jump.
    pub fn set_want_jump(&mut self) {
        self.want_jump = true;
    }

    /// Whether the agent should dismount.
    #[must_use]
    pub const fn want_dismount(&self) -> bool {
        self.want_dismount
    }

    /// Requests a dismount.
    pub fn set_want_dismount(&mut self) {
        self.want_dismount = true;
    }

    /// Freezes the snapshot ordering; called once after every producer has run.
    pub fn normalize(&mut self) {
        self.enemies.sort_by(|a, b| b.priority.cmp(&a.priority));
        self.slots.iter_mut().for_each(|slot| *slot = None);
        for (index, enemy) in self.enemies.iter().enumerate() {
            let Some(slot) = enemy.actor.spawn_slot.and_then(|slot| slot.index()) else {
                continue;
            };
            if let Some(entry) = self.slots.get_mut(slot) {
                *entry = Some(index);
            }
        }

        let highest = self.enemies.first().map_or(0, |top| top.priority.max(0));
        self.highest_potential_target_priority = highest;

        self.forbidden_zones.sort_by_key(|zone| zone.activation);
        self.forbidden_directions
            .sort_by_key(|direction| direction.activation);
        self.predicted_damage
            .sort_by_key(|prediction| prediction.activation);

        trace!(
            enemies = self.enemies.len(),
            highest_priority = self.highest_potential_target_priority,
            forbidden_zones = self.forbidden_zones.len(),
            goal_zones = self.goal_zones.len(),
            forbidden_directions = self.forbidden_directions.len(),
            predicted_damage = self.predicted_damage.len(),
            "normalized hints"
        );
    }

    /// Targets sharing the highest priority, in their relative registration order.
    #[must_use]
    pub fn priority_targets(&self) -> &[Enemy] {
        let highest = self.highest_potential_target_priority;
        let count = self
            .enemies
            .iter()
            .take_while(|enemy| enemy.priority == highest)
            .count();
        &self.enemies[..count]
    }

    /// Undesirable and forbidden targets at the tail of the ordering.
    #[must_use]
    pub fn forbidden_targets(&self) -> &[Enemy] {
        let count = self
            .enemies
            .iter()
            .rev()
            .take_while(|enemy| enemy.is_forbidden_for_aoe())
            .count();
        &self.enemies[self.enemies.len() - count..]
    }

    /// Number of priority targets matching `hit`, or zero if any forbidden target would also
    /// match.
    pub fn num_priority_targets_in_aoe(&self, hit: impl Fn(&ActorSnapshot) -> bool) -> usize {
        let hits = |enemy: &Enemy| hit(&enemy.actor);
        if self.forbidden_targets().iter().any(hits) {
            return 0;
        }
        self.priority_targets()
            .iter()
            .filter(|enemy| hit(&enemy.actor))
            .count()
    }

    /// Priority targets hit by a circle, vetoed by forbidden targets.
    #[must_use]
    pub fn num_priority_targets_in_aoe_circle(&self, origin: Vec2, radius: f32) -> usize {
        self.num_priority_targets_in_aoe(|target| target_in_aoe_circle(target, origin, radius))
    }

    /// Priority targets hit by a cone, vetoed by forbidden targets.
    #[must_use]
    pub fn num_priority_targets_in_aoe_cone(
        &self,
        origin: Vec2,
        radius: f32,
        direction: Vec2,
        half_angle: Angle,
    ) -> usize {
        self.num_priority_targets_in_aoe(|target| {
            target_in_aoe_cone(target, origin, radius, direction, half_angle)
        })
    }

    /// Priority targets hit by a rectangle, vetoed by forbidden targets.
    #[must_use]
    pub fn num_priority_targets_in_aoe_rect(
        &self,
        origin: Vec2,
        direction: Vec2,
        len_front: f32,
        half_width: f32,
        len_back: f32,
    ) -> usize {
        self.num_priority_targets_in_aoe(|target| {
            target_in_aoe_rect(target, origin, direction, len_front, half_width, len_back)
        })
    }

    /// Bound the pathfind grid is built from.
    #[must_use]
    pub const fn pathfind_map_bounds(&self) -> &ShapeBounds {
        &self.pathfind_map_bounds
    }

    /// Center of the pathfind grid.
    #[must_use]
    pub const fn pathfind_map_center(&self) -> Vec2 {
        self.pathfind_map_bounds.center()
    }

    /// Installs the bound for this tick, invalidating any grid already built.
    pub fn set_pathfind_map_bounds(&mut self, mut bounds: ShapeBounds) {
        bounds.set_screen_half_size(self.config.screen_half_size);
        self.pathfind_map_bounds = bounds;
        self.pathfind_map = None;
    }

    /// Obstacle bitmap overlaid on the pathfind grid.
    #[must_use]
    pub const fn pathfind_map_obstacles(&self) -> Option<&ObstacleRegion> {
        self.pathfind_map_obstacles.as_ref()
    }

    /// Installs or removes the obstacle bitmap, invalidating any grid already built.
    pub fn set_pathfind_map_obstacles(&mut self, obstacles: Option<ObstacleRegion>) {
        self.pathfind_map_obstacles = obstacles;
        self.pathfind_map = None;
    }

    /// Builds the pathfind grid on first use this tick and returns it.
    pub fn init_pathfind_map(&mut self) -> &PathfindMap {
        let bounds = &self.pathfind_map_bounds;
        let obstacles = self.pathfind_map_obstacles.as_ref();
        let resolution = self.config.pathfind_resolution;
        self.pathfind_map.get_or_insert_with(|| {
            let mut map = bounds.build_pathfind_map(resolution);
            let obstacle_cells = obstacles.map_or(0, |region| map.apply_obstacles(region));
            debug!(
                width = map.width(),
                height = map.height(),
                resolution,
                obstacle_cells,
                blocked = map.blocked_count(),
                "built pathfind map"
            );
            map
        })
    }

    /// Grid built by [`HintAggregator::init_pathfind_map`], if any.
    #[must_use]
    pub const fn pathfind_map(&self) -> Option<&PathfindMap> {
        self.pathfind_map.as_ref()
    }

    /// Moves a world position onto the pathfind bound if it lies outside.
    #[must_use]
    pub fn clamp_to_bounds(&self, position: Vec2) -> Vec2 {
        self.pathfind_map_bounds.clamp_position(position)
    }
}

fn default_bounds(config: &HintsConfig) -> ShapeBounds {
    let mut bounds = ShapeBounds::square(Vec2::ZERO, config.default_bounds_half_size);
    bounds.set_screen_half_size(config.screen_half_size);
    bounds
}

/// Reports whether a circle reaches the target's hitbox.
#[must_use]
pub fn target_in_aoe_circle(target: &ActorSnapshot, origin: Vec2, radius: f32) -> bool {
    shape::in_circle(target.position, origin, radius + target.hitbox_radius)
}

/// Reports whether a cone reaches the target's hitbox.
#[must_use]
pub fn target_in_aoe_cone(
    target: &ActorSnapshot,
    origin: Vec2,
    radius: f32,
    direction: Vec2,
    half_angle: Angle,
) -> bool {
    shape::in_circle_cone(
        target.position,
        origin,
        radius + target.hitbox_radius,
        direction,
        half_angle,
    )
}

/// Reports whether a rectangle reaches the target's hitbox.
#[must_use]
pub fn target_in_aoe_rect(
    target: &ActorSnapshot,
    origin: Vec2,
    direction: Vec2,
    len_front: f32,
    half_width: f32,
    len_back: f32,
) -> bool {
    shape::in_rect(
        target.position,
        origin,
        direction,
        len_front + target.hitbox_radius,
        len_back,
        half_width,
    )
}

#[cfg(test)]
mod tests {
    use super::{HintAggregator, HintsConfig};
    use arena_ai_bounds::{Bitmap, ObstacleRegion, ShapeBounds};
    use arena_ai_core::{ActorId, ActorSnapshot, Angle, SpawnSlot, SpecialMode, Timestamp};
    use glam::Vec2;

    fn actor(id: u64, slot: u32) -> ActorSnapshot {
        ActorSnapshot::hostile(ActorId::new(id), 1, Vec2::ZERO, 1.0)
            .with_spawn_slot(SpawnSlot::new(slot))
    }

    #[test]
    fn slots_past_capacity_are_skipped() {
        let mut hints = HintAggregator::new(HintsConfig {
            enemy_capacity: 4,
            ..HintsConfig::default()
        });
        assert!(hints.add_enemy(actor(1, 3), 0, false).is_some());
        assert!(hints.add_enemy(actor(2, 4), 0, false).is_none());
        assert_eq!(hints.potential_targets().len(), 1);
        assert!(hints.find_enemy(SpawnSlot::new(4)).is_none());
        assert!(hints.find_enemy(SpawnSlot::new(u32::MAX)).is_none());
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let hints = HintAggregator::new(HintsConfig {
            enemy_capacity: usize::MAX,
            ..HintsConfig::default()
        });
        assert_eq!(hints.config(), &HintsConfig::default());

        let mut hints = HintAggregator::new(HintsConfig {
            pathfind_resolution: 0.0,
            ..HintsConfig::default()
        });
        assert_eq!(hints.config().pathfind_resolution, 0.5);
        assert!(hints.add_enemy(actor(1, 99), 0, false).is_some());
    }

    #[test]
    fn lookup_survives_normalization_reordering() {
        let mut hints = HintAggregator::default();
        let _ = hints.add_enemy(actor(1, 10), 0, false);
        let _ = hints.add_enemy(actor(2, 20), 3, false);
        hints.normalize();

        assert_eq!(hints.potential_targets()[0].actor.id, ActorId::new(2));
        let enemy = hints
            .find_enemy(SpawnSlot::new(10))
            .expect("slot 10 registered");
        assert_eq!(enemy.actor.id, ActorId::new(1));

        if let Some(enemy) = hints.find_enemy_mut(SpawnSlot::new(20)) {
            enemy.should_be_stunned = true;
        }
        assert!(hints.potential_targets()[0].should_be_stunned);
    }

    #[test]
    fn re_registering_a_slot_replaces_the_record() {
        let mut hints = HintAggregator::default();
        let _ = hints.add_enemy(actor(1, 5), 0, false);
        let _ = hints.add_enemy(actor(2, 5), 2, true);
        assert_eq!(hints.potential_targets().len(), 1);
        let enemy = hints.find_enemy(SpawnSlot::new(5)).expect("registered");
        assert_eq!(enemy.actor.id, ActorId::new(2));
    }

    #[test]
    fn clear_resets_every_list_and_flag() {
        let mut hints = HintAggregator::default();
        let _ = hints.add_enemy(actor(1, 1), 0, false);
        hints.add_forbidden_zone(Box::new(|_| -1.0), Timestamp::default());
        hints.add_goal_zone(Box::new(|_| 1.0));
        hints.add_special_mode(SpecialMode::Freezing, Timestamp::from_secs_f32(2.0));
        hints.set_misdirection_threshold(Angle::from_degrees(40.0));
        hints.limit_max_cast_time(1.5);
        hints.set_force_cancel_cast();
        hints.set_want_jump();
        hints.set_want_dismount();
        hints.add_status_to_cancel(12, ActorId::new(1));
        hints
            .actions_to_execute_mut()
            .push(arena_ai_core::ActionId::new(1), None, 1.0, 1.0);
        hints.set_forced_target(Some(ActorId::new(1)));
        hints.set_pathfind_map_bounds(ShapeBounds::circle(Vec2::ONE, 10.0));
        let _ = hints.init_pathfind_map();

        hints.clear();

        assert!(hints.potential_targets().is_empty());
        assert!(hints.find_enemy(SpawnSlot::new(1)).is_none());
        assert!(hints.forbidden_zones().is_empty());
        assert!(hints.goal_zones().is_empty());
        assert!(hints.imminent_special_mode().is_none());
        let threshold = hints.misdirection_threshold().degrees();
        assert!((threshold - 15.0).abs() < 1e-4);
        assert_eq!(hints.max_cast_time(), f32::MAX);
        assert!(!hints.force_cancel_cast());
        assert!(!hints.want_jump());
        assert!(!hints.want_dismount());
        assert!(hints.statuses_to_cancel().is_empty());
        assert!(hints.actions_to_execute().is_empty());
        assert!(hints.forced_target().is_none());
        assert!(hints.pathfind_map().is_none());
        assert_eq!(
            hints.pathfind_map_bounds(),
            &ShapeBounds::square(Vec2::ZERO, 30.0)
        );
    }

    #[test]
    fn special_mode_keeps_earliest_and_first_on_tie() {
        let mut hints = HintAggregator::default();
        hints.add_special_mode(SpecialMode::Freezing, Timestamp::from_secs_f32(5.0));
        hints.add_special_mode(SpecialMode::Pyretic, Timestamp::from_secs_f32(3.0));
        hints.add_special_mode(SpecialMode::NoMovement, Timestamp::from_secs_f32(3.0));
        hints.add_special_mode(SpecialMode::Misdirection, Timestamp::from_secs_f32(4.0));

        let imminent = hints.imminent_special_mode().expect("a mode was proposed");
        assert_eq!(imminent.mode, SpecialMode::Pyretic);
        assert_eq!(imminent.activation, Timestamp::from_secs_f32(3.0));
    }

    #[test]
    fn cast_time_limit_only_shrinks() {
        let mut hints = HintAggregator::default();
        hints.limit_max_cast_time(2.0);
        hints.limit_max_cast_time(4.0);
        assert_eq!(hints.max_cast_time(), 2.0);
    }

    #[test]
    fn pathfind_map_is_built_once_with_obstacles() {
        let mut hints = HintAggregator::new(HintsConfig {
            pathfind_resolution: 1.0,
            ..HintsConfig::default()
        });
        hints.set_pathfind_map_bounds(ShapeBounds::square(Vec2::ZERO, 2.0));
        let rows = ["#...", "....", "....", "...#"];
        let bitmap = Bitmap::from_rows(&rows).expect("square rows");
        hints.set_pathfind_map_obstacles(Some(ObstacleRegion::full(bitmap)));
        assert!(hints.pathfind_map().is_none(), "grid is built lazily");

        let blocked = hints.init_pathfind_map().blocked_count();
        assert_eq!(blocked, 2);
        assert!(hints.pathfind_map().is_some());

        hints.set_pathfind_map_obstacles(None);
        assert!(hints.pathfind_map().is_none(), "grid was invalidated");
        assert_eq!(hints.init_pathfind_map().blocked_count(), 0);
    }

    #[test]
    fn clamp_uses_installed_bounds() {
        let mut hints = HintAggregator::default();
        hints.set_pathfind_map_bounds(ShapeBounds::circle(Vec2::new(10.0, 0.0), 5.0));
        let clamped = hints.clamp_to_bounds(Vec2::new(30.0, 0.0));
        assert!((clamped - Vec2::new(15.0, 0.0)).length() < 1e-4);
        assert_eq!(hints.pathfind_map_center(), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn interaction_picks_first_targetable_actor_with_oid() {
        let mut hidden = ActorSnapshot::hostile(ActorId::new(1), 42, Vec2::ZERO, 1.0);
        hidden.targetable = false;
        let visible = ActorSnapshot::hostile(ActorId::new(2), 42, Vec2::ONE, 1.0);
        let other = ActorSnapshot::hostile(ActorId::new(3), 7, Vec2::ONE, 1.0);
        let view = arena_ai_core::ActorView::from_snapshots(vec![other, visible, hidden]);

        let mut hints = HintAggregator::default();
        hints.interact_with_oid(&view, 42);
        assert_eq!(hints.interact_with_target(), Some(ActorId::new(2)));
        hints.interact_with_oid(&view, 99);
        assert_eq!(hints.interact_with_target(), None);
    }
}
