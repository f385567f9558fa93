#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Arena AI decision engine.
//!
//! This crate defines the value types that connect the world-state
//! collaborator, the per-tick hint snapshot, and the pure systems that read
//! it. The world hands in an [`ActorView`] once per tick, producers contribute
//! hazards and goals expressed with [`Angle`], [`Timestamp`] and
//! [`PlayerMask`] values, and consumers read everything back after the
//! snapshot has been normalized. Positions are `glam::Vec2` where `x` is the
//! world X axis and `y` is the world Z axis.

use std::{
    f32::consts::PI,
    ops::{Add, Neg, Sub},
    time::Duration,
};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Rotation or direction expressed in radians.
///
/// An angle of zero faces world +Z; positive angles turn towards world +X.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Angle(f32);

impl Angle {
    /// Quarter turn.
    pub const HALF_PI: Self = Self(PI / 2.0);

    /// Half turn.
    pub const PI: Self = Self(PI);

    /// Creates an angle from radians.
    #[must_use]
    pub const fn from_radians(radians: f32) -> Self {
        Self(radians)
    }

    /// Creates an angle from degrees.
    #[must_use]
    pub fn from_degrees(degrees: f32) -> Self {
        Self(degrees.to_radians())
    }

    /// Derives the angle that [`Angle::to_direction`] would map onto `direction`.
    #[must_use]
    pub fn from_direction(direction: Vec2) -> Self {
        Self(direction.x.atan2(direction.y))
    }

    /// Value in radians.
    #[must_use]
    pub const fn radians(self) -> f32 {
        self.0
    }

    /// Value in degrees.
    #[must_use]
    pub fn degrees(self) -> f32 {
        self.0.to_degrees()
    }

    /// Unit vector pointing along the angle.
    #[must_use]
    pub fn to_direction(self) -> Vec2 {
        let (sin, cos) = self.0.sin_cos();
        Vec2::new(sin, cos)
    }

    /// Cosine of the angle.
    #[must_use]
    pub fn cos(self) -> f32 {
        self.0.cos()
    }

    /// Tangent of the angle.
    #[must_use]
    pub fn tan(self) -> f32 {
        self.0.tan()
    }

    /// Absolute value of the angle.
    #[must_use]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Wraps the angle into `[-PI, PI)`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self((self.0 + PI).rem_euclid(2.0 * PI) - PI)
    }
}

impl Add for Angle {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Angle {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

/// Rotates a direction a quarter turn to the left.
#[must_use]
pub fn ortho_left(direction: Vec2) -> Vec2 {
    Vec2::new(direction.y, -direction.x)
}

/// Rotates a direction a quarter turn to the right.
#[must_use]
pub fn ortho_right(direction: Vec2) -> Vec2 {
    Vec2::new(-direction.y, direction.x)
}

/// Simulation timestamp measured from the start of the encounter.
///
/// The default value means "now": hints without an explicit activation time
/// sort ahead of every scheduled one.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(Duration);

impl Timestamp {
    /// Creates a timestamp from the elapsed simulation duration.
    #[must_use]
    pub const fn new(elapsed: Duration) -> Self {
        Self(elapsed)
    }

    /// Creates a timestamp from fractional seconds.
    ///
    /// Negative or NaN input maps to zero; values past [`Duration::MAX`],
    /// including positive infinity, saturate.
    #[must_use]
    pub fn from_secs_f32(seconds: f32) -> Self {
        if !(seconds > 0.0) {
            return Self(Duration::ZERO);
        }
        let elapsed = Duration::try_from_secs_f32(seconds);
        Self(elapsed.unwrap_or(Duration::MAX))
    }

    /// Elapsed simulation duration.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.0
    }

    /// Elapsed simulation time in fractional seconds.
    #[must_use]
    pub fn as_secs_f32(&self) -> f32 {
        self.0.as_secs_f32()
    }
}

/// Unique identifier assigned to an actor by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Stable per-actor spawn slot used for constant-time registry lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpawnSlot(u32);

impl SpawnSlot {
    /// Creates a new spawn slot.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric slot index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Slot index usable for slice access.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

/// Identifier of an action an agent may execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(u32);

impl ActionId {
    /// Creates a new action identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable per-tick copy of a single actor's state supplied by the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Unique identifier assigned to the actor.
    pub id: ActorId,
    /// Object type identifier shared by every actor of the same kind.
    pub oid: u32,
    /// Spawn slot of the actor, if it has one.
    pub spawn_slot: Option<SpawnSlot>,
    /// Current world position.
    pub position: Vec2,
    /// Current facing.
    pub rotation: Angle,
    /// Collision radius folded into effective shape ranges.
    pub hitbox_radius: f32,
    /// Whether the actor can be targeted at all.
    pub targetable: bool,
    /// Whether the actor is hostile to the agent's party.
    pub hostile: bool,
    /// Whether the actor is engaged in combat with the agent's party.
    pub in_combat: bool,
    /// Whether the actor has died.
    pub dead: bool,
}

impl ActorSnapshot {
    /// Creates a targetable, hostile, living actor engaged in combat.
    #[must_use]
    pub fn hostile(id: ActorId, oid: u32, position: Vec2, hitbox_radius: f32) -> Self {
        Self {
            id,
            oid,
            spawn_slot: None,
            position,
            rotation: Angle::default(),
            hitbox_radius,
            targetable: true,
            hostile: true,
            in_combat: true,
            dead: false,
        }
    }

    /// Returns a copy assigned to the provided spawn slot.
    #[must_use]
    pub fn with_spawn_slot(mut self, slot: SpawnSlot) -> Self {
        self.spawn_slot = Some(slot);
        self
    }

    /// Returns a copy facing the provided rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Angle) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Read-only snapshot describing every actor the world currently tracks.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured actor snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Finds the snapshot captured for the provided actor.
    #[must_use]
    pub fn find(&self, id: ActorId) -> Option<&ActorSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of captured actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Relative position an agent must occupy around a target to gain a bonus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Positional {
    /// No positional requirement.
    #[default]
    Any,
    /// Beside the target.
    Flank,
    /// Behind the target.
    Rear,
    /// In front of the target.
    Front,
}

/// Special movement, targeting, or action restriction that becomes active at a known time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialMode {
    /// No restriction.
    #[default]
    Normal,
    /// No movement, actions, or casting allowed at activation time.
    Pyretic,
    /// No movement allowed.
    NoMovement,
    /// Agent should be moving at activation time.
    Freezing,
    /// Movement direction is perturbed once the activation time has passed.
    Misdirection,
}

/// Set of party members addressed by raid slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMask(u64);

impl PlayerMask {
    /// Number of addressable slots.
    pub const CAPACITY: usize = 64;

    /// Creates a mask from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Creates a mask containing a single slot; slots past capacity yield an empty mask.
    #[must_use]
    pub fn single(slot: usize) -> Self {
        let mut mask = Self::default();
        mask.set(slot);
        mask
    }

    /// Raw bits of the mask.
    #[must_use]
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// Adds a slot to the mask. Slots past capacity are ignored.
    pub fn set(&mut self, slot: usize) {
        if slot < Self::CAPACITY {
            self.0 |= 1 << slot;
        }
    }

    /// Reports whether the slot is part of the mask.
    #[must_use]
    pub fn contains(&self, slot: usize) -> bool {
        slot < Self::CAPACITY && self.0 & (1 << slot) != 0
    }

    /// Reports whether any slot is set.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.0 != 0
    }

    /// Number of slots set.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Iterates over the set slots in ascending order.
    pub fn slots(&self) -> impl Iterator<Item = usize> {
        let bits = self.0;
        (0..Self::CAPACITY).filter(move |slot| bits & (1 << slot) != 0)
    }
}

/// Triangle produced by clipping and triangulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    /// First vertex.
    pub a: Vec2,
    /// Second vertex.
    pub b: Vec2,
    /// Third vertex.
    pub c: Vec2,
}

impl Triangle {
    /// Creates a triangle from its vertices.
    #[must_use]
    pub const fn new(a: Vec2, b: Vec2, c: Vec2) -> Self {
        Self { a, b, c }
    }

    /// Unsigned area of the triangle.
    #[must_use]
    pub fn area(&self) -> f32 {
        (self.b - self.a).perp_dot(self.c - self.a).abs() * 0.5
    }
}

/// Point-in-shape predicates shared by the bounds, the hint snapshot and the goal library.
pub mod shape {
    use glam::Vec2;

    use super::{ortho_left, Angle};

    /// Reports whether `point` lies within `radius` of `origin`.
    #[must_use]
    pub fn in_circle(point: Vec2, origin: Vec2, radius: f32) -> bool {
        (point - origin).length_squared() <= radius * radius
    }

    /// Reports whether `point` lies within the angular sector around `direction`.
    ///
    /// The origin itself is considered part of every cone.
    #[must_use]
    pub fn in_cone(point: Vec2, origin: Vec2, direction: Vec2, half_angle: Angle) -> bool {
        let offset = point - origin;
        let length = offset.length();
        if length <= f32::EPSILON {
            return true;
        }
        offset.dot(direction) >= length * half_angle.cos()
    }

    /// Reports whether `point` lies within the circular sector of `radius` around `direction`.
    #[must_use]
    pub fn in_circle_cone(
        point: Vec2,
        origin: Vec2,
        radius: f32,
        direction: Vec2,
        half_angle: Angle,
    ) -> bool {
        in_circle(point, origin, radius) && in_cone(point, origin, direction, half_angle)
    }

    /// Reports whether `point` lies within the rectangle extending from `origin` along `direction`.
    #[must_use]
    pub fn in_rect(
        point: Vec2,
        origin: Vec2,
        direction: Vec2,
        len_front: f32,
        len_back: f32,
        half_width: f32,
    ) -> bool {
        let offset = point - origin;
        let front = offset.dot(direction);
        let side = offset.dot(ortho_left(direction)).abs();
        front <= len_front && front >= -len_back && side <= half_width
    }

    /// Reports whether `point` lies within the axis-aligned square of `half_side` around `center`.
    #[must_use]
    pub fn in_square(point: Vec2, center: Vec2, half_side: f32) -> bool {
        let offset = (point - center).abs();
        offset.x <= half_side && offset.y <= half_side
    }

    /// Ray-casting point-in-polygon test; works for any simple polygon in either winding.
    #[must_use]
    pub fn in_polygon(point: Vec2, vertices: &[Vec2]) -> bool {
        let Some(&last) = vertices.last() else {
            return false;
        };

        let mut inside = false;
        let mut previous = last;
        for &current in vertices {
            if (current.y > point.y) != (previous.y > point.y) {
                let crossing = (previous.x - current.x) * (point.y - current.y)
                    / (previous.y - current.y)
                    + current.x;
                if point.x < crossing {
                    inside = !inside;
                }
            }
            previous = current;
        }
        inside
    }
}
