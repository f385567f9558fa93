//! TOML description of a single decision tick.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use arena_ai_bounds::{AoeShape, Bitmap, BoundsError, ObstacleRegion, ShapeBounds};
use arena_ai_core::{
    ActorId, ActorSnapshot, ActorView, Angle, Positional, SpawnSlot, SpecialMode, Timestamp,
};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

/// Everything the world and the mechanic producers contribute to one tick.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    /// Playable region.
    pub bounds: BoundsSpec,
    /// Obstacle bitmap rows aligned with the pathfind grid; `#` blocks a cell.
    #[serde(default)]
    pub obstacles: Vec<String>,
    /// Actors reported by the world.
    #[serde(default)]
    pub actors: Vec<ActorSpec>,
    /// Priority raises applied by mechanic producers.
    #[serde(default)]
    pub priorities: Vec<PrioritySpec>,
    /// Hazards to avoid.
    #[serde(default)]
    pub hazards: Vec<HazardSpec>,
    /// Special modes proposed by mechanic producers.
    #[serde(default)]
    pub special_modes: Vec<SpecialModeSpec>,
    /// Goals to score positions with.
    #[serde(default)]
    pub goals: Vec<GoalSpec>,
}

impl Scenario {
    /// Reads a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("failed to parse scenario at {}", path.display()))
    }

    /// Parses scenario TOML text.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid scenario toml")
    }

    /// Replaces the scenario's actors with a deterministic random crowd inside the bound.
    pub(crate) fn randomize_actors(&mut self, count: usize, seed: u64) -> Result<()> {
        let bounds = self.bounds.build().context("scenario bounds are invalid")?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let extent = if bounds.half_size() > 0.0 {
            bounds.half_size()
        } else {
            0.0
        };
        self.actors = (0..count)
            .map(|index| {
                let offset = Vec2::new(
                    rng.gen_range(-extent..=extent),
                    rng.gen_range(-extent..=extent),
                );
                let position = bounds.clamp_position(bounds.center() + offset);
                let id = u64::try_from(index).unwrap_or(u64::MAX);
                ActorSpec {
                    id,
                    oid: rng.gen_range(1..=3),
                    slot: u32::try_from(index).ok(),
                    position: position.to_array(),
                    rotation_degrees: rng.gen_range(-180.0..180.0),
                    hitbox: rng.gen_range(0.5..2.0),
                    targetable: true,
                    hostile: true,
                    in_combat: rng.gen_bool(0.8),
                    dead: false,
                }
            })
            .collect();
        Ok(())
    }

    /// World view built from the scenario's actors.
    pub(crate) fn actor_view(&self) -> ActorView {
        ActorView::from_snapshots(self.actors.iter().map(ActorSpec::snapshot).collect())
    }

    /// Obstacle region built from the bitmap rows, if any.
    pub(crate) fn obstacle_region(&self) -> Result<Option<ObstacleRegion>, BoundsError> {
        if self.obstacles.is_empty() {
            return Ok(None);
        }
        Bitmap::from_rows(&self.obstacles)
            .map(|bitmap| Some(ObstacleRegion::full(bitmap)))
    }
}

/// Playable region variants.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub(crate) enum BoundsSpec {
    /// Disc.
    Circle {
        /// Center of the disc.
        center: [f32; 2],
        /// Radius of the disc.
        radius: f32,
    },
    /// Axis-aligned square.
    Square {
        /// Center of the square.
        center: [f32; 2],
        /// Half of the side length.
        half_side: f32,
    },
    /// Rotated rectangle.
    Rect {
        /// Center of the rectangle.
        center: [f32; 2],
        /// Half extent along the local X axis.
        half_width: f32,
        /// Half extent along the local Z axis.
        half_height: f32,
        /// Facing of the local Z axis in degrees.
        #[serde(default)]
        rotation_degrees: f32,
    },
    /// Simple polygon.
    Polygon {
        /// Ordered vertices.
        vertices: Vec<[f32; 2]>,
    },
}

impl BoundsSpec {
    /// Builds the bound.
    pub(crate) fn build(&self) -> Result<ShapeBounds, BoundsError> {
        Ok(match self {
            Self::Circle { center, radius } => ShapeBounds::circle(Vec2::from(*center), *radius),
            Self::Square { center, half_side } => {
                ShapeBounds::square(Vec2::from(*center), *half_side)
            }
            Self::Rect {
                center,
                half_width,
                half_height,
                rotation_degrees,
            } => ShapeBounds::rect(
                Vec2::from(*center),
                *half_width,
                *half_height,
                Angle::from_degrees(*rotation_degrees),
            ),
            Self::Polygon { vertices } => {
                ShapeBounds::polygon(vertices.iter().copied().map(Vec2::from).collect())?
            }
        })
    }
}

fn default_true() -> bool {
    true
}

fn default_hitbox() -> f32 {
    0.5
}

/// Actor reported by the world.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ActorSpec {
    /// Unique actor identifier.
    pub id: u64,
    /// Object type identifier.
    pub oid: u32,
    /// Spawn slot used for registry lookups.
    #[serde(default)]
    pub slot: Option<u32>,
    /// World position.
    pub position: [f32; 2],
    /// Facing in degrees.
    #[serde(default)]
    pub rotation_degrees: f32,
    /// Hitbox radius.
    #[serde(default = "default_hitbox")]
    pub hitbox: f32,
    /// Whether the actor can be targeted.
    #[serde(default = "default_true")]
    pub targetable: bool,
    /// Whether the actor is hostile.
    #[serde(default = "default_true")]
    pub hostile: bool,
    /// Whether the actor fights the party.
    #[serde(default = "default_true")]
    pub in_combat: bool,
    /// Whether the actor is dead.
    #[serde(default)]
    pub dead: bool,
}

impl ActorSpec {
    fn snapshot(&self) -> ActorSnapshot {
        let id = ActorId::new(self.id);
        let position = Vec2::from(self.position);
        let mut snapshot = ActorSnapshot::hostile(id, self.oid, position, self.hitbox);
        snapshot.rotation = Angle::from_degrees(self.rotation_degrees);
        snapshot.spawn_slot = self.slot.map(SpawnSlot::new);
        snapshot.targetable = self.targetable;
        snapshot.hostile = self.hostile;
        snapshot.in_combat = self.in_combat;
        snapshot.dead = self.dead;
        snapshot
    }
}

/// Priority raise for every actor of an object type.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PrioritySpec {
    /// Object type to raise.
    pub oid: u32,
    /// Minimum priority.
    pub priority: i32,
}

/// Hazard placed in the arena.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct HazardSpec {
    /// Shape of the hazard.
    pub shape: AoeShape,
    /// Shape origin.
    pub origin: [f32; 2],
    /// Shape facing in degrees.
    #[serde(default)]
    pub rotation_degrees: f32,
    /// Seconds until the hazard activates.
    #[serde(default)]
    pub activation: f32,
}

impl HazardSpec {
    /// Shape facing.
    pub(crate) fn rotation(&self) -> Angle {
        Angle::from_degrees(self.rotation_degrees)
    }

    /// Activation timestamp.
    pub(crate) fn activation(&self) -> Timestamp {
        Timestamp::from_secs_f32(self.activation)
    }
}

/// Special mode proposal.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SpecialModeSpec {
    /// Proposed mode.
    pub mode: SpecialMode,
    /// Seconds until the mode activates.
    #[serde(default)]
    pub activation: f32,
}

/// Goal contributed to the tick.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub(crate) enum GoalSpec {
    /// Single-target action against an actor, optionally from a positional.
    SingleTarget {
        /// Target actor.
        target: u64,
        /// Action range before hitboxes.
        range: f32,
        /// Requested positional.
        #[serde(default)]
        positional: Positional,
    },
    /// Circle centered on the agent, falling back to a single-target action on `target`.
    AoeCircle {
        /// Fallback single-target actor.
        target: u64,
        /// Fallback single-target range before hitboxes.
        range: f32,
        /// Circle radius.
        radius: f32,
        /// Minimum useful target count.
        min_targets: u32,
    },
    /// Linear pull towards a destination.
    Proximity {
        /// Destination.
        destination: [f32; 2],
        /// Distance at which the pull vanishes.
        max_distance: f32,
        /// Score at the destination.
        max_weight: f32,
    },
}

/// Small scenario shared by the adapter's tests.
#[cfg(test)]
pub(crate) fn sample() -> &'static str {
    r#"
        [bounds]
        kind = "circle"
        center = [0.0, 0.0]
        radius = 20.0

        [[actors]]
        id = 1
        oid = 100
        slot = 1
        position = [0.0, 5.0]

        [[actors]]
        id = 2
        oid = 100
        slot = 2
        position = [2.0, 5.0]

        [[actors]]
        id = 3
        oid = 200
        slot = 3
        position = [-10.0, -10.0]
        in_combat = false

        [[priorities]]
        oid = 100
        priority = 5

        [[hazards]]
        shape = { kind = "circle", radius = 3.0 }
        origin = [-5.0, 0.0]
        activation = 2.0

        [[special_modes]]
        mode = "freezing"
        activation = 4.0

        [[goals]]
        kind = "aoe_circle"
        target = 1
        range = 3.0
        radius = 5.0
        min_targets = 2
    "#
}

#[cfg(test)]
mod tests {
    use super::{sample, BoundsSpec, Scenario};
    use arena_ai_bounds::BoundsShape;

    #[test]
    fn sample_scenario_parses() {
        let scenario = Scenario::from_toml_str(sample()).expect("sample parses");
        assert_eq!(scenario.actors.len(), 3);
        assert_eq!(scenario.actor_view().len(), 3);
        assert!(matches!(scenario.bounds, BoundsSpec::Circle { .. }));
        assert!(scenario.obstacle_region().expect("no rows").is_none());
    }

    #[test]
    fn polygon_bounds_require_three_vertices() {
        let scenario = Scenario::from_toml_str(
            r#"
                [bounds]
                kind = "polygon"
                vertices = [[0.0, 0.0], [1.0, 0.0]]
            "#,
        )
        .expect("syntax is valid");
        assert!(scenario.bounds.build().is_err());
    }

    #[test]
    fn rect_bounds_use_degrees() {
        let scenario = Scenario::from_toml_str(
            r#"
                [bounds]
                kind = "rect"
                center = [1.0, 2.0]
                half_width = 3.0
                half_height = 4.0
                rotation_degrees = 90.0
            "#,
        )
        .expect("syntax is valid");
        let bounds = scenario.bounds.build().expect("valid rect");
        match bounds.shape() {
            BoundsShape::Rect { rotation, .. } => {
                assert!((rotation.degrees() - 90.0).abs() < 1e-4);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn random_crowd_is_deterministic_and_inside_bounds() {
        let mut first = Scenario::from_toml_str(sample()).expect("sample parses");
        let mut second = first.clone();
        first.randomize_actors(16, 7).expect("valid bounds");
        second.randomize_actors(16, 7).expect("valid bounds");

        let bounds = first.bounds.build().expect("valid bounds");
        assert_eq!(first.actors.len(), 16);
        for (a, b) in first.actors.iter().zip(&second.actors) {
            assert_eq!(a.position, b.position);
            let position = glam::Vec2::from(a.position);
            assert!(
                position.length() <= 20.0 + 1e-3,
                "actor {} at {position:?} escaped {bounds:?}",
                a.id
            );
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed = Scenario::from_toml_str(
            r#"
                colour = "red"

                [bounds]
                kind = "square"
                center = [0.0, 0.0]
                half_side = 5.0
            "#,
        );
        assert!(parsed.is_err());
    }
}
