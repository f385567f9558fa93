//! Runs one decision tick over a scenario and summarises the resulting snapshot.

use std::fmt;

use anyhow::{anyhow, Context, Result};
use arena_ai_core::{ActorId, ActorView, SpecialMode, Timestamp};
use arena_ai_hints::{Enemy, HintAggregator};
use arena_ai_system_goals::{
    aoe_circle, combined, proximity, single_target_actor, single_target_positional_actor,
};
use arena_ai_system_targeting::Targeting;
use glam::Vec2;
use serde::Serialize;
use tracing::{debug, info};

use crate::scenario::{GoalSpec, Scenario};

/// Hitbox radius assumed for the agent the tick is computed for.
const AGENT_HITBOX_RADIUS: f32 = 0.5;

/// Outcome of a tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct Summary {
    /// Highest priority among potential targets, never below zero.
    pub highest_priority: i32,
    /// Actors sharing the highest priority, in registration order.
    pub priority_targets: Vec<u64>,
    /// Actors area actions must not hit.
    pub forbidden_targets: Vec<u64>,
    /// Number of forbidden zones.
    pub forbidden_zones: usize,
    /// Earliest special mode proposed this tick.
    pub imminent_special_mode: Option<SpecialMode>,
    /// Pathfind grid statistics.
    pub grid: GridSummary,
    /// Best scoring reachable cell outside every forbidden zone.
    pub best_cell: Option<BestCell>,
}

/// Pathfind grid statistics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub(crate) struct GridSummary {
    /// Columns.
    pub width: usize,
    /// Rows.
    pub height: usize,
    /// Cells that cannot be entered.
    pub blocked: usize,
}

/// Cell chosen by goal scoring.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub(crate) struct BestCell {
    /// Grid column.
    pub x: usize,
    /// Grid row.
    pub y: usize,
    /// World position of the cell center.
    pub position: [f32; 2],
    /// Summed goal value at the cell center.
    pub score: f32,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "highest priority: {}", self.highest_priority)?;
        writeln!(f, "priority targets: {:?}", self.priority_targets)?;
        writeln!(f, "forbidden targets: {:?}", self.forbidden_targets)?;
        writeln!(f, "forbidden zones: {}", self.forbidden_zones)?;
        if let Some(mode) = self.imminent_special_mode {
            writeln!(f, "imminent special mode: {mode:?}")?;
        }
        writeln!(
            f,
            "grid: {}x{} ({} blocked)",
            self.grid.width, self.grid.height, self.grid.blocked
        )?;
        match self.best_cell {
            Some(cell) => write!(
                f,
                "best cell: ({}, {}) at [{:.2}, {:.2}] scoring {:.2}",
                cell.x, cell.y, cell.position[0], cell.position[1], cell.score
            ),
            None => write!(f, "best cell: none"),
        }
    }
}

/// Rebuilds the snapshot from the scenario and scores the pathfind grid.
pub(crate) fn run(scenario: &Scenario, hints: &mut HintAggregator) -> Result<Summary> {
    hints.clear();
    hints.set_pathfind_map_bounds(
        scenario
            .bounds
            .build()
            .context("scenario bounds are invalid")?,
    );
    hints.set_pathfind_map_obstacles(
        scenario
            .obstacle_region()
            .context("scenario obstacles are invalid")?,
    );

    let actors = scenario.actor_view();
    Targeting::new().handle(&actors, hints);

    for raise in &scenario.priorities {
        hints.prioritize_targets_by_oid(raise.oid, raise.priority);
    }
    for hazard in &scenario.hazards {
        hints.add_forbidden_zone_shape(
            &hazard.shape,
            Vec2::from(hazard.origin),
            hazard.rotation(),
            hazard.activation(),
        );
    }
    for proposal in &scenario.special_modes {
        let activation = Timestamp::from_secs_f32(proposal.activation);
        hints.add_special_mode(proposal.mode, activation);
    }
    hints.normalize();

    for goal in &scenario.goals {
        add_goal(hints, &actors, goal)?;
    }
    debug!(goals = hints.goal_zones().len(), "installed goals");

    let _ = hints.init_pathfind_map();
    let summary = summarize(hints);
    info!(
        priority_targets = summary.priority_targets.len(),
        blocked = summary.grid.blocked,
        found = summary.best_cell.is_some(),
        "tick complete"
    );
    Ok(summary)
}

fn add_goal(hints: &mut HintAggregator, actors: &ActorView, goal: &GoalSpec) -> Result<()> {
    let find = |id: u64| {
        actors
            .find(ActorId::new(id))
            .ok_or_else(|| anyhow!("goal references unknown actor {id}"))
    };
    let function = match *goal {
        GoalSpec::SingleTarget {
            target,
            range,
            positional,
        } => {
            let target = find(target)?;
            single_target_positional_actor(target, AGENT_HITBOX_RADIUS, positional, range)
        }
        GoalSpec::AoeCircle {
            target,
            range,
            radius,
            min_targets,
        } => combined(
            single_target_actor(find(target)?, AGENT_HITBOX_RADIUS, range, 1.0),
            aoe_circle(hints, radius),
            min_targets,
        ),
        GoalSpec::Proximity {
            destination,
            max_distance,
            max_weight,
        } => proximity(Vec2::from(destination), max_distance, max_weight),
    };
    hints.add_goal_zone(function);
    Ok(())
}

fn summarize(hints: &HintAggregator) -> Summary {
    let ids = |enemies: &[Enemy]| -> Vec<u64> {
        enemies.iter().map(|enemy| enemy.actor.id.get()).collect()
    };
    let (grid, best_cell) = match hints.pathfind_map() {
        Some(map) => {
            let grid = GridSummary {
                width: map.width(),
                height: map.height(),
                blocked: map.blocked_count(),
            };
            let mut best: Option<BestCell> = None;
            for y in 0..map.height() {
                for x in 0..map.width() {
                    if map.is_blocked(x, y) {
                        continue;
                    }
                    let position = map.cell_center(x, y);
                    let unsafe_cell = hints
                        .forbidden_zones()
                        .iter()
                        .any(|zone| (zone.distance)(position) <= 0.0);
                    if unsafe_cell {
                        continue;
                    }
                    let score = hints.goal_value(position);
                    if best.map_or(true, |current| score > current.score) {
                        best = Some(BestCell {
                            x,
                            y,
                            position: position.to_array(),
                            score,
                        });
                    }
                }
            }
            (grid, best)
        }
        None => (
            GridSummary {
                width: 0,
                height: 0,
                blocked: 0,
            },
            None,
        ),
    };

    Summary {
        highest_priority: hints.highest_potential_target_priority(),
        priority_targets: ids(hints.priority_targets()),
        forbidden_targets: ids(hints.forbidden_targets()),
        forbidden_zones: hints.forbidden_zones().len(),
        imminent_special_mode: hints.imminent_special_mode().map(|imminent| imminent.mode),
        grid,
        best_cell,
    }
}
