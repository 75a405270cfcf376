//! Finish detection and rank assignment.

use serde::{Deserialize, Serialize};

use crate::geometry::Point2D;
use crate::marble::{FinishRank, Marble, MarbleId};
use crate::physics::PhysicsBackend;

/// Predicate deciding when a marble has left the play field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FinishBoundary {
    /// Finished once the marble is below `y`.
    Floor { y: f32 },
    /// Finished once the marble leaves `[min_x, max_x]` or drops below `max_y`.
    Bounds { min_x: f32, max_x: f32, max_y: f32 },
}

impl FinishBoundary {
    pub fn is_crossed(&self, p: Point2D) -> bool {
        match *self {
            Self::Floor { y } => p.y > y,
            Self::Bounds {
                min_x,
                max_x,
                max_y,
            } => p.x < min_x || p.x > max_x || p.y > max_y,
        }
    }

    pub fn is_finite(&self) -> bool {
        match *self {
            Self::Floor { y } => y.is_finite(),
            Self::Bounds {
                min_x,
                max_x,
                max_y,
            } => min_x.is_finite() && max_x.is_finite() && max_y.is_finite(),
        }
    }
}

/// Assigns finish ranks in arrival order.
///
/// Ranks start at 1 and increase by one per finished marble. Within a tick,
/// marbles are examined in ascending id order, so simultaneous crossings are
/// ranked by id.
#[derive(Debug, Clone)]
pub struct FinishDetector {
    boundary: FinishBoundary,
    next_rank: FinishRank,
}

impl FinishDetector {
    pub fn new(boundary: FinishBoundary) -> Self {
        Self {
            boundary,
            next_rank: 1,
        }
    }

    pub fn boundary(&self) -> FinishBoundary {
        self.boundary
    }

    /// Number of ranks handed out so far.
    pub fn finished_count(&self) -> u32 {
        self.next_rank - 1
    }

    /// Starts numbering from 1 again.
    pub fn reset(&mut self) {
        self.next_rank = 1;
    }

    /// Refreshes positions of active marbles and finishes those past the boundary.
    ///
    /// Finished bodies are removed from `backend` and their ids appended to
    /// `finish_order`. Returns the ids finished during this call.
    ///
    /// `marbles` must be sorted by ascending id.
    pub fn detect<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        marbles: &mut [Marble],
        finish_order: &mut Vec<MarbleId>,
    ) -> Vec<MarbleId> {
        debug_assert!(marbles.windows(2).all(|w| w[0].id < w[1].id));

        let mut newly_finished = Vec::new();

        for marble in marbles.iter_mut().filter(|m| m.is_active()) {
            let Some(body) = marble.body else {
                continue;
            };
            let Some(position) = backend.get_position(body) else {
                continue;
            };
            marble.position = position;

            if !self.boundary.is_crossed(position) {
                continue;
            }

            let rank = self.next_rank;
            self.next_rank += 1;
            backend.remove_body(body);
            marble.finish(rank);
            finish_order.push(marble.id);
            newly_finished.push(marble.id);

            tracing::debug!(
                "[finish] marble {} ({}) finished at rank {}",
                marble.id,
                marble.color_name,
                rank
            );
        }

        newly_finished
    }
}
