//! Flat-vector observation
//!
//! `[robotX, robotY, t0X, t0Y, .., t(n-1)X, t(n-1)Y, time_left]` — rescued
//! or unplaced targets report the `(-1, -1)` sentinel so the vector length
//! never changes within a configuration.

use serde::{Deserialize, Serialize};

use super::ObservationBuilder;
use crate::engine::snapshot::EpisodeSnapshot;

/// Coordinate reported for rescued or unplaced targets.
pub const SENTINEL: f32 = -1.0;

// ============================================================================
// VectorObservation
// ============================================================================

/// Fixed-length numeric observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorObservation {
    pub values: Vec<f32>,
}

impl VectorObservation {
    /// Vector length for a given target count: robot pair, one pair per
    /// target, one clock slot.
    pub const fn len_for(human_count: usize) -> usize {
        2 + 2 * human_count + 1
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ============================================================================
// VectorBuilder
// ============================================================================

/// Builder for [`VectorObservation`].
#[derive(Debug, Clone)]
pub struct VectorBuilder {
    human_count: usize,
}

impl VectorBuilder {
    pub fn new(human_count: usize) -> Self {
        Self { human_count }
    }
}

impl ObservationBuilder for VectorBuilder {
    type Output = VectorObservation;

    fn build(&mut self, snapshot: &EpisodeSnapshot) -> VectorObservation {
        let mut values = Vec::with_capacity(VectorObservation::len_for(self.human_count));
        values.push(snapshot.robot_pos.x as f32);
        values.push(snapshot.robot_pos.y as f32);

        for i in 0..self.human_count {
            let visible = snapshot
                .targets
                .get(i)
                .filter(|t| t.is_active())
                .and_then(|t| t.pos);
            match visible {
                Some(pos) => {
                    values.push(pos.x as f32);
                    values.push(pos.y as f32);
                }
                None => {
                    values.push(SENTINEL);
                    values.push(SENTINEL);
                }
            }
        }

        values.push(snapshot.time_left);
        VectorObservation { values }
    }
}

// ============================================================================
// Tests
// ============================================================================
