//! Discrete movement actions
//!
//! The agent's action space: four one-tile moves. The index mapping
//! (0 up, 1 right, 2 down, 3 left) is part of the external contract and
//! what trained policies emit.

use serde::{Deserialize, Serialize};

use crate::error::EnvError;

/// One-tile movement command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveAction {
    Up,
    Right,
    Down,
    Left,
}

impl MoveAction {
    /// Size of the discrete action space.
    pub const COUNT: usize = 4;

    /// All actions in index order.
    pub const ALL: [MoveAction; 4] = [
        MoveAction::Up,
        MoveAction::Right,
        MoveAction::Down,
        MoveAction::Left,
    ];

    /// Decode a discrete action index, rejecting anything outside `0..4`.
    pub fn from_index(index: u8) -> Result<Self, EnvError> {
        match index {
            0 => Ok(MoveAction::Up),
            1 => Ok(MoveAction::Right),
            2 => Ok(MoveAction::Down),
            3 => Ok(MoveAction::Left),
            other => Err(EnvError::InvalidAction(other)),
        }
    }

    pub fn index(self) -> u8 {
        match self {
            MoveAction::Up => 0,
            MoveAction::Right => 1,
            MoveAction::Down => 2,
            MoveAction::Left => 3,
        }
    }

    /// Displacement in map units for a given tile size.
    pub fn displacement(self, tile_size: u32) -> (i32, i32) {
        let ts = tile_size as i32;
        match self {
            MoveAction::Up => (0, -ts),
            MoveAction::Right => (ts, 0),
            MoveAction::Down => (0, ts),
            MoveAction::Left => (-ts, 0),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
