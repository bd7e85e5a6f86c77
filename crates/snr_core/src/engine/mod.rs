//! Simulation engine
//!
//! Everything that mutates during an episode lives under this module, owned
//! exclusively by the [`episode::EpisodeController`]. The tile map itself is
//! shared read-only.

pub mod actions;
pub mod clock;
pub mod entities;
pub mod episode;
pub mod events;
pub mod reward;
pub mod snapshot;
pub mod visibility;

pub use actions::MoveAction;
pub use clock::EpisodeClock;
pub use entities::{RobotState, TargetEntity};
pub use episode::{EpisodeController, EpisodePhase};
pub use events::{StepEvents, TargetContact};
pub use reward::{
    EpisodeStats, RewardFunction, RewardKind, ShapedRescueReward, SparseRescueReward,
    TerminationReason,
};
pub use snapshot::{EpisodeSnapshot, TargetSnap};
pub use visibility::proximity;
