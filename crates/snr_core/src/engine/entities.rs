//! Robot and target entities
//!
//! Targets are placed once per episode by drawing without replacement from a
//! shrinking copy of the traversable pool, using the injected episode RNG so
//! a fixed seed reproduces the layout exactly. When the pool is smaller than
//! the requested count, later targets stay unplaced and the episode simply
//! cannot reach a full clear.

use log::debug;
use rand::Rng;

use crate::map::GridPos;

// ============================================================================
// RobotState
// ============================================================================

/// The agent's mutable position, always tile-aligned.
#[derive(Debug, Clone, Copy)]
pub struct RobotState {
    pub pos: GridPos,
}

impl RobotState {
    pub fn new(pos: GridPos) -> Self {
        Self { pos }
    }
}

// ============================================================================
// TargetEntity
// ============================================================================

/// One hidden human target.
///
/// `spotted` and `rescued` are monotonic within an episode: once set they
/// stay set until the next reset.
#[derive(Debug, Clone, Copy)]
pub struct TargetEntity {
    /// Identity index in `0..human_count`
    pub index: usize,
    /// Assigned tile, `None` when the pool ran out
    pub pos: Option<GridPos>,
    /// First visibility contact happened
    pub spotted: bool,
    /// Robot reached this target
    pub rescued: bool,
}

impl TargetEntity {
    fn unplaced(index: usize) -> Self {
        Self {
            index,
            pos: None,
            spotted: false,
            rescued: false,
        }
    }

    /// Placed and still waiting for rescue.
    pub fn is_active(&self) -> bool {
        self.pos.is_some() && !self.rescued
    }
}

/// Draw `count` distinct positions from `pool` without replacement.
///
/// The pool copy shrinks as positions are taken, so placements are pairwise
/// distinct. Exhaustion degrades gracefully: remaining targets come back
/// unplaced.
pub fn place_targets<R: Rng>(pool: &[GridPos], count: usize, rng: &mut R) -> Vec<TargetEntity> {
    let mut available = pool.to_vec();
    let mut targets = Vec::with_capacity(count);

    for index in 0..count {
        if available.is_empty() {
            debug!("placement pool exhausted, target {} left unplaced", index);
            targets.push(TargetEntity::unplaced(index));
            continue;
        }
        let pick = rng.gen_range(0..available.len());
        let pos = available.remove(pick);
        targets.push(TargetEntity {
            index,
            pos: Some(pos),
            spotted: false,
            rescued: false,
        });
    }

    targets
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pool(n: i32) -> Vec<GridPos> {
        (0..n).map(|i| GridPos::new(i * 20, 0)).collect()
    }

    #[test]
    fn test_placements_are_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let targets = place_targets(&pool(10), 3, &mut rng);

        let positions: Vec<_> = targets.iter().filter_map(|t| t.pos).collect();
        assert_eq!(positions.len(), 3);
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(42);
        let mut rng_b = ChaCha8Rng::seed_from_u64(42);
        let a = place_targets(&pool(50), 3, &mut rng_a);
        let b = place_targets(&pool(50), 3, &mut rng_b);

        for (ta, tb) in a.iter().zip(&b) {
            assert_eq!(ta.pos, tb.pos);
        }
    }

    #[test]
    fn test_exhausted_pool_leaves_targets_unplaced() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let targets = place_targets(&pool(2), 3, &mut rng);

        assert_eq!(targets.len(), 3);
        assert!(targets[0].pos.is_some());
        assert!(targets[1].pos.is_some());
        assert!(targets[2].pos.is_none());
        assert!(!targets[2].is_active());
    }

    #[test]
    fn test_indices_follow_draw_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let targets = place_targets(&pool(10), 3, &mut rng);
        for (i, t) in targets.iter().enumerate() {
            assert_eq!(t.index, i);
        }
    }
}
