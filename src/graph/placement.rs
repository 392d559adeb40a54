use eframe::egui::{Vec2, vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::PlacementConfig;
use crate::util::centroid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementBranch {
    /// A candidate cleared every existing node on the given attempt (1-based).
    Clear { attempts: usize },
    /// The attempt budget ran out; no distance guarantee.
    Fallback,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: Vec2,
    pub branch: PlacementBranch,
}

/// Rejection sampler for the initial position of a new wallet. Best effort
/// only: a full layout pass is what actually removes overlap.
pub struct PositionAllocator {
    rng: StdRng,
    config: PlacementConfig,
}

impl PositionAllocator {
    pub fn new(config: PlacementConfig) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            config,
        }
    }

    pub fn with_seed(config: PlacementConfig, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    fn jitter(&mut self, base: Vec2, spread: f32) -> Vec2 {
        let spread = spread.abs();
        base + vec2(
            self.rng.random_range(-spread..=spread),
            self.rng.random_range(-spread..=spread),
        )
    }

    fn sample_clear(
        &mut self,
        base: Vec2,
        existing: &[Vec2],
        min_distance: f32,
        max_attempts: usize,
        spread: f32,
    ) -> Option<Placement> {
        let mut candidate = base;
        for attempt in 1..=max_attempts {
            let clear = existing
                .iter()
                .all(|point| (*point - candidate).length() >= min_distance);
            if clear {
                return Some(Placement {
                    position: candidate,
                    branch: PlacementBranch::Clear { attempts: attempt },
                });
            }
            candidate = self.jitter(base, spread);
        }
        None
    }

    /// Samples around `base` until a candidate is at least `min_distance`
    /// from every point in `existing`, falling back to a wider jitter once
    /// `max_attempts` candidates have been rejected.
    pub fn place_near(
        &mut self,
        base: Vec2,
        existing: &[Vec2],
        min_distance: f32,
        max_attempts: usize,
    ) -> Placement {
        let spread = self.config.candidate_jitter;
        if let Some(placement) = self.sample_clear(base, existing, min_distance, max_attempts, spread)
        {
            return placement;
        }

        let fallback_spread = self.config.fallback_jitter;
        Placement {
            position: self.jitter(base, fallback_spread),
            branch: PlacementBranch::Fallback,
        }
    }

    pub fn generate_position(&mut self, existing: &[Vec2]) -> Placement {
        let anchor = vec2(self.config.anchor_x, self.config.anchor_y);
        let anchor_spread = self.config.anchor_jitter;
        let base = self.jitter(anchor, anchor_spread);
        let min_distance = self.config.min_distance();
        let max_attempts = self.config.max_attempts;
        self.place_near(base, existing, min_distance, max_attempts)
    }

    pub fn place_near_connections(&mut self, existing: &[Vec2], connecting: &[Vec2]) -> Placement {
        let Some(base) = centroid(connecting) else {
            return self.generate_position(existing);
        };

        let min_distance = self.config.connected_min_distance();
        let max_attempts = self.config.connected_max_attempts;
        let spread = self.config.connected_jitter;
        self.sample_clear(base, existing, min_distance, max_attempts, spread)
            .unwrap_or_else(|| self.generate_position(existing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocator(seed: u64) -> PositionAllocator {
        PositionAllocator::with_seed(PlacementConfig::default(), seed)
    }

    fn assert_clear_of(placement: Placement, existing: &[Vec2], min_distance: f32) {
        if let PlacementBranch::Clear { attempts } = placement.branch {
            assert!(attempts >= 1);
            for point in existing {
                assert!((*point - placement.position).length() >= min_distance);
            }
        }
    }

    #[test]
    fn empty_canvas_accepts_first_candidate() {
        let placement = allocator(1).generate_position(&[]);
        assert_eq!(placement.branch, PlacementBranch::Clear { attempts: 1 });
        assert!((placement.position.x - 500.0).abs() <= 100.0);
        assert!((placement.position.y - 300.0).abs() <= 100.0);
    }

    #[test]
    fn accepted_point_respects_min_distance() {
        let existing = [Vec2::ZERO];
        for seed in 0..32 {
            let placement = allocator(seed).place_near(Vec2::ZERO, &existing, 200.0, 50);
            match placement.branch {
                PlacementBranch::Clear { .. } => {
                    assert!(placement.position.length() >= 200.0);
                }
                PlacementBranch::Fallback => {
                    assert!(placement.position.x.abs() <= 300.0);
                    assert!(placement.position.y.abs() <= 300.0);
                }
            }
        }
    }

    #[test]
    fn impossible_distance_uses_fallback() {
        let existing = [Vec2::ZERO];
        let placement = allocator(7).place_near(Vec2::ZERO, &existing, 10_000.0, 50);
        assert_eq!(placement.branch, PlacementBranch::Fallback);
    }

    #[test]
    fn same_seed_same_positions() {
        let existing = [vec2(500.0, 300.0), vec2(620.0, 300.0)];
        let first = allocator(42).generate_position(&existing);
        let second = allocator(42).generate_position(&existing);
        assert_eq!(first, second);
    }

    #[test]
    fn connections_bias_toward_centroid() {
        let connecting = [vec2(2000.0, 2000.0), vec2(2200.0, 2000.0)];
        let existing = connecting.to_vec();
        let placement = allocator(3).place_near_connections(&existing, &connecting);
        assert_clear_of(placement, &existing, 144.0);
        // Exhausting the connected budget falls back to the canvas anchor.
        if placement.position.x > 1000.0 {
            let offset = placement.position - vec2(2100.0, 2000.0);
            assert!(offset.x.abs() <= 150.0 && offset.y.abs() <= 150.0);
        }
    }

    #[test]
    fn connections_empty_delegates_to_generate() {
        let placement = allocator(9).place_near_connections(&[], &[]);
        assert_eq!(placement.branch, PlacementBranch::Clear { attempts: 1 });
        assert!((placement.position.x - 500.0).abs() <= 100.0);
    }
}
