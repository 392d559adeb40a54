use eframe::egui::{Vec2, vec2};

use crate::config::OverlapConfig;

/// Pushes apart every pair of points closer than the configured clearance.
/// The push shrinks with each iteration so the pass settles instead of
/// oscillating. Dense clusters can keep some residual overlap.
pub fn resolve_overlaps(positions: &[Vec2], config: &OverlapConfig) -> Vec<Vec2> {
    let mut adjusted = positions.to_vec();
    let n = adjusted.len();
    if n < 2 {
        return adjusted;
    }

    let min_distance = config.min_clearance();
    for iteration in 0..config.iterations {
        let step = 1.0 / (iteration + 1) as f32;

        for i in 0..n {
            for j in (i + 1)..n {
                let delta = adjusted[j] - adjusted[i];
                let distance = delta.length();
                if distance >= min_distance {
                    continue;
                }

                // Coincident points separate along +x.
                let direction = if distance > f32::EPSILON {
                    delta / distance
                } else {
                    vec2(1.0, 0.0)
                };
                let push = (min_distance - distance) / 2.0 * step;

                adjusted[i] -= direction * push;
                adjusted[j] += direction * push;
            }
        }
    }

    adjusted
}
