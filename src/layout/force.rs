use eframe::egui::Vec2;

use crate::config::ForceConfig;

/// Fixed-iteration spring/repulsion simulation starting from `initial`.
///
/// No cooling schedule: every iteration applies inverse-square repulsion to
/// all pairs, Hookean attraction along every edge, then damping and
/// integration. Pairs at exactly zero distance are skipped, so duplicates
/// stay coincident.
pub fn force_layout(initial: &[Vec2], edges: &[(usize, usize)], config: &ForceConfig) -> Vec<Vec2> {
    let n = initial.len();
    let mut positions = initial.to_vec();
    if n < 2 {
        return positions;
    }

    let mut velocities = vec![Vec2::ZERO; n];

    for _ in 0..config.iterations {
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = positions[i] - positions[j];
                let distance_sq = delta.length_sq();
                if distance_sq <= 0.0 {
                    continue;
                }

                let distance = distance_sq.sqrt();
                let direction = delta / distance;
                let force = config.repulsion / distance_sq;
                velocities[i] += direction * force;
                velocities[j] -= direction * force;
            }
        }

        for &(source, target) in edges {
            if source >= n || target >= n || source == target {
                continue;
            }

            let delta = positions[target] - positions[source];
            let distance = delta.length();
            if distance <= 0.0 {
                continue;
            }

            let direction = delta / distance;
            let force = distance * config.attraction;
            velocities[source] += direction * force;
            velocities[target] -= direction * force;
        }

        for (position, velocity) in positions.iter_mut().zip(velocities.iter_mut()) {
            *velocity *= config.damping;
            *position += *velocity;
        }
    }

    positions
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn single_node_stays_put() {
        let initial = [vec2(3.0, 4.0)];
        assert_eq!(force_layout(&initial, &[], &ForceConfig::default()), initial.to_vec());
    }

    #[test]
    fn unconnected_nodes_repel() {
        let initial = [vec2(0.0, 0.0), vec2(100.0, 0.0)];
        let result = force_layout(&initial, &[], &ForceConfig::default());
        assert!((result[1] - result[0]).length() > 100.0);
        // Symmetric forces keep the midpoint fixed.
        assert!(((result[0] + result[1]) / 2.0 - vec2(50.0, 0.0)).length() < 1e-2);
    }

    #[test]
    fn connected_nodes_attract() {
        let initial = [vec2(0.0, 0.0), vec2(600.0, 0.0)];
        let result = force_layout(&initial, &[(0, 1)], &ForceConfig::default());
        let distance = (result[1] - result[0]).length();
        assert!(distance < 600.0);
        assert!(distance > 0.0);
    }

    #[test]
    fn coincident_nodes_stay_coincident() {
        let initial = [vec2(10.0, 10.0), vec2(10.0, 10.0), vec2(300.0, 80.0)];
        let result = force_layout(&initial, &[], &ForceConfig::default());
        assert_eq!(result[0], result[1]);
        assert_ne!(result[2], initial[2]);
    }

    #[test]
    fn self_loops_and_bad_edges_are_ignored() {
        let initial = [vec2(0.0, 0.0), vec2(400.0, 0.0)];
        let config = ForceConfig::default();
        assert_eq!(
            force_layout(&initial, &[(0, 0), (1, 5)], &config),
            force_layout(&initial, &[], &config)
        );
    }

    #[test]
    fn zero_iterations_is_identity() {
        let config = ForceConfig {
            iterations: 0,
            ..ForceConfig::default()
        };
        let initial = [vec2(0.0, 0.0), vec2(1.0, 0.0)];
        assert_eq!(force_layout(&initial, &[(0, 1)], &config), initial.to_vec());
    }
}
