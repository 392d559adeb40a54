use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::graph::InferredEdgePolicy;

/// Tuning knobs for the store, the layout engines and the viewport. Every
/// section and field falls back to its default, so a partial TOML file is
/// enough to override a single value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub graph: GraphConfig,
    pub placement: PlacementConfig,
    pub tree: TreeConfig,
    pub overlap: OverlapConfig,
    pub force: ForceConfig,
    pub viewport: ViewportConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub inferred_edges: InferredEdgePolicy,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub anchor_x: f32,
    pub anchor_y: f32,
    pub anchor_jitter: f32,
    pub candidate_jitter: f32,
    pub fallback_jitter: f32,
    pub connected_jitter: f32,
    pub node_radius: f32,
    pub node_width: f32,
    pub max_attempts: usize,
    pub connected_max_attempts: usize,
}

impl PlacementConfig {
    pub fn min_distance(&self) -> f32 {
        self.node_radius * 2.5
    }

    pub fn connected_min_distance(&self) -> f32 {
        self.node_width * 1.2
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            anchor_x: 500.0,
            anchor_y: 300.0,
            anchor_jitter: 100.0,
            candidate_jitter: 200.0,
            fallback_jitter: 300.0,
            connected_jitter: 150.0,
            node_radius: 50.0,
            node_width: 120.0,
            max_attempts: 50,
            connected_max_attempts: 30,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub left_margin: f32,
    pub top_margin: f32,
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            left_margin: 150.0,
            top_margin: 100.0,
            horizontal_spacing: 250.0,
            vertical_spacing: 150.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlapConfig {
    pub iterations: usize,
    pub node_radius: f32,
}

impl OverlapConfig {
    pub fn min_clearance(&self) -> f32 {
        self.node_radius * 2.0
    }
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            iterations: 5,
            node_radius: 60.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub iterations: usize,
    pub repulsion: f32,
    pub attraction: f32,
    pub damping: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            repulsion: 20_000.0,
            attraction: 0.005,
            damping: 0.85,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub zoom_sensitivity: f32,
    pub zoom_step: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom_sensitivity: 0.01,
            zoom_step: 1.2,
            min_scale: 0.1,
            max_scale: 5.0,
        }
    }
}

fn ensure_finite(section: &str, field: &str, value: f32) -> Result<()> {
    ensure!(value.is_finite(), "[{section}] {field} must be finite, got {value}");
    Ok(())
}

fn ensure_non_negative(section: &str, field: &str, value: f32) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "[{section}] {field} must be a finite non-negative number, got {value}"
    );
    Ok(())
}

impl AppConfig {
    /// Rejects values the layout engines and the viewport cannot work with.
    pub fn validate(&self) -> Result<()> {
        let placement = &self.placement;
        ensure_finite("placement", "anchor_x", placement.anchor_x)?;
        ensure_finite("placement", "anchor_y", placement.anchor_y)?;
        for (field, value) in [
            ("anchor_jitter", placement.anchor_jitter),
            ("candidate_jitter", placement.candidate_jitter),
            ("fallback_jitter", placement.fallback_jitter),
            ("connected_jitter", placement.connected_jitter),
            ("node_radius", placement.node_radius),
            ("node_width", placement.node_width),
        ] {
            ensure_non_negative("placement", field, value)?;
        }

        let tree = &self.tree;
        for (field, value) in [
            ("left_margin", tree.left_margin),
            ("top_margin", tree.top_margin),
            ("horizontal_spacing", tree.horizontal_spacing),
            ("vertical_spacing", tree.vertical_spacing),
        ] {
            ensure_finite("tree", field, value)?;
        }

        ensure_non_negative("overlap", "node_radius", self.overlap.node_radius)?;

        ensure_finite("force", "repulsion", self.force.repulsion)?;
        ensure_finite("force", "attraction", self.force.attraction)?;
        ensure_non_negative("force", "damping", self.force.damping)?;

        let viewport = &self.viewport;
        ensure_finite("viewport", "zoom_sensitivity", viewport.zoom_sensitivity)?;
        ensure!(
            viewport.zoom_step.is_finite() && viewport.zoom_step > 0.0,
            "[viewport] zoom_step must be positive, got {}",
            viewport.zoom_step
        );
        ensure!(
            viewport.min_scale.is_finite()
                && viewport.max_scale.is_finite()
                && viewport.min_scale > 0.0
                && viewport.min_scale <= viewport.max_scale,
            "[viewport] scale bounds must satisfy 0 < min_scale <= max_scale, got {} and {}",
            viewport.min_scale,
            viewport.max_scale
        );
        Ok(())
    }
}

/// Reads a TOML config. `None` yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = AppConfig::default();
        assert_eq!(config.placement.min_distance(), 125.0);
        assert_eq!(config.placement.connected_min_distance(), 144.0);
        assert_eq!(config.placement.max_attempts, 50);
        assert_eq!(config.placement.connected_max_attempts, 30);
        assert_eq!(config.overlap.iterations, 5);
        assert_eq!(config.overlap.min_clearance(), 120.0);
        assert_eq!(config.force.iterations, 50);
        assert_eq!(config.viewport.min_scale, 0.1);
        assert_eq!(config.viewport.max_scale, 5.0);
        assert_eq!(config.graph.inferred_edges, InferredEdgePolicy::InflowToNew);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let raw = r#"
[force]
iterations = 10

[graph]
inferred_edges = "disabled"
"#;
        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.force.iterations, 10);
        assert_eq!(config.force.damping, 0.85);
        assert_eq!(config.tree, TreeConfig::default());
        assert_eq!(config.graph.inferred_edges, InferredEdgePolicy::Disabled);
    }

    #[test]
    fn load_config_without_path_is_default() {
        assert_eq!(load_config(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tree]\nvertical_spacing = 90.0").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.tree.vertical_spacing, 90.0);
        assert_eq!(config.tree.left_margin, 150.0);
    }

    #[test]
    fn defaults_pass_validation() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn inverted_scale_bounds_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[viewport]\nmin_scale = 6.0").unwrap();

        let error = load_config(Some(file.path())).unwrap_err();
        assert!(error.to_string().contains("invalid config file"));
        assert!(format!("{error:#}").contains("min_scale"));
    }

    #[test]
    fn nan_jitter_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[placement]\ncandidate_jitter = nan").unwrap();

        let error = load_config(Some(file.path())).unwrap_err();
        assert!(format!("{error:#}").contains("candidate_jitter"));
    }

    #[test]
    fn negative_distance_and_nan_force_are_rejected() {
        let mut config = AppConfig::default();
        config.placement.node_radius = -1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.force.repulsion = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.viewport.min_scale = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_reports_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tree\nbroken").unwrap();

        let error = load_config(Some(file.path())).unwrap_err();
        assert!(error.to_string().contains("invalid config file"));
    }
}
