use eframe::egui::{Pos2, Vec2, pos2, vec2};
use serde::Serialize;

use crate::config::ViewportConfig;

/// Pan/zoom state. `screen = graph * scale + translate`, with screen
/// coordinates relative to the canvas origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Viewport {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ViewportTransform {
    viewport: Viewport,
    config: ViewportConfig,
}

impl ViewportTransform {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            viewport: Viewport::default(),
            config,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scale(&self) -> f32 {
        self.viewport.scale
    }

    fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }

    pub fn graph_to_screen(&self, graph: Vec2) -> Pos2 {
        let Viewport {
            scale,
            translate_x,
            translate_y,
        } = self.viewport;
        pos2(graph.x * scale + translate_x, graph.y * scale + translate_y)
    }

    pub fn screen_to_graph(&self, screen: Pos2) -> Vec2 {
        let Viewport {
            scale,
            translate_x,
            translate_y,
        } = self.viewport;
        vec2((screen.x - translate_x) / scale, (screen.y - translate_y) / scale)
    }

    fn set_scale_anchored(&mut self, new_scale: f32, anchor: Pos2) {
        let graph_anchor = self.screen_to_graph(anchor);
        self.viewport.scale = new_scale;
        self.viewport.translate_x = anchor.x - graph_anchor.x * new_scale;
        self.viewport.translate_y = anchor.y - graph_anchor.y * new_scale;
    }

    /// Wheel zoom. Positive `delta` zooms in; the graph point under `cursor`
    /// stays under `cursor`.
    pub fn zoom(&mut self, delta: f32, cursor: Pos2) {
        let new_scale = self.clamp_scale(self.viewport.scale + delta * self.config.zoom_sensitivity);
        self.set_scale_anchored(new_scale, cursor);
    }

    pub fn zoom_in(&mut self, anchor: Pos2) {
        let new_scale = self.clamp_scale(self.viewport.scale * self.config.zoom_step);
        self.set_scale_anchored(new_scale, anchor);
    }

    pub fn zoom_out(&mut self, anchor: Pos2) {
        let new_scale = self.clamp_scale(self.viewport.scale / self.config.zoom_step);
        self.set_scale_anchored(new_scale, anchor);
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.viewport.translate_x += delta.x;
        self.viewport.translate_y += delta.y;
    }

    pub fn reset(&mut self) {
        self.viewport = Viewport::default();
    }
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}
