use eframe::egui::{self, Pos2, Rect, Ui};

use wallet_flow::controller::Command;
use wallet_flow::graph::NodeId;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let cursor = (pointer - rect.min).to_pos2();
        self.dispatch(Command::Zoom {
            delta: scroll,
            cursor,
        });
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        let background_drag = response.dragged_by(egui::PointerButton::Primary)
            && self.dragging.is_none();
        if background_drag
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            if delta != egui::Vec2::ZERO {
                self.dispatch(Command::Pan(delta));
            }
        }
    }

    /// Primary drag on a node moves it; the node under the pointer when the
    /// drag starts keeps following it until release.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        hovered: Option<NodeId>,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            self.dragging = hovered;
        }
        if response.drag_stopped() {
            self.dragging = None;
            return;
        }

        let Some(id) = self.dragging else {
            return;
        };
        let Some(pointer) = ui.input(|input| input.pointer.interact_pos()) else {
            return;
        };

        let position = self
            .controller
            .view()
            .screen_to_graph((pointer - rect.min).to_pos2());
        if self
            .dispatch(Command::MoveNode { id, position })
            .is_none()
        {
            self.dragging = None;
        }
    }

    pub(in crate::app) fn hovered_node(
        ui: &Ui,
        visible: &[(NodeId, Pos2)],
        radius: f32,
    ) -> Option<(NodeId, f32)> {
        let pointer_pos = ui.input(|input| input.pointer.hover_pos());
        pointer_pos.and_then(|pointer| {
            visible
                .iter()
                .filter_map(|(id, position)| {
                    let distance = (*position - pointer).length();
                    if distance <= radius {
                        Some((*id, distance))
                    } else {
                        None
                    }
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
        })
    }

    pub(in crate::app) fn apply_graph_selection(&mut self, selected: Option<NodeId>) {
        if self.controller.store().selected() != selected {
            self.dispatch(Command::Select(selected));
        }
    }
}
