use std::collections::{HashMap, HashSet};

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui, vec2};

use wallet_flow::util::{format_amount, short_address};

use super::super::render_utils::{
    arrow_head, draw_background, edge_visible, fade, flow_color, mix, node_visible, screen_radius,
};
use super::super::ViewModel;

const NODE_COLOR: Color32 = Color32::from_rgb(72, 132, 206);
const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const MATCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        self.canvas_size = rect.size();

        let view = *self.controller.view();
        let origin = rect.min + (view.graph_to_screen(egui::Vec2::ZERO) - Pos2::ZERO);
        draw_background(&painter, rect, origin, view.scale());

        let radius = screen_radius(view.scale());
        let to_screen =
            |position: egui::Vec2| rect.min + (view.graph_to_screen(position) - Pos2::ZERO);

        let snapshot = self.controller.snapshot();
        let screen_by_id = snapshot
            .nodes
            .iter()
            .map(|node| (node.id, to_screen(node.position)))
            .collect::<HashMap<_, _>>();
        let visible = snapshot
            .nodes
            .iter()
            .filter_map(|node| {
                let position = screen_by_id.get(&node.id).copied()?;
                node_visible(rect, position, radius).then_some((node.id, position))
            })
            .collect::<Vec<_>>();

        let query = self.search.trim();
        let matches = if query.is_empty() {
            HashSet::new()
        } else {
            self.controller
                .store()
                .search(query)
                .into_iter()
                .collect::<HashSet<_>>()
        };
        let selected = snapshot.selected;
        let neighbors = selected
            .map(|id| {
                snapshot
                    .edges
                    .iter()
                    .filter_map(|edge| {
                        if edge.source == id {
                            Some(edge.target)
                        } else if edge.target == id {
                            Some(edge.source)
                        } else {
                            None
                        }
                    })
                    .collect::<HashSet<_>>()
            })
            .unwrap_or_default();

        let hovered = Self::hovered_node(ui, &visible, radius);
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }
        let hovered_id = hovered.map(|(id, _)| id);

        let zoom_sqrt = view.scale().sqrt();
        for edge in snapshot.edges {
            let (Some(&start), Some(&end)) =
                (screen_by_id.get(&edge.source), screen_by_id.get(&edge.target))
            else {
                continue;
            };
            if edge.source == edge.target || !edge_visible(rect, start, end) {
                continue;
            }

            let touches_selection =
                selected.is_some_and(|id| edge.source == id || edge.target == id);
            let base = flow_color(edge.direction);
            let color = if touches_selection {
                mix(base, SELECTED_COLOR, 0.35)
            } else if selected.is_some() {
                fade(base, 0.45)
            } else {
                base
            };
            let width = (if touches_selection { 2.6 } else { 1.6 }) * zoom_sqrt;
            let stroke = Stroke::new(width.clamp(0.8, 5.0), color);

            painter.line_segment([start, end], stroke);
            if let Some((tip, [left, right])) = arrow_head(start, end, radius, 10.0 * zoom_sqrt) {
                painter.line_segment([tip, left], stroke);
                painter.line_segment([tip, right], stroke);
            }

            if view.scale() > 0.8 {
                let mid = start + (end - start) * 0.5;
                painter.text(
                    mid + vec2(0.0, -8.0),
                    Align2::CENTER_BOTTOM,
                    format!("{:.4}", edge.amount),
                    FontId::proportional(11.0),
                    Color32::from_gray(200),
                );
            }
        }

        let mut selection_animating = false;
        for node in snapshot.nodes {
            let Some(position) = visible
                .iter()
                .find_map(|(id, position)| (*id == node.id).then_some(*position))
            else {
                continue;
            };

            let is_selected = selected == Some(node.id);
            let is_hovered = hovered_id == Some(node.id);
            let is_neighbor = neighbors.contains(&node.id);
            let is_match = matches.contains(&node.id);

            let unselected_color = if is_hovered {
                Color32::from_rgb(255, 164, 101)
            } else if is_match {
                mix(NODE_COLOR, MATCH_COLOR, 0.68)
            } else if is_neighbor {
                mix(NODE_COLOR, SELECTED_COLOR, 0.35)
            } else if selected.is_some() || !matches.is_empty() {
                fade(NODE_COLOR, 0.52)
            } else {
                NODE_COLOR
            };

            let selection_mix = ui.ctx().animate_bool(
                ui.make_persistent_id(("wallet-selection", node.id.0)),
                is_selected,
            );
            if selection_mix > 0.0 && selection_mix < 1.0 {
                selection_animating = true;
            }
            let color = mix(unselected_color, SELECTED_COLOR, selection_mix);

            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    1.0 + selection_mix * 1.2,
                    Color32::from_rgba_unmultiplied(15, 15, 15, 190),
                ),
            );

            if is_selected || is_hovered || is_match || view.scale() > 0.6 {
                painter.text(
                    position + vec2(0.0, radius + 4.0),
                    Align2::CENTER_TOP,
                    short_address(&node.address),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if selection_animating {
            ui.ctx().request_repaint();
        }

        if let Some(id) = hovered_id
            && let Some(node) = self.controller.store().node(id)
        {
            let panel_text = format!(
                "{}  |  {}  |  {}",
                node.entity_name,
                format_amount(node.amount, &node.token_type),
                node.address
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        self.handle_node_drag(ui, rect, &response, hovered_id);
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        if response.clicked_by(egui::PointerButton::Primary) {
            self.apply_graph_selection(hovered_id);
        }

        if response.dragged() {
            ui.ctx().request_repaint();
        }
    }
}

