use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

use wallet_flow::graph::FlowDirection;

const BACKGROUND: Color32 = Color32::from_rgb(19, 23, 29);
const EDGE_CULL_MARGIN: f32 = 2.5;

/// Moves `base` toward `overlay` by `amount` in gamma space.
pub(super) fn mix(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    base.lerp_to_gamma(overlay, amount.clamp(0.0, 1.0))
}

/// Pushes a color toward the canvas background so highlighted items stand out.
pub(super) fn fade(color: Color32, keep: f32) -> Color32 {
    mix(BACKGROUND, color, keep)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, origin: Pos2, scale: f32) {
    painter.rect_filled(rect, 0.0, BACKGROUND);

    let step = (56.0 * scale.clamp(0.6, 1.8)).max(20.0);
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn node_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    rect.expand(radius).contains(position)
}

/// Cheap cull on the segment's bounding box. A diagonal edge passing just
/// outside a corner is still drawn, which egui clips anyway.
pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2) -> bool {
    Rect::from_two_pos(start, end)
        .expand(EDGE_CULL_MARGIN)
        .intersects(rect)
}

pub(super) fn flow_color(direction: FlowDirection) -> Color32 {
    match direction {
        FlowDirection::Inflow => Color32::from_rgb(96, 196, 132),
        FlowDirection::Outflow => Color32::from_rgb(232, 112, 96),
    }
}

/// Two wing points of an arrowhead whose tip sits on the target circle's
/// rim. `None` when the endpoints overlap.
pub(super) fn arrow_head(
    start: Pos2,
    end: Pos2,
    target_radius: f32,
    size: f32,
) -> Option<(Pos2, [Pos2; 2])> {
    let delta = end - start;
    let length = delta.length();
    if length <= target_radius + f32::EPSILON {
        return None;
    }

    let direction = delta / length;
    let tip = end - direction * target_radius;
    let back = tip - direction * size;
    let normal = direction.rot90() * (size * 0.5);
    Some((tip, [back + normal, back - normal]))
}

/// Node radius on screen, grown gently with zoom.
pub(super) fn screen_radius(scale: f32) -> f32 {
    (18.0 * scale.powf(0.6)).clamp(6.0, 48.0)
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn arrow_tip_stops_at_target_rim() {
        let (tip, wings) = arrow_head(pos2(0.0, 0.0), pos2(100.0, 0.0), 10.0, 8.0).unwrap();
        assert_eq!(tip, pos2(90.0, 0.0));
        assert!(wings.iter().all(|wing| (wing.x - 82.0).abs() < 1e-4));
        assert!((wings[0].y + wings[1].y).abs() < 1e-4);
    }

    #[test]
    fn arrow_skips_overlapping_endpoints() {
        assert!(arrow_head(pos2(5.0, 5.0), pos2(6.0, 5.0), 10.0, 8.0).is_none());
    }

    #[test]
    fn edge_spanning_canvas_is_kept_and_offscreen_edge_culled() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        assert!(edge_visible(rect, pos2(-50.0, 50.0), pos2(150.0, 50.0)));
        assert!(!edge_visible(rect, pos2(-50.0, -50.0), pos2(-10.0, -5.0)));
    }

    #[test]
    fn node_partly_inside_canvas_is_visible() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        assert!(node_visible(rect, pos2(-5.0, 50.0), 10.0));
        assert!(!node_visible(rect, pos2(-15.0, 50.0), 10.0));
    }

    #[test]
    fn mix_hits_both_endpoints_and_fade_darkens() {
        let base = Color32::from_rgb(72, 132, 206);
        assert_eq!(mix(base, Color32::WHITE, 0.0), base);
        assert_eq!(mix(base, Color32::WHITE, 1.0), Color32::WHITE);
        assert_eq!(mix(base, Color32::WHITE, 7.0), Color32::WHITE);

        let faded = fade(base, 0.5);
        assert!(faded.b() < base.b());
        assert!(faded.b() > BACKGROUND.b());
    }
}
