use eframe::egui::Vec2;

pub fn format_amount(amount: f64, token: &str) -> String {
    if token.trim().is_empty() {
        format!("{amount:.8}")
    } else {
        format!("{amount:.8} {token}")
    }
}

pub fn short_address(address: &str) -> String {
    const VISIBLE: usize = 10;

    if address.chars().count() <= VISIBLE {
        address.to_owned()
    } else {
        let prefix = address.chars().take(VISIBLE).collect::<String>();
        format!("{prefix}...")
    }
}

pub fn centroid(points: &[Vec2]) -> Option<Vec2> {
    if points.is_empty() {
        return None;
    }

    let sum = points.iter().fold(Vec2::ZERO, |acc, point| acc + *point);
    Some(sum / points.len() as f32)
}
