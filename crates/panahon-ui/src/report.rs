//! Plain-text rendering for one-shot commands.

use std::fmt::Write;

use crate::view::{Backdrop, Decoration, WeatherView};

pub fn render_text(view: &WeatherView<'_>, backdrop: &Backdrop) -> String {
    let mut out = String::new();

    if let Some(status) = view.status {
        let _ = writeln!(out, "! {}", status);
    }

    let Some(panel) = &view.panel else {
        if view.status.is_none() {
            let _ = writeln!(out, "No weather data.");
        }
        return out;
    };

    let _ = writeln!(out, "{}", panel.heading);
    let _ = writeln!(out, "{}", "=".repeat(panel.heading.chars().count()));
    let _ = writeln!(out, "Condition:           {}", panel.description);
    let _ = writeln!(out, "Current Temperature: {}", panel.temperature);
    let _ = writeln!(out, "Backdrop:            {}", describe_backdrop(backdrop));

    if !panel.slots.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Next Hours Forecast");
        for slot in &panel.slots {
            let _ = writeln!(out, "  {:>8}  {:>8}", slot.label, slot.temperature);
        }
    }

    out
}

fn describe_backdrop(backdrop: &Backdrop) -> String {
    let category = backdrop.category.as_str();
    match &backdrop.decoration {
        Decoration::None => category.to_string(),
        Decoration::Fog { layers } => format!("{} ({} fog layers)", category, layers),
        Decoration::Clouds { count } => format!("{} ({} clouds)", category, count),
        Decoration::Rain { drops } => format!("{} ({} raindrops)", category, drops.len()),
        Decoration::Storm { drops } => {
            format!("{} ({} raindrops, lightning)", category, drops.len())
        }
    }
}
