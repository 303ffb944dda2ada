//! View-model derived from `WidgetState` on every state change.

use chrono::NaiveDateTime;
use panahon_weather::{Catalog, Municipality, WeatherCategory, WeatherSnapshot};
use rand::Rng;

use crate::state::WidgetState;

/// Slots shown in the hourly forecast grid unless configured otherwise.
pub const FORECAST_SLOTS: usize = 8;
/// Raindrops drawn for rain, showers and storms.
pub const RAINDROP_COUNT: usize = 50;

/// One cell of the hourly forecast grid
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSlot {
    pub label: String,
    pub temperature: String,
}

/// Current conditions and hourly grid for the selected municipality
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPanel {
    pub heading: String,
    pub description: &'static str,
    pub category: WeatherCategory,
    pub temperature: String,
    pub slots: Vec<ForecastSlot>,
}

/// Everything a renderer needs for one frame, minus the backdrop.
#[derive(Debug, Clone)]
pub struct WeatherView<'a> {
    pub options: Vec<&'a Municipality>,
    pub selection: &'a str,
    pub search: &'a str,
    pub status: Option<&'a str>,
    pub panel: Option<WeatherPanel>,
}

impl<'a> WeatherView<'a> {
    pub fn build(state: &'a WidgetState, catalog: &'a Catalog, slots: usize) -> Self {
        Self {
            options: catalog.filter(state.search()),
            selection: state.selection(),
            search: state.search(),
            status: state.status(),
            panel: state
                .snapshot()
                .map(|snapshot| WeatherPanel::build(state.selection(), snapshot, slots)),
        }
    }
}

impl WeatherPanel {
    pub fn build(selection: &str, snapshot: &WeatherSnapshot, slots: usize) -> Self {
        let conditions = snapshot.current_conditions();
        let hourly = &snapshot.hourly;

        let slots = hourly
            .time
            .iter()
            .take(slots)
            .enumerate()
            .map(|(i, time)| ForecastSlot {
                label: slot_label(time),
                temperature: format_temperature(hourly.temperature_at(i)),
            })
            .collect();

        Self {
            heading: format!("Weather in {}", selection),
            description: conditions.description,
            category: conditions.category,
            temperature: format_temperature(snapshot.current_temperature()),
            slots,
        }
    }
}

fn format_temperature(value: Option<f64>) -> String {
    match value {
        Some(t) => format!("{}°C", t),
        None => "n/a".to_string(),
    }
}

/// "HH:MM" from an ISO-8601 local timestamp; the raw text if it doesn't parse.
pub fn slot_label(time: &str) -> String {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(time, fmt).ok())
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| time.to_string())
}

/// Falling drop with randomized placement and timing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Raindrop {
    /// Horizontal position, 0..100 percent of the width
    pub left_pct: f64,
    /// Seconds to fall the full height, 0.5..1.0
    pub duration_secs: f64,
    /// Start offset in seconds, 0..2
    pub delay_secs: f64,
}

/// Decorative elements layered over the background colour
#[derive(Debug, Clone, PartialEq)]
pub enum Decoration {
    None,
    Fog { layers: usize },
    Clouds { count: usize },
    Rain { drops: Vec<Raindrop> },
    Storm { drops: Vec<Raindrop> },
}

/// Weather-matched background for the current conditions
#[derive(Debug, Clone, PartialEq)]
pub struct Backdrop {
    pub category: WeatherCategory,
    pub decoration: Decoration,
}

impl Backdrop {
    /// Build with fresh random raindrops. Not memoized: every call places
    /// the drops anew.
    pub fn build(snapshot: Option<&WeatherSnapshot>) -> Self {
        Self::build_with_rng(snapshot, &mut rand::rng())
    }

    pub fn build_with_rng<R: Rng>(snapshot: Option<&WeatherSnapshot>, rng: &mut R) -> Self {
        let category = snapshot
            .map(|s| s.current_conditions().category)
            .unwrap_or_default();

        let decoration = match category {
            WeatherCategory::Fog => Decoration::Fog { layers: 2 },
            WeatherCategory::Overcast => Decoration::Clouds { count: 3 },
            WeatherCategory::Rain | WeatherCategory::Showers => Decoration::Rain {
                drops: raindrops(rng),
            },
            WeatherCategory::Storm => Decoration::Storm {
                drops: raindrops(rng),
            },
            WeatherCategory::Clear
            | WeatherCategory::PartlyCloudy
            | WeatherCategory::Drizzle
            | WeatherCategory::Snow => Decoration::None,
        };

        Self {
            category,
            decoration,
        }
    }
}

fn raindrops<R: Rng>(rng: &mut R) -> Vec<Raindrop> {
    (0..RAINDROP_COUNT)
        .map(|_| Raindrop {
            left_pct: rng.random_range(0.0..100.0),
            duration_secs: 0.5 + rng.random_range(0.0..0.5),
            delay_secs: rng.random_range(0.0..2.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use panahon_weather::{Coordinates, HourlySeries};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn snapshot(codes: &[i32]) -> WeatherSnapshot {
        WeatherSnapshot {
            coordinates: Coordinates::new(14.676, 121.043),
            hourly: HourlySeries {
                time: (0..codes.len())
                    .map(|h| format!("2026-10-18T{:02}:00", h))
                    .collect(),
                temperature_2m: (0..codes.len()).map(|h| Some(25.0 + h as f64 / 2.0)).collect(),
                weathercode: codes.iter().copied().map(Some).collect(),
            },
        }
    }

    fn catalog() -> Catalog {
        Catalog::parse(
            "Municipalities,Population,Province\n\
             Quezon City,\"2,960,048\",Metro Manila\n\
             Baguio,\"366,358\",Benguet\n\
             Quezon,\"62,000\",Bukidnon\n",
        )
    }

    #[test]
    fn panel_for_overcast_snapshot() {
        let panel = WeatherPanel::build("Quezon City", &snapshot(&[3; 12]), FORECAST_SLOTS);
        assert_eq!(panel.heading, "Weather in Quezon City");
        assert_eq!(panel.description, "Overcast");
        assert_eq!(panel.category, WeatherCategory::Overcast);
        assert_eq!(panel.temperature, "25°C");
        assert_eq!(panel.slots.len(), 8);
        assert_eq!(panel.slots[1].label, "01:00");
        assert_eq!(panel.slots[1].temperature, "25.5°C");
    }

    #[test]
    fn short_series_gives_fewer_slots() {
        let panel = WeatherPanel::build("Baguio", &snapshot(&[0, 1, 2]), FORECAST_SLOTS);
        assert_eq!(panel.slots.len(), 3);
    }

    #[test]
    fn unknown_code_renders_unknown() {
        let panel = WeatherPanel::build("Baguio", &snapshot(&[12]), FORECAST_SLOTS);
        assert_eq!(panel.description, "Unknown");
        assert_eq!(panel.category, WeatherCategory::Clear);
    }

    #[test]
    fn missing_temperature_is_marked() {
        let mut s = snapshot(&[0, 0]);
        s.hourly.temperature_2m.truncate(1);
        let panel = WeatherPanel::build("Baguio", &s, FORECAST_SLOTS);
        assert_eq!(panel.slots[1].temperature, "n/a");
    }

    #[test]
    fn null_hours_render_as_unknown_and_na() {
        let mut s = snapshot(&[3, 3, 3]);
        s.hourly.weathercode[0] = None;
        s.hourly.temperature_2m[0] = None;
        s.hourly.temperature_2m[2] = None;
        let panel = WeatherPanel::build("Baguio", &s, FORECAST_SLOTS);
        assert_eq!(panel.description, "Unknown");
        assert_eq!(panel.temperature, "n/a");
        assert_eq!(panel.slots[1].temperature, "25.5°C");
        assert_eq!(panel.slots[2].temperature, "n/a");
    }

    #[test]
    fn slot_label_formats() {
        assert_eq!(slot_label("2026-10-18T13:00"), "13:00");
        assert_eq!(slot_label("2026-10-18T07:30:00"), "07:30");
        assert_eq!(slot_label("tomorrow"), "tomorrow");
    }

    #[test]
    fn view_filters_catalog_case_insensitively() {
        let catalog = catalog();
        let mut state = WidgetState::new();
        state.set_search("BAG");
        let view = WeatherView::build(&state, &catalog, FORECAST_SLOTS);
        assert_eq!(view.options.len(), 1);
        assert_eq!(view.options[0].name, "Baguio");
        assert!(view.panel.is_none());
    }

    #[test]
    fn view_shows_panel_after_fetch() {
        let catalog = catalog();
        let mut state = WidgetState::new();
        let ticket = match state.select("Quezon City") {
            Some(crate::state::Command::Fetch { ticket, .. }) => ticket,
            other => unreachable!("expected fetch, got {:?}", other),
        };
        state.fetch_succeeded(ticket, snapshot(&[3, 3]));
        let view = WeatherView::build(&state, &catalog, FORECAST_SLOTS);
        assert_eq!(view.options.len(), 3);
        assert_eq!(view.selection, "Quezon City");
        assert_eq!(view.panel.map(|p| p.description), Some("Overcast"));
    }

    #[test]
    fn backdrop_without_snapshot_is_plain_clear() {
        let backdrop = Backdrop::build(None);
        assert_eq!(backdrop.category, WeatherCategory::Clear);
        assert_eq!(backdrop.decoration, Decoration::None);
    }

    #[test]
    fn backdrop_static_decorations() {
        let fog = Backdrop::build(Some(&snapshot(&[45])));
        assert_eq!(fog.decoration, Decoration::Fog { layers: 2 });
        let overcast = Backdrop::build(Some(&snapshot(&[3])));
        assert_eq!(overcast.decoration, Decoration::Clouds { count: 3 });
        let drizzle = Backdrop::build(Some(&snapshot(&[53])));
        assert_eq!(drizzle.category, WeatherCategory::Drizzle);
        assert_eq!(drizzle.decoration, Decoration::None);
    }

    #[test]
    fn backdrop_rain_drops_within_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for code in [61, 80, 82] {
            let backdrop = Backdrop::build_with_rng(Some(&snapshot(&[code])), &mut rng);
            let Decoration::Rain { drops } = backdrop.decoration else {
                unreachable!("code {} should rain", code);
            };
            assert_eq!(drops.len(), RAINDROP_COUNT);
            for d in drops {
                assert!((0.0..100.0).contains(&d.left_pct));
                assert!((0.5..1.0).contains(&d.duration_secs));
                assert!((0.0..2.0).contains(&d.delay_secs));
            }
        }
    }

    #[test]
    fn backdrop_storm_regenerates_drops() {
        let mut rng = StdRng::seed_from_u64(42);
        let s = snapshot(&[95]);
        let first = Backdrop::build_with_rng(Some(&s), &mut rng);
        let second = Backdrop::build_with_rng(Some(&s), &mut rng);
        assert_eq!(first.category, WeatherCategory::Storm);
        assert!(matches!(first.decoration, Decoration::Storm { .. }));
        assert_ne!(first, second);
    }
}
