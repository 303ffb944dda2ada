//! Municipality weather widget: state machine, view-model and terminal front ends.

pub mod report;
pub mod service;
pub mod state;
pub mod tui;
pub mod view;

pub use report::render_text;
pub use service::WeatherService;
pub use state::{Command, FetchTicket, Outcome, WidgetState};
pub use tui::TuiApp;
pub use view::{Backdrop, Decoration, WeatherPanel, WeatherView, FORECAST_SLOTS};
