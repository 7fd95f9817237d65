//! Core types: events, weather reports, day windows, receipt rendering

pub mod event;
pub mod receipt;
pub mod time;
pub mod tracing;
pub mod weather;

pub use event::Event;
pub use receipt::{
    Justify, PrintInstruction, Receipt, RenderOptions, TextSize, downcase_first, event_time_line,
    format_clock, plain_text, render_header, render_schedule, render_weather,
};
pub use time::TimeWindow;
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use weather::{Forecast, WeatherReport};
