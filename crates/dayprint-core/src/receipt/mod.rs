//! Receipt rendering.
//!
//! The renderer turns the day's events and the weather report into an
//! ordered list of [`PrintInstruction`]s. It never talks to a printer: a
//! sink (see the `dayprint-printer` crate) consumes the instructions, which
//! keeps every formatting rule testable without hardware.
//!
//! # Layout
//!
//! ```text
//!        Wednesday, February 5, 2025        <- medium, centered
//!             Today's Schedule              <- bold, underlined, centered
//!
//! Standup
//! 9:00AM - 9:15AM, Room 1
//!
//!              Today's Weather
//!
//! Temperature: 71.5. Feels like 72
//! ...
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::weather::WeatherReport;

#[cfg(test)]
mod golden_tests;

/// Title printed above the event list.
pub const SCHEDULE_TITLE: &str = "Today's Schedule";

/// Title printed above the weather section.
pub const WEATHER_TITLE: &str = "Today's Weather";

/// Line printed when the day has no timed events.
pub const DEFAULT_NO_EVENTS_TEXT: &str = "No scheduled events today.";

/// Default printable width in characters at small size.
pub const DEFAULT_WIDTH: usize = 32;

/// Character size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSize {
    Small,
    Medium,
    Large,
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Justify {
    Left,
    Center,
    Right,
}

/// A single printer directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "arg", rename_all = "snake_case")]
pub enum PrintInstruction {
    /// Print one line of text followed by a line break.
    Text(String),
    /// Turn bold on or off.
    Bold(bool),
    /// Turn underline on or off.
    Underline(bool),
    /// Set alignment for subsequent lines.
    Justify(Justify),
    /// Set character size for subsequent lines.
    Size(TextSize),
    /// Advance the paper by the given number of blank lines.
    Feed(u8),
}

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Line printed when there are no events.
    pub no_events_text: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            no_events_text: DEFAULT_NO_EVENTS_TEXT.to_string(),
        }
    }
}

/// An ordered list of print instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    instructions: Vec<PrintInstruction>,
}

impl Receipt {
    /// Creates an empty receipt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text line.
    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.instructions.push(PrintInstruction::Text(text.into()));
        self
    }

    /// Appends a bold toggle.
    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.instructions.push(PrintInstruction::Bold(on));
        self
    }

    /// Appends an underline toggle.
    pub fn underline(&mut self, on: bool) -> &mut Self {
        self.instructions.push(PrintInstruction::Underline(on));
        self
    }

    /// Appends an alignment change.
    pub fn justify(&mut self, justify: Justify) -> &mut Self {
        self.instructions.push(PrintInstruction::Justify(justify));
        self
    }

    /// Appends a size change.
    pub fn size(&mut self, size: TextSize) -> &mut Self {
        self.instructions.push(PrintInstruction::Size(size));
        self
    }

    /// Appends a paper feed.
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.instructions.push(PrintInstruction::Feed(lines));
        self
    }

    /// Appends a bold, underlined, centered section title.
    pub fn section_title(&mut self, title: &str) -> &mut Self {
        self.bold(true)
            .underline(true)
            .justify(Justify::Center)
            .line(title)
            .justify(Justify::Left)
            .underline(false)
            .bold(false)
    }

    /// Appends previously rendered instructions.
    pub fn extend(&mut self, instructions: impl IntoIterator<Item = PrintInstruction>) -> &mut Self {
        self.instructions.extend(instructions);
        self
    }

    /// Returns the instructions.
    pub fn instructions(&self) -> &[PrintInstruction] {
        &self.instructions
    }

    /// Consumes the receipt and returns the instructions.
    pub fn into_instructions(self) -> Vec<PrintInstruction> {
        self.instructions
    }

    /// Renders the receipt as plain text.
    ///
    /// With a width, centered and right-justified lines are padded to it.
    /// Styling has no textual form and is dropped.
    pub fn to_plain_text(&self, width: Option<usize>) -> String {
        plain_text(&self.instructions, width)
    }
}

/// Renders instructions as plain text. See [`Receipt::to_plain_text`].
pub fn plain_text(instructions: &[PrintInstruction], width: Option<usize>) -> String {
    let mut out = String::new();
    let mut justify = Justify::Left;

    for instruction in instructions {
        match instruction {
            PrintInstruction::Text(text) => {
                let len = text.chars().count();
                let pad = match (width, justify) {
                    (Some(w), Justify::Center) if len < w => (w - len) / 2,
                    (Some(w), Justify::Right) if len < w => w - len,
                    _ => 0,
                };
                out.extend(std::iter::repeat_n(' ', pad));
                out.push_str(text);
                out.push('\n');
            }
            PrintInstruction::Feed(lines) => {
                out.extend(std::iter::repeat_n('\n', usize::from(*lines)));
            }
            PrintInstruction::Justify(j) => justify = *j,
            PrintInstruction::Bold(_)
            | PrintInstruction::Underline(_)
            | PrintInstruction::Size(_) => {}
        }
    }

    out
}

/// Formats a time as `9:00AM`: 12-hour clock, no leading zero, no space
/// before the suffix.
pub fn format_clock(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%-I:%M%p").to_string()
}

/// Formats the time line printed under an event title.
///
/// Events whose start and end print identically show a single time.
pub fn event_time_line(event: &Event) -> String {
    let start = format_clock(&event.start);
    let end = format_clock(&event.end);

    let mut line = if start == end {
        start
    } else {
        format!("{start} - {end}")
    };

    if let Some(location) = event.location() {
        line.push_str(", ");
        line.push_str(location);
    }

    line
}

/// Lower-cases the first character of `s`, leaving the rest untouched.
pub fn downcase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders the date header.
pub fn render_header(date: NaiveDate) -> Vec<PrintInstruction> {
    let mut receipt = Receipt::new();
    receipt
        .size(TextSize::Medium)
        .justify(Justify::Center)
        .line(date.format("%A, %B %-d, %Y").to_string())
        .justify(Justify::Left)
        .size(TextSize::Small);
    receipt.into_instructions()
}

/// Renders the schedule section.
pub fn render_schedule(events: &[Event], options: &RenderOptions) -> Vec<PrintInstruction> {
    let mut receipt = Receipt::new();
    receipt.section_title(SCHEDULE_TITLE).feed(1);

    if events.is_empty() {
        receipt.line(options.no_events_text.as_str()).feed(1);
    }

    for event in events {
        receipt
            .line(event.title.as_str())
            .line(event_time_line(event))
            .feed(1);
    }

    receipt.feed(1);
    receipt.into_instructions()
}

/// Renders the weather section.
pub fn render_weather(report: &WeatherReport) -> Vec<PrintInstruction> {
    let forecast = &report.forecast;
    let mut receipt = Receipt::new();
    receipt
        .section_title(WEATHER_TITLE)
        .feed(1)
        .line(format!(
            "Temperature: {}. Feels like {}",
            report.temp_f, report.feels_like_f
        ))
        .feed(1)
        .line(format!("Today: {}", forecast.today))
        .feed(1)
        .line(format!("Tonight: {}", forecast.tonight))
        .feed(1)
        .line(format!(
            "Tomorrow: {} Tomorrow night, {}",
            forecast.tomorrow,
            downcase_first(&forecast.tomorrow_night)
        ))
        .feed(1)
        .feed(2);
    receipt.into_instructions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::Forecast;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn texts(instructions: &[PrintInstruction]) -> Vec<&str> {
        instructions
            .iter()
            .filter_map(|i| match i {
                PrintInstruction::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    fn report(tomorrow_night: &str) -> WeatherReport {
        WeatherReport {
            city: "Irving".to_string(),
            state: "TX".to_string(),
            temp_f: "71.5".to_string(),
            feels_like_f: "72".to_string(),
            condition: "Clear".to_string(),
            precip_today_in: None,
            icon_url: None,
            forecast: Forecast {
                today: "Sunny. High 80F.".to_string(),
                tonight: "Clear. Low 60F.".to_string(),
                tomorrow: "Cloudy.".to_string(),
                tomorrow_night: tomorrow_night.to_string(),
            },
        }
    }

    mod clock {
        use super::*;

        #[test]
        fn no_leading_zero_and_no_space() {
            assert_eq!(format_clock(&at("2025-02-05T09:00:00-06:00")), "9:00AM");
            assert_eq!(format_clock(&at("2025-02-05T13:05:00-06:00")), "1:05PM");
            assert_eq!(format_clock(&at("2025-02-05T00:30:00-06:00")), "12:30AM");
            assert_eq!(format_clock(&at("2025-02-05T12:00:00-06:00")), "12:00PM");
        }

        #[test]
        fn uses_event_offset() {
            // 15:00Z shown in the event's own -06:00 offset.
            assert_eq!(format_clock(&at("2025-02-05T09:00:00-06:00")), "9:00AM");
            assert_eq!(format_clock(&at("2025-02-05T15:00:00+00:00")), "3:00PM");
        }
    }

    mod time_line {
        use super::*;

        #[test]
        fn point_in_time_without_location() {
            let event = Event::new(
                "A",
                at("2025-02-05T09:00:00-06:00"),
                at("2025-02-05T09:00:00-06:00"),
                "primary",
            );
            assert_eq!(event_time_line(&event), "9:00AM");
        }

        #[test]
        fn point_in_time_with_location() {
            let event = Event::new(
                "A",
                at("2025-02-05T09:00:00-06:00"),
                at("2025-02-05T09:00:00-06:00"),
                "primary",
            )
            .with_location("Gym");
            assert_eq!(event_time_line(&event), "9:00AM, Gym");
        }

        #[test]
        fn range_with_location() {
            let event = Event::new(
                "B",
                at("2025-02-05T09:00:00-06:00"),
                at("2025-02-05T10:00:00-06:00"),
                "primary",
            )
            .with_location("Room 1");
            assert_eq!(event_time_line(&event), "9:00AM - 10:00AM, Room 1");
        }

        #[test]
        fn range_without_location() {
            let event = Event::new(
                "B",
                at("2025-02-05T11:30:00-06:00"),
                at("2025-02-05T12:45:00-06:00"),
                "primary",
            );
            assert_eq!(event_time_line(&event), "11:30AM - 12:45PM");
        }

        #[test]
        fn same_printed_minute_is_a_single_time() {
            let event = Event::new(
                "C",
                at("2025-02-05T09:00:00-06:00"),
                at("2025-02-05T09:00:30-06:00"),
                "primary",
            );
            assert_eq!(event_time_line(&event), "9:00AM");
        }
    }

    mod downcase {
        use super::*;

        #[test]
        fn only_first_letter() {
            assert_eq!(downcase_first("Showers likely."), "showers likely.");
            assert_eq!(downcase_first("NOAA Alert"), "nOAA Alert");
        }

        #[test]
        fn empty_stays_empty() {
            assert_eq!(downcase_first(""), "");
        }

        #[test]
        fn non_ascii_first_char() {
            assert_eq!(downcase_first("Ébauche"), "ébauche");
        }
    }

    mod sections {
        use super::*;

        #[test]
        fn header_is_medium_and_centered() {
            let date = NaiveDate::from_ymd_opt(2025, 2, 5).unwrap();
            assert_eq!(
                render_header(date),
                vec![
                    PrintInstruction::Size(TextSize::Medium),
                    PrintInstruction::Justify(Justify::Center),
                    PrintInstruction::Text("Wednesday, February 5, 2025".to_string()),
                    PrintInstruction::Justify(Justify::Left),
                    PrintInstruction::Size(TextSize::Small),
                ]
            );
        }

        #[test]
        fn section_title_styling() {
            let schedule = render_schedule(&[], &RenderOptions::default());
            assert_eq!(
                &schedule[..8],
                &[
                    PrintInstruction::Bold(true),
                    PrintInstruction::Underline(true),
                    PrintInstruction::Justify(Justify::Center),
                    PrintInstruction::Text(SCHEDULE_TITLE.to_string()),
                    PrintInstruction::Justify(Justify::Left),
                    PrintInstruction::Underline(false),
                    PrintInstruction::Bold(false),
                    PrintInstruction::Feed(1),
                ]
            );
        }

        #[test]
        fn empty_schedule_prints_only_no_events_line() {
            let schedule = render_schedule(&[], &RenderOptions::default());
            assert_eq!(texts(&schedule), vec![SCHEDULE_TITLE, DEFAULT_NO_EVENTS_TEXT]);
        }

        #[test]
        fn custom_no_events_text() {
            let options = RenderOptions {
                no_events_text: "no events".to_string(),
            };
            let schedule = render_schedule(&[], &options);
            assert_eq!(texts(&schedule), vec![SCHEDULE_TITLE, "no events"]);
        }

        #[test]
        fn events_print_title_then_time() {
            let events = vec![
                Event::new(
                    "A",
                    at("2025-02-05T09:00:00-06:00"),
                    at("2025-02-05T09:00:00-06:00"),
                    "primary",
                ),
                Event::new(
                    "B",
                    at("2025-02-05T09:00:00-06:00"),
                    at("2025-02-05T10:00:00-06:00"),
                    "primary",
                )
                .with_location("Room 1"),
            ];
            let schedule = render_schedule(&events, &RenderOptions::default());
            assert_eq!(
                texts(&schedule),
                vec![SCHEDULE_TITLE, "A", "9:00AM", "B", "9:00AM - 10:00AM, Room 1"]
            );
            assert_eq!(schedule.last(), Some(&PrintInstruction::Feed(1)));
        }

        #[test]
        fn weather_lines() {
            let weather = render_weather(&report("Showers likely."));
            assert_eq!(
                texts(&weather),
                vec![
                    WEATHER_TITLE,
                    "Temperature: 71.5. Feels like 72",
                    "Today: Sunny. High 80F.",
                    "Tonight: Clear. Low 60F.",
                    "Tomorrow: Cloudy. Tomorrow night, showers likely.",
                ]
            );
            assert_eq!(weather.last(), Some(&PrintInstruction::Feed(2)));
        }

        #[test]
        fn weather_with_empty_tomorrow_night() {
            let weather = render_weather(&report(""));
            let lines = texts(&weather);
            assert_eq!(lines.last(), Some(&"Tomorrow: Cloudy. Tomorrow night, "));
        }
    }

    mod plain {
        use super::*;

        #[test]
        fn centers_to_width() {
            let mut receipt = Receipt::new();
            receipt.justify(Justify::Center).line("abcd").justify(Justify::Left).line("x");
            assert_eq!(receipt.to_plain_text(Some(10)), "   abcd\nx\n");
        }

        #[test]
        fn right_justifies_to_width() {
            let mut receipt = Receipt::new();
            receipt.justify(Justify::Right).line("abc");
            assert_eq!(receipt.to_plain_text(Some(5)), "  abc\n");
        }

        #[test]
        fn feeds_are_blank_lines() {
            let mut receipt = Receipt::new();
            receipt.line("a").feed(2).line("b");
            assert_eq!(receipt.to_plain_text(None), "a\n\n\nb\n");
        }

        #[test]
        fn overlong_lines_are_not_padded() {
            let mut receipt = Receipt::new();
            receipt.justify(Justify::Center).line("abcdef");
            assert_eq!(receipt.to_plain_text(Some(4)), "abcdef\n");
        }
    }
}
