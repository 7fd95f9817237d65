//! Golden tests for the printed receipt.
//!
//! These tests use insta for snapshot testing to ensure receipt layout
//! stability. Run with `cargo insta review` to update snapshots after
//! intentional changes.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::event::Event;
use crate::receipt::{Receipt, RenderOptions, render_header, render_schedule, render_weather};
use crate::weather::{Forecast, WeatherReport};

fn at(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

fn sample_day() -> Vec<Event> {
    vec![
        Event::new(
            "Morning run",
            at("2025-02-05T06:30:00-06:00"),
            at("2025-02-05T07:15:00-06:00"),
            "personal",
        ),
        Event::new(
            "Theology 101",
            at("2025-02-05T09:00:00-06:00"),
            at("2025-02-05T10:15:00-06:00"),
            "classes",
        )
        .with_location("Braniff 120"),
        Event::new(
            "Pay tuition",
            at("2025-02-05T12:00:00-06:00"),
            at("2025-02-05T12:00:00-06:00"),
            "personal",
        ),
        Event::new(
            "Student government",
            at("2025-02-05T19:00:00-06:00"),
            at("2025-02-05T20:30:00-06:00"),
            "sg",
        )
        .with_location("Gorman Lounge"),
    ]
}

fn sample_weather() -> WeatherReport {
    WeatherReport {
        city: "Irving".to_string(),
        state: "TX".to_string(),
        temp_f: "58.3".to_string(),
        feels_like_f: "58.0".to_string(),
        condition: "Overcast".to_string(),
        precip_today_in: Some(0.0),
        icon_url: Some("http://icons.wxug.com/i/c/k/cloudy.gif".to_string()),
        forecast: Forecast {
            today: "Cloudy. High 64F. Winds S at 5 to 10 mph.".to_string(),
            tonight: "Cloudy. Low 52F.".to_string(),
            tomorrow: "Rain showers in the morning. High 61F.".to_string(),
            tomorrow_night: "Showers likely. Low 48F.".to_string(),
        },
    }
}

fn full_receipt(events: &[Event]) -> Receipt {
    let date = NaiveDate::from_ymd_opt(2025, 2, 5).unwrap();
    let mut receipt = Receipt::new();
    receipt
        .extend(render_header(date))
        .extend(render_schedule(events, &RenderOptions::default()))
        .extend(render_weather(&sample_weather()));
    receipt
}

#[test]
fn golden_full_day() {
    let receipt = full_receipt(&sample_day());
    insta::assert_snapshot!(receipt.to_plain_text(None), @r"
Wednesday, February 5, 2025
Today's Schedule

Morning run
6:30AM - 7:15AM

Theology 101
9:00AM - 10:15AM, Braniff 120

Pay tuition
12:00PM

Student government
7:00PM - 8:30PM, Gorman Lounge


Today's Weather

Temperature: 58.3. Feels like 58.0

Today: Cloudy. High 64F. Winds S at 5 to 10 mph.

Tonight: Cloudy. Low 52F.

Tomorrow: Rain showers in the morning. High 61F. Tomorrow night, showers likely. Low 48F.
");
}

#[test]
fn golden_empty_day() {
    let receipt = full_receipt(&[]);
    insta::assert_snapshot!(receipt.to_plain_text(None), @r"
Wednesday, February 5, 2025
Today's Schedule

No scheduled events today.


Today's Weather

Temperature: 58.3. Feels like 58.0

Today: Cloudy. High 64F. Winds S at 5 to 10 mph.

Tonight: Cloudy. Low 52F.

Tomorrow: Rain showers in the morning. High 61F. Tomorrow night, showers likely. Low 48F.
");
}

#[test]
fn golden_centered_header() {
    let date = NaiveDate::from_ymd_opt(2025, 2, 5).unwrap();
    let mut receipt = Receipt::new();
    receipt.extend(render_header(date));
    // 27 characters centered on a 32-column line.
    assert_eq!(
        receipt.to_plain_text(Some(32)),
        "  Wednesday, February 5, 2025\n"
    );
}
