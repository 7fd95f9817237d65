//! The print command: today's schedule and weather on the receipt printer.
//!
//! By default the header and schedule are sent to the printer before the
//! weather is fetched, so a weather failure leaves the schedule printed.
//! With `all_or_nothing` both fetches complete before the printer is opened.

use std::io;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use dayprint_core::{
    Event, PrintInstruction, RenderOptions, TimeWindow, WeatherReport, render_header,
    render_schedule, render_weather,
};
use dayprint_printer::{PrintSink, TextSink};
use dayprint_providers::google::GoogleProvider;
use dayprint_providers::weather::WundergroundClient;
use dayprint_providers::{CalendarProvider, WeatherProvider, fetch_todays_events};

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Everything a print run needs besides its providers and sink.
#[derive(Debug, Clone)]
pub struct PrintJob {
    /// Date printed in the header.
    pub date: NaiveDate,
    /// Interval whose events are listed.
    pub window: TimeWindow,
    pub calendar_ids: Vec<String>,
    pub render: RenderOptions,
    pub all_or_nothing: bool,
}

impl PrintJob {
    /// Builds the job for the current local date.
    pub fn for_today(config: &ClientConfig, all_or_nothing: bool) -> ClientResult<Self> {
        let date = Local::now().date_naive();
        let hour = config.google.day_start_hour()?;
        let window = TimeWindow::for_date_at_utc_hour(date, hour).ok_or_else(|| {
            ClientError::Config(format!("no day window for {} at {:02}:00Z", date, hour))
        })?;

        Ok(Self {
            date,
            window,
            calendar_ids: config.google.calendar_ids(),
            render: config.display.render_options(),
            all_or_nothing: all_or_nothing || config.print.all_or_nothing,
        })
    }
}

/// Opens the sink the receipt is written to.
pub type SinkOpener<'a> = Box<dyn FnOnce() -> ClientResult<Box<dyn PrintSink>> + 'a>;

/// Builds the providers and the sink from configuration and prints.
pub async fn run(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let job = PrintJob::for_today(config, cli.all_or_nothing)?;

    let calendar = GoogleProvider::new(config.google.to_provider_config()?, cli.auth_flow())?;
    let weather = WundergroundClient::new(config.weather.to_provider_config()?)?;

    let open_sink: SinkOpener<'_> = if cli.dry_run {
        let width = config.printer.width;
        Box::new(move || -> ClientResult<Box<dyn PrintSink>> {
            Ok(Box::new(TextSink::new(io::stdout(), Some(width))))
        })
    } else {
        config.printer.validate()?;
        let settings = config.printer.serial_settings();
        Box::new(move || -> ClientResult<Box<dyn PrintSink>> {
            Ok(Box::new(settings.open_printer()?))
        })
    };

    print_day(&calendar, &weather, &job, open_sink).await?;
    info!("printed receipt for {}", job.date);
    Ok(())
}

/// Fetches, renders and prints one day.
pub async fn print_day(
    calendar: &dyn CalendarProvider,
    weather: &dyn WeatherProvider,
    job: &PrintJob,
    open_sink: SinkOpener<'_>,
) -> ClientResult<()> {
    if job.all_or_nothing {
        let events = fetch_events(calendar, job).await?;
        let report = fetch_weather(weather).await?;

        let mut sink = open_sink()?;
        sink.execute_all(&schedule_instructions(job, &events))?;
        sink.execute_all(&render_weather(&report))?;
        sink.finish()?;
        return Ok(());
    }

    let mut sink = open_sink()?;
    let events = fetch_events(calendar, job).await?;
    sink.execute_all(&schedule_instructions(job, &events))?;

    let report = match fetch_weather(weather).await {
        Ok(report) => report,
        Err(e) => {
            // The schedule is already on paper; make sure it all went out.
            sink.finish()?;
            return Err(e);
        }
    };
    sink.execute_all(&render_weather(&report))?;
    sink.finish()?;
    Ok(())
}

async fn fetch_events(calendar: &dyn CalendarProvider, job: &PrintJob) -> ClientResult<Vec<Event>> {
    let events = fetch_todays_events(calendar, &job.calendar_ids, job.window).await?;
    debug!(count = events.len(), "events for {}", job.date);
    Ok(events)
}

async fn fetch_weather(weather: &dyn WeatherProvider) -> ClientResult<WeatherReport> {
    let report = weather.fetch().await?;
    debug!(
        provider = weather.name(),
        "weather for {}: {}",
        report.place(),
        report.condition
    );
    Ok(report)
}

fn schedule_instructions(job: &PrintJob, events: &[Event]) -> Vec<PrintInstruction> {
    let mut instructions = render_header(job.date);
    instructions.extend(render_schedule(events, &job.render));
    instructions
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, FixedOffset};
    use dayprint_core::{Forecast, plain_text};
    use dayprint_printer::PrinterResult;
    use dayprint_providers::{
        BoxFuture, FetchOptions, FetchResult, ProviderError, ProviderResult, RawEvent,
        RawEventTime,
    };

    type Log = Arc<Mutex<Vec<PrintInstruction>>>;

    struct RecordingSink {
        log: Log,
        finished: Arc<Mutex<bool>>,
    }

    impl PrintSink for RecordingSink {
        fn execute(&mut self, instruction: &PrintInstruction) -> PrinterResult<()> {
            self.log.lock().unwrap().push(instruction.clone());
            Ok(())
        }

        fn finish(&mut self) -> PrinterResult<()> {
            *self.finished.lock().unwrap() = true;
            Ok(())
        }
    }

    struct Recorder {
        log: Log,
        finished: Arc<Mutex<bool>>,
        opened: Arc<Mutex<bool>>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                log: Arc::default(),
                finished: Arc::default(),
                opened: Arc::default(),
            }
        }

        fn opener(&self) -> SinkOpener<'static> {
            let log = self.log.clone();
            let finished = self.finished.clone();
            let opened = self.opened.clone();
            Box::new(move || -> ClientResult<Box<dyn PrintSink>> {
                *opened.lock().unwrap() = true;
                Ok(Box::new(RecordingSink { log, finished }))
            })
        }

        fn text(&self) -> String {
            plain_text(&self.log.lock().unwrap(), None)
        }
    }

    struct CannedCalendar(Vec<RawEvent>);

    impl CalendarProvider for CannedCalendar {
        fn name(&self) -> &str {
            "canned"
        }

        fn fetch_events(&self, options: FetchOptions) -> BoxFuture<'_, ProviderResult<FetchResult>> {
            let events = self
                .0
                .iter()
                .filter(|e| options.calendar_ids.contains(&e.calendar_id))
                .cloned()
                .collect();
            Box::pin(async move { Ok(FetchResult::with_events(events)) })
        }

        fn is_authenticated(&self) -> bool {
            true
        }
    }

    /// Calendar whose credential was rejected.
    struct RejectedCalendar;

    impl CalendarProvider for RejectedCalendar {
        fn name(&self) -> &str {
            "google"
        }

        fn fetch_events(&self, _options: FetchOptions) -> BoxFuture<'_, ProviderResult<FetchResult>> {
            Box::pin(async {
                Err(ProviderError::authentication("run `dayprint auth google`")
                    .with_provider("google"))
            })
        }

        fn is_authenticated(&self) -> bool {
            false
        }
    }

    enum CannedWeather {
        Report(WeatherReport),
        Unreachable,
    }

    impl WeatherProvider for CannedWeather {
        fn name(&self) -> &str {
            "canned-weather"
        }

        fn fetch(&self) -> BoxFuture<'_, ProviderResult<WeatherReport>> {
            let result = match self {
                Self::Report(report) => Ok(report.clone()),
                Self::Unreachable => Err(ProviderError::network("connection refused")),
            };
            Box::pin(async move { result })
        }
    }

    fn at(s: &str) -> RawEventTime {
        RawEventTime::DateTime(DateTime::<FixedOffset>::parse_from_rfc3339(s).unwrap())
    }

    fn raw(id: &str, summary: &str, start: &str, end: &str, calendar: &str) -> RawEvent {
        RawEvent::new(id, at(start), at(end), calendar).with_summary(summary)
    }

    fn job(all_or_nothing: bool) -> PrintJob {
        let date = NaiveDate::from_ymd_opt(2025, 2, 5).unwrap();
        PrintJob {
            date,
            window: TimeWindow::for_date_at_utc_hour(date, 5).unwrap(),
            calendar_ids: vec!["school".to_string(), "personal".to_string()],
            render: RenderOptions::default(),
            all_or_nothing,
        }
    }

    fn calendar() -> CannedCalendar {
        CannedCalendar(vec![
            raw(
                "1",
                "Lunch",
                "2025-02-05T12:00:00-06:00",
                "2025-02-05T13:00:00-06:00",
                "personal",
            ),
            raw(
                "2",
                "Class",
                "2025-02-05T09:00:00-06:00",
                "2025-02-05T10:15:00-06:00",
                "school",
            ),
            raw(
                "3",
                "Hidden",
                "2025-02-05T08:00:00-06:00",
                "2025-02-05T09:00:00-06:00",
                "other",
            ),
        ])
    }

    fn report() -> WeatherReport {
        WeatherReport {
            city: "Irving".to_string(),
            state: "TX".to_string(),
            temp_f: "71.5".to_string(),
            feels_like_f: "72".to_string(),
            condition: "Clear".to_string(),
            precip_today_in: None,
            icon_url: None,
            forecast: Forecast {
                today: "Sunny.".to_string(),
                tonight: "Clear.".to_string(),
                tomorrow: "Windy.".to_string(),
                tomorrow_night: "Rain likely.".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn prints_schedule_then_weather() {
        let recorder = Recorder::new();
        print_day(
            &calendar(),
            &CannedWeather::Report(report()),
            &job(false),
            recorder.opener(),
        )
        .await
        .unwrap();

        let text = recorder.text();
        assert!(text.starts_with("Wednesday, February 5, 2025\n"));
        let class = text.find("Class\n9:00AM - 10:15AM\n").unwrap();
        let lunch = text.find("Lunch\n12:00PM - 1:00PM\n").unwrap();
        let weather = text.find("Today's Weather").unwrap();
        assert!(class < lunch && lunch < weather);
        assert!(!text.contains("Hidden"));
        assert!(text.contains("Tomorrow: Windy. Tomorrow night, rain likely.\n"));
        assert!(*recorder.finished.lock().unwrap());

        let log = recorder.log.lock().unwrap();
        assert_eq!(log.last(), Some(&PrintInstruction::Feed(2)));
    }

    #[tokio::test]
    async fn weather_failure_leaves_schedule_printed() {
        let recorder = Recorder::new();
        let err = print_day(
            &calendar(),
            &CannedWeather::Unreachable,
            &job(false),
            recorder.opener(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::Network(_)));
        let text = recorder.text();
        assert!(text.contains("Today's Schedule"));
        assert!(text.contains("Lunch"));
        assert!(!text.contains("Today's Weather"));
        assert!(*recorder.finished.lock().unwrap());
    }

    #[tokio::test]
    async fn all_or_nothing_prints_nothing_on_weather_failure() {
        let recorder = Recorder::new();
        let err = print_day(
            &calendar(),
            &CannedWeather::Unreachable,
            &job(true),
            recorder.opener(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::Network(_)));
        assert!(!*recorder.opened.lock().unwrap());
        assert!(recorder.log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn all_or_nothing_success_matches_partial_output() {
        let partial = Recorder::new();
        print_day(
            &calendar(),
            &CannedWeather::Report(report()),
            &job(false),
            partial.opener(),
        )
        .await
        .unwrap();

        let whole = Recorder::new();
        print_day(
            &calendar(),
            &CannedWeather::Report(report()),
            &job(true),
            whole.opener(),
        )
        .await
        .unwrap();

        assert_eq!(*partial.log.lock().unwrap(), *whole.log.lock().unwrap());
    }

    #[tokio::test]
    async fn calendar_failure_prints_nothing() {
        let recorder = Recorder::new();
        let err = print_day(
            &RejectedCalendar,
            &CannedWeather::Report(report()),
            &job(false),
            recorder.opener(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::Auth(_)));
        assert!(recorder.log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sink_open_failure_is_reported() {
        let opener: SinkOpener<'static> = Box::new(|| -> ClientResult<Box<dyn PrintSink>> {
            Err(ClientError::Device(
                dayprint_printer::PrinterError::UnsupportedBaud(1200),
            ))
        });
        let err = print_day(
            &calendar(),
            &CannedWeather::Report(report()),
            &job(false),
            opener,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClientError::Device(_)));
    }

    #[tokio::test]
    async fn empty_day_uses_configured_text() {
        let recorder = Recorder::new();
        let mut job = job(false);
        job.render.no_events_text = "Free day!".to_string();
        print_day(
            &CannedCalendar(vec![]),
            &CannedWeather::Report(report()),
            &job,
            recorder.opener(),
        )
        .await
        .unwrap();
        assert!(recorder.text().contains("Today's Schedule\n\nFree day!\n"));
    }
}
