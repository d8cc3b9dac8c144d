//! Common helpers shared across CLI commands.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use quakereel::app::LoadReport;
use quakereel::config::ConfigFile;
use quakereel::event::format_time_ms;
use quakereel::feed::FeedSelector;
use quakereel::playback::{playback_duration, CompressionRate, MAX_RATE, MIN_RATE};

use crate::error::CliError;

/// Feed from the command line, falling back to `playback.feed`.
pub fn resolve_feed(cli_feed: Option<&str>, config: &ConfigFile) -> Result<FeedSelector, CliError> {
    match cli_feed {
        Some(name) => Ok(name.parse()?),
        None => Ok(config.playback.feed),
    }
}

/// Rate from the command line, falling back to `playback.rate`.
pub fn resolve_rate(cli_rate: Option<&str>, config: &ConfigFile) -> Result<CompressionRate, CliError> {
    match cli_rate {
        Some(value) => parse_rate(value),
        None => Ok(config.playback.rate),
    }
}

/// Parses a rate such as `6`, `6x` or `6h/s`. Out-of-range values clamp.
pub fn parse_rate(value: &str) -> Result<CompressionRate, CliError> {
    value.parse().map_err(|_| {
        CliError::Argument(format!(
            "Invalid rate '{}': expected hours per second between {} and {}",
            value, MIN_RATE, MAX_RATE
        ))
    })
}

/// Formats a duration as `2d 3h 15m`, `4m 10s` or `850ms`.
pub fn format_span(span: Duration) -> String {
    let secs = span.as_secs();
    if secs == 0 {
        return format!("{}ms", span.as_millis());
    }

    let (days, hours, minutes, seconds) =
        (secs / 86_400, secs % 86_400 / 3_600, secs % 3_600 / 60, secs % 60);
    match (days, hours) {
        (0, 0) if minutes == 0 => format!("{}s", seconds),
        (0, 0) => format!("{}m {}s", minutes, seconds),
        (0, _) => format!("{}h {}m", hours, minutes),
        _ => format!("{}d {}h {}m", days, hours, minutes),
    }
}

/// Formats an epoch-ms timestamp in UTC.
pub fn format_fetched_at(time_ms: i64) -> String {
    match Utc.timestamp_millis_opt(time_ms).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "unknown".to_string(),
    }
}

/// Prints the summary block shared by `fetch` and `play`.
pub fn print_load_report(report: &LoadReport, rate: CompressionRate) {
    let summary = &report.summary;

    println!("Feed:      {} ({})", report.selector, report.selector.describe());
    println!(
        "Source:    {} (fetched {})",
        report.source,
        format_fetched_at(report.fetched_at_ms)
    );
    println!("Events:    {}", summary.count);
    if report.skipped > 0 {
        println!("Skipped:   {} malformed features", report.skipped);
    }

    if let (Some(first), Some(last)) = (summary.first_time_ms, summary.last_time_ms) {
        println!("First:     {}", format_time_ms(first));
        println!("Last:      {}", format_time_ms(last));
        println!("Span:      {}", format_span(summary.span()));
    }
    if let Some(max) = summary.max_magnitude {
        println!("Max mag:   M{:.1}", max);
    }
    if !summary.is_empty() {
        println!(
            "Playback:  {} at {}",
            format_span(playback_duration(summary.span(), rate)),
            rate
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quakereel::feed::{MagnitudeThreshold, TimeRange};

    #[test]
    fn test_resolve_feed_prefers_cli() {
        let config = ConfigFile::default();
        assert_eq!(resolve_feed(None, &config).unwrap(), config.playback.feed);
        assert_eq!(
            resolve_feed(Some("4.5_week"), &config).unwrap(),
            FeedSelector::new(MagnitudeThreshold::M4_5, TimeRange::Week)
        );
        assert!(matches!(
            resolve_feed(Some("big_day"), &config),
            Err(CliError::Feed(_))
        ));
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("6").unwrap(), CompressionRate::new(6.0));
        assert_eq!(parse_rate("12x").unwrap(), CompressionRate::new(12.0));
        assert_eq!(parse_rate("100").unwrap().hours_per_second(), MAX_RATE);
        assert!(matches!(parse_rate("quick"), Err(CliError::Argument(_))));
    }

    #[test]
    fn test_format_span() {
        assert_eq!(format_span(Duration::from_millis(850)), "850ms");
        assert_eq!(format_span(Duration::from_secs(45)), "45s");
        assert_eq!(format_span(Duration::from_secs(250)), "4m 10s");
        assert_eq!(format_span(Duration::from_secs(3 * 3600 + 900)), "3h 15m");
        assert_eq!(format_span(Duration::from_secs(7 * 86_400)), "7d 0h 0m");
    }

    #[test]
    fn test_format_fetched_at() {
        assert_eq!(format_fetched_at(0), "1970-01-01 00:00:00 UTC");
    }
}
