//! Terminal render sink.
//!
//! Each emitted event becomes one colored line above a progress bar. When
//! stderr is not a terminal the bar is hidden and lines go to stdout as
//! plain text.

use console::{style, Color, Term};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use quakereel::event::{format_time_ms, Event};
use quakereel::playback::RenderSink;

const BAR_TEMPLATE: &str = "{bar:40.cyan/blue} {pos:>5}/{len:5} {msg}";

/// Prints events and playback progress to the terminal.
pub struct TerminalRenderer {
    bar: ProgressBar,
    interactive: bool,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        let interactive = Term::stderr().is_term();
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .map(|s| s.progress_chars("=> "))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar, interactive }
    }

    /// Shows the progress bar for a dataset of `total` events.
    pub fn prepare(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        if self.interactive {
            self.bar.set_draw_target(ProgressDrawTarget::stderr());
        }
    }

    /// Prints a line without tearing the progress bar.
    pub fn println(&self, line: impl AsRef<str>) {
        if self.interactive {
            self.bar.println(line);
        } else {
            println!("{}", line.as_ref());
        }
    }

    /// Removes the progress bar.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for TerminalRenderer {
    fn on_emit(&self, event: &Event) {
        self.println(format_event_line(event));
    }

    fn on_clear(&self) {
        self.bar.set_position(0);
        self.bar.set_message("");
    }

    fn on_progress(&self, emitted: usize, current_time_ms: i64) {
        self.bar.set_position(emitted as u64);
        self.bar.set_message(format_time_ms(current_time_ms));
    }
}

/// Color band for a magnitude.
pub fn magnitude_color(magnitude: f64) -> Color {
    if magnitude >= 4.5 {
        Color::Red
    } else if magnitude >= 2.5 {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// One event as a terminal line: time, magnitude, depth, place.
pub fn format_event_line(event: &Event) -> String {
    let magnitude = style(format!("M{:>4.1}", event.magnitude)).fg(magnitude_color(event.magnitude));
    let magnitude = if event.magnitude >= 6.0 {
        magnitude.bold()
    } else {
        magnitude
    };

    format!(
        "{}  {}  {:>6.1} km  {}",
        style(format_time_ms(event.time_ms)).dim(),
        magnitude,
        event.location.depth_km,
        event.description
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use quakereel::event::Location;

    fn event(magnitude: f64) -> Event {
        Event {
            id: "nc1".to_string(),
            time_ms: 0,
            magnitude,
            location: Location {
                latitude: 37.5,
                longitude: -122.0,
                depth_km: 7.25,
            },
            description: "5km N of Somewhere, CA".to_string(),
        }
    }

    #[test]
    fn test_magnitude_bands() {
        assert_eq!(magnitude_color(1.2), Color::Green);
        assert_eq!(magnitude_color(2.5), Color::Yellow);
        assert_eq!(magnitude_color(4.5), Color::Red);
        assert_eq!(magnitude_color(7.1), Color::Red);
    }

    #[test]
    fn test_event_line_contents() {
        let line = format_event_line(&event(3.4));
        let plain = console::strip_ansi_codes(&line);
        assert!(plain.starts_with("1970-01-01T00:00:00Z"));
        assert!(plain.contains("M 3.4"));
        assert!(plain.contains("7.2 km") || plain.contains("7.3 km"));
        assert!(plain.ends_with("5km N of Somewhere, CA"));
    }

    #[test]
    fn test_progress_updates_bar() {
        let renderer = TerminalRenderer::new();
        renderer.prepare(10);
        renderer.on_progress(4, 0);
        assert_eq!(renderer.bar.position(), 4);
        renderer.on_clear();
        assert_eq!(renderer.bar.position(), 0);
    }
}
