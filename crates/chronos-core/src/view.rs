//! Presentation model derived from a session snapshot.

use std::time::Duration;

use crate::offsets::{offset_label, signed};
use crate::session::Session;

/// Captions cycled while the first result of a batch is pending.
pub const PROCESSING_STEPS: [&str; 8] = [
    "Analyzing facial landmarks...",
    "Identifying unique identifiers...",
    "Simulating temporal biological shifts...",
    "Applying skin texture transformations...",
    "Recalculating structural pigments...",
    "Preserving identity features...",
    "Rendering final age projection...",
    "Polishing temporal details...",
];

/// How long each processing caption stays up.
pub const STEP_INTERVAL: Duration = Duration::from_millis(2_500);

/// Results layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Single focused result in before/after comparison.
    #[default]
    Focus,
    /// Every result as a timeline grid, past to future.
    Grid,
}

/// What occupies the main panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainView {
    /// No results and no error.
    Standby,
    /// Processing with nothing to show yet.
    Processing { step: usize },
    /// At least one result exists; `processing` adds a queue indicator.
    Results { mode: ViewMode, processing: bool },
    /// The last batch failed before producing anything to show.
    Failure { message: String },
}

/// Picks the main panel.
///
/// Results win over the failure view, so a batch that failed half way keeps
/// showing what it produced.
pub fn main_view(session: &Session, mode: ViewMode, elapsed: Duration) -> MainView {
    if session.is_processing() && session.focused_offset().is_none() {
        return MainView::Processing {
            step: processing_step(elapsed),
        };
    }
    if session.result_count() > 0 {
        return MainView::Results {
            mode,
            processing: session.is_processing(),
        };
    }
    if let Some(message) = session.last_error_message() {
        return MainView::Failure {
            message: message.to_string(),
        };
    }
    MainView::Standby
}

/// Index into [`PROCESSING_STEPS`] after `elapsed` processing time.
pub fn processing_step(elapsed: Duration) -> usize {
    let ticks = elapsed.as_millis() / STEP_INTERVAL.as_millis();
    (ticks % PROCESSING_STEPS.len() as u128) as usize
}

/// Fill fraction of the progress bar for a caption index.
pub fn step_progress(step: usize) -> f64 {
    (step % PROCESSING_STEPS.len() + 1) as f64 / PROCESSING_STEPS.len() as f64
}

/// Label of the submit button, or `None` when it is disabled.
pub fn submit_label(session: &Session) -> Option<String> {
    if session.is_processing() {
        return None;
    }
    let selected = session.selected_offsets().len();
    if selected > 0 {
        return Some(format!("Process {selected} Ages"));
    }
    let current = session.current_offset();
    if current == 0 {
        return None;
    }
    Some(format!("Simulate {} Years", signed(current)))
}

/// Headline for the focused result.
pub fn projection_title(offset: i32) -> String {
    format!("Projection: {}", offset_label(offset))
}

/// One tile of the timeline grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub offset: i32,
    pub caption: String,
    pub focused: bool,
}

/// Timeline tiles ordered past to future.
pub fn timeline(session: &Session) -> Vec<TimelineEntry> {
    let focused = session.focused_offset();
    session
        .results()
        .map(|result| TimelineEntry {
            offset: result.offset,
            caption: format!("{} YRS", signed(result.offset)),
            focused: focused == Some(result.offset),
        })
        .collect()
}

/// Before/after slider over the comparison view.
///
/// The generated image sits on top of the original and is clipped from the
/// right, so only the left `position` percent of it shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonSlider {
    position: f64,
}

impl Default for ComparisonSlider {
    fn default() -> Self {
        Self { position: 50.0 }
    }
}

impl ComparisonSlider {
    /// Slider position in percent, `0.0..=100.0`.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Moves the handle to pointer `x` inside a container spanning
    /// `left..left + width`.
    pub fn track(&mut self, x: f64, left: f64, width: f64) {
        if width <= 0.0 {
            return;
        }
        let relative = (x - left).clamp(0.0, width);
        self.position = relative / width * 100.0;
    }

    /// CSS clip for the overlay image.
    pub fn clip_path(&self) -> String {
        format!("inset(0 {}% 0 0)", 100.0 - self.position)
    }
}
