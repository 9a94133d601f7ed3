//! Plain-text rendering of the presentation model.

use chronos_core::notice::PRIVACY_ACKNOWLEDGE;
use chronos_core::offsets::{preset_hint, signed};
use chronos_core::share::ShareLinks;
use chronos_core::view::{PROCESSING_STEPS, projection_title, step_progress};
use chronos_core::{
    AgeStage, BatchEvent, ComparisonSlider, MainView, Notice, Session, ViewMode, timeline,
};

const BAR_WIDTH: usize = 24;

pub fn notice_lines(notice: &Notice) -> Vec<String> {
    let mut lines = vec![notice.title.to_uppercase()];
    if let Some(subtitle) = notice.subtitle {
        lines.push(subtitle.to_string());
    }
    lines.push(notice.body.to_string());
    lines.extend(notice.points.iter().map(|point| format!("  - {point}")));
    lines
}

/// Privacy notice followed by the acknowledgement line.
pub fn privacy_lines(notice: &Notice) -> Vec<String> {
    let mut lines = notice_lines(notice);
    lines.push(format!("[{PRIVACY_ACKNOWLEDGE}]"));
    lines
}

/// `-20 Past (child)  -10 Past (teen)  +10 Future ...`
pub fn preset_chips(offsets: &[i32]) -> String {
    offsets
        .iter()
        .map(|&offset| match AgeStage::from_offset(offset) {
            Some(stage) => format!("{} {} ({})", signed(offset), preset_hint(offset), stage.name()),
            None => format!("{} {}", signed(offset), preset_hint(offset)),
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn event_line(event: &BatchEvent, total: usize) -> String {
    match event {
        BatchEvent::Started { total, .. } => format!("Traveling through {total} point(s) in time"),
        BatchEvent::OffsetStarted { index, offset } => {
            format!("[{}/{total}] {} years ...", index + 1, signed(*offset))
        }
        BatchEvent::ResultPublished { index, offset } => {
            format!("[{}/{total}] {} years ready", index + 1, signed(*offset))
        }
        BatchEvent::Completed { published } => {
            format!("Done: {} transformation(s)", published.len())
        }
        BatchEvent::Failed { failure } => format!(
            "Stopped at {} years ({}): {}",
            signed(failure.offset),
            failure.kind.as_str(),
            failure.message
        ),
    }
}

pub fn processing_line(step: usize) -> String {
    let filled = (step_progress(step) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        PROCESSING_STEPS[step % PROCESSING_STEPS.len()]
    )
}

/// Lines for the main panel once the batch has settled.
pub fn main_panel(view: &MainView, session: &Session, slider: &ComparisonSlider) -> Vec<String> {
    match view {
        MainView::Standby => vec!["Upload a portrait and choose a point in time.".into()],
        MainView::Processing { step } => vec![processing_line(*step)],
        MainView::Failure { message } => vec![
            "Temporal anomaly".into(),
            message.clone(),
            "Re-run with --retry-batch to try the same ages again.".into(),
        ],
        MainView::Results { mode, processing } => {
            let mut lines = match mode {
                ViewMode::Focus => focus_lines(session, slider),
                ViewMode::Grid => grid_lines(session),
            };
            if *processing {
                lines.push("More ages are still in the queue...".into());
            }
            lines
        }
    }
}

fn focus_lines(session: &Session, slider: &ComparisonSlider) -> Vec<String> {
    let Some(result) = session.focused_result() else {
        return Vec::new();
    };
    vec![
        projection_title(result.offset),
        format!(
            "{} bytes, {} (compare clip {})",
            result.image.len(),
            result.image.mime_type(),
            slider.clip_path()
        ),
    ]
}

fn grid_lines(session: &Session) -> Vec<String> {
    timeline(session)
        .into_iter()
        .map(|entry| {
            let marker = if entry.focused { "*" } else { " " };
            format!("{marker} {}", entry.caption)
        })
        .collect()
}

pub fn share_lines(links: &ShareLinks) -> Vec<String> {
    vec![
        links.text.clone(),
        format!("Twitter:  {}", links.twitter),
        format!("Facebook: {}", links.facebook),
        format!("Link:     {}", links.app_url),
    ]
}
