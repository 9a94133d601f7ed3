//! `chronos-lens`: age or de-age a portrait from the terminal.

mod config;
mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chronos_core::offsets::{PRESET_OFFSETS, SLIDER_MAX, SLIDER_MIN};
use chronos_core::view::STEP_INTERVAL;
use chronos_core::{
    AgeStage, BatchError, BatchOrchestrator, ComparisonSlider, DEFAULT_OFFSET, ETHICS_NOTICE,
    MainView, NoNativeShare, PRIVACY_NOTICE, SessionStore, ShareOutcome, ViewMode,
    init_observability, load_source, main_view, share_result, submit_label, write_all,
    write_focused,
};
use chronos_harness::vendors::gemini::{self, GeminiProvider};
use chronos_harness::{Harness, RequestOptions, TransformationClient};
use clap::{Parser, ValueEnum};
use tracing::info;

const DEFAULT_APP_URL: &str = "https://chronoslens.app";

fn parse_stage(value: &str) -> Result<AgeStage, String> {
    AgeStage::from_name(value).ok_or_else(|| {
        let names: Vec<&str> = AgeStage::ALL.iter().map(|stage| stage.name()).collect();
        format!("unknown stage `{value}` (expected one of: {})", names.join(", "))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Layout {
    Focus,
    Grid,
}

impl From<Layout> for ViewMode {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Focus => ViewMode::Focus,
            Layout::Grid => ViewMode::Grid,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "chronos-lens")]
#[command(about = "Project a portrait into the past or the future", long_about = None)]
struct Cli {
    /// Portrait image path (PNG, JPEG, WebP, ...) or a base64 `data:image/...` URL
    image: String,

    /// Year offset to add to the batch; repeat for several, negative for the past
    #[arg(short = 'o', long = "offset", allow_negative_numbers = true)]
    offsets: Vec<i32>,

    /// Add a life stage to the batch (child, teen, adult, middle-age, elderly, ancient)
    #[arg(long = "stage", value_parser = parse_stage)]
    stages: Vec<AgeStage>,

    /// Add every preset offset to the batch
    #[arg(long)]
    presets: bool,

    /// Single offset used when no batch offsets are given (snapped to steps of 5)
    #[arg(long, default_value_t = DEFAULT_OFFSET, allow_negative_numbers = true,
          value_parser = clap::value_parser!(i32).range(SLIDER_MIN as i64..=SLIDER_MAX as i64))]
    slider: i32,

    /// Directory for downloaded results
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Download every result instead of only the focused one
    #[arg(long)]
    all: bool,

    /// Result layout
    #[arg(long, value_enum, default_value_t = Layout::Focus)]
    view: Layout,

    /// Before/after split position in percent for the focus layout
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
    compare: u8,

    /// Skip the privacy and AI ethics notices
    #[arg(long)]
    no_notice: bool,

    /// Gemini model name
    #[arg(long)]
    model: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Retries per call for transient failures
    #[arg(long)]
    retries: Option<u32>,

    /// Re-run a failed batch from scratch up to this many times
    #[arg(long, default_value_t = 0)]
    retry_batch: u32,

    /// Print share links for the focused result
    #[arg(long)]
    share: bool,

    /// Link included in share text
    #[arg(long, default_value = DEFAULT_APP_URL)]
    app_url: String,
}

impl Cli {
    /// Batch offsets in the order given: explicit offsets, then stages,
    /// presets last, duplicates dropped.
    fn batch_offsets(&self) -> Vec<i32> {
        let presets: &[i32] = if self.presets { &PRESET_OFFSETS[..] } else { &[] };
        let stages = self.stages.iter().map(|stage| stage.offset());
        let mut out: Vec<i32> = Vec::new();
        for offset in self.offsets.iter().copied().chain(stages).chain(presets.iter().copied()) {
            if !out.contains(&offset) {
                out.push(offset);
            }
        }
        out
    }

    fn request_options(&self) -> RequestOptions {
        let mut options = RequestOptions::default();
        if let Some(secs) = self.timeout_secs {
            options.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(retries) = self.retries {
            options.retry_policy = options.retry_policy.with_max_retries(retries);
        }
        options
    }

    fn comparison_slider(&self) -> ComparisonSlider {
        let mut slider = ComparisonSlider::default();
        slider.track(f64::from(self.compare), 0.0, 100.0);
        slider
    }

    fn gemini_config(&self, mut config: gemini::GeminiClientConfig) -> gemini::GeminiClientConfig {
        if let Some(secs) = self.timeout_secs {
            config = config.attempt_timeout(Duration::from_secs(secs));
        }
        config
    }
}

fn print_notices() {
    for line in render::privacy_lines(&PRIVACY_NOTICE) {
        println!("{line}");
    }
    println!();
    for line in render::notice_lines(&ETHICS_NOTICE) {
        println!("{line}");
    }
    println!();
}

fn build_client(cli: &Cli) -> Result<TransformationClient> {
    let config = gemini::GeminiClientConfig::from_env()
        .context("Gemini is not configured (set GEMINI_API_KEY)")?;
    let config = cli.gemini_config(config);
    let harness = Harness::builder()
        .register_provider(Arc::new(GeminiProvider::new(config)?))
        .build()?;
    let model = cli
        .model
        .as_deref()
        .map(gemini::model)
        .unwrap_or_else(gemini::default_model);
    Ok(harness.client_with_options(model, cli.request_options())?)
}

async fn run_batch(orchestrator: &BatchOrchestrator, offsets: Vec<i32>) -> Result<(), BatchError> {
    let total = offsets.len();
    let store = orchestrator.store().clone();
    let mut run = orchestrator.start(offsets)?;
    let started = tokio::time::Instant::now();
    let mut ticker = tokio::time::interval(STEP_INTERVAL);
    loop {
        tokio::select! {
            event = run.next_event() => match event {
                Some(event) => println!("{}", render::event_line(&event, total)),
                None => break,
            },
            _ = ticker.tick() => {
                let view = store.read(|s| main_view(s, ViewMode::Focus, started.elapsed()));
                if let MainView::Processing { step } = view {
                    println!("{}", render::processing_line(step));
                }
            }
        }
    }
    run.finish().await.map(|_| ())
}

async fn run(cli: Cli) -> Result<()> {
    let client = build_client(&cli)?;
    let store = SessionStore::new();
    if !cli.no_notice {
        print_notices();
    }
    if cli.presets {
        println!("Presets: {}", render::preset_chips(&PRESET_OFFSETS));
    }

    let image = load_source(&cli.image).await?;
    store.upload(image)?;
    store.set_current_offset(cli.slider)?;
    for offset in cli.batch_offsets() {
        store.toggle_offset(offset)?;
    }

    let Some(label) = store.read(submit_label) else {
        bail!("nothing to simulate: pass --offset or a non-zero --slider");
    };
    println!("{label}");

    let orchestrator = BatchOrchestrator::new(Arc::new(client), store.clone());
    let mut batch_retries_left = cli.retry_batch;
    loop {
        let offsets = store.read(|s| s.requested_offsets());
        match run_batch(&orchestrator, offsets).await {
            Ok(()) => break,
            Err(BatchError::Failed { .. }) if batch_retries_left > 0 => {
                batch_retries_left -= 1;
                info!(
                    event = "cli.batch_retry",
                    domain = "cli",
                    retries_left = batch_retries_left
                );
                println!("Retrying batch ({batch_retries_left} retries left)");
            }
            Err(BatchError::Failed { .. }) => break,
            Err(err) => return Err(err.into()),
        }
    }

    let session = store.snapshot();
    let view = main_view(&session, cli.view.into(), Duration::ZERO);
    for line in render::main_panel(&view, &session, &cli.comparison_slider()) {
        println!("{line}");
    }

    if session.result_count() > 0 {
        let written = if cli.all {
            write_all(&cli.out, &session)?
        } else {
            vec![write_focused(&cli.out, &session)?]
        };
        for path in written {
            println!("Saved {}", path.display());
        }
    }

    if cli.share
        && let Some(result) = session.focused_result()
    {
        match share_result(&NoNativeShare, result, &cli.app_url).await {
            ShareOutcome::Shared => println!("Shared"),
            ShareOutcome::Fallback(links) => {
                for line in render::share_lines(&links) {
                    println!("{line}");
                }
            }
        }
    }

    if let Some(failure) = session.last_error() {
        bail!("batch stopped at offset {}: {}", failure.offset, failure.message);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    config::init();
    init_observability();
    run(Cli::parse()).await
}
