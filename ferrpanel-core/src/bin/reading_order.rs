use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use snafu::ResultExt;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ferrpanel_core::analysis::labels::Label;
use ferrpanel_core::consts::*;
use ferrpanel_core::error::{EnvNotFoundSnafu, FerrpanelError, ImageOpenSnafu, JoinSnafu};
use ferrpanel_core::inference::model::session_builder;
use ferrpanel_core::inference::yolo::{PanelYolo, YoloConfig, YoloSession};
use ferrpanel_core::layout::{
    Detections, LayoutConfig, LayoutConfigBuilder, LayoutOutput, RawDetections, ReadingOrder,
    merge::MergeConfig,
    order::OrderConfig,
    pipeline::reading_order,
    render::save_boxes,
    shrink::{ShrinkConfig, ShrinkWrapper},
};

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Parser, Clone)]
#[command(name = "reading-order")]
#[command(about = "Detect manga panels and write them in reading order")]
struct Args {
    #[arg(short, long, help = "Input page image")]
    input: PathBuf,

    #[arg(
        short,
        long,
        default_value = "reading_order.json",
        help = "Output JSON path"
    )]
    output: PathBuf,

    #[arg(long, help = "Panel detector ONNX model (defaults to $FERRPANEL_MODEL_PATH)")]
    model: Option<PathBuf>,

    #[arg(long, help = "Skip detection and read raw boxes from a `{\"boxes\"}` JSON")]
    boxes: Option<PathBuf>,

    #[arg(long, help = "Save a debug image with the ordered boxes")]
    draw: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, help = "Wall-clock budget in seconds")]
    timeout: u64,

    #[arg(long, help = "Order rows left-to-right instead of right-to-left")]
    ltr: bool,

    #[arg(long, help = "Keep detector boxes instead of shrinking them to their ink")]
    no_shrink: bool,

    #[arg(long, default_value_t = MERGE_OVERLAP_THRESHOLD)]
    overlap_threshold: f32,

    #[arg(long, default_value_t = SAME_ROW_RATIO)]
    same_row_ratio: f32,

    #[arg(long, default_value_t = ROW_BREAK_RATIO)]
    row_break_ratio: f32,

    #[arg(long, default_value_t = INK_THRESHOLD)]
    ink_threshold: u8,

    #[arg(long, default_value_t = PROBA_THRESHOLD, help = "Detector confidence threshold")]
    conf: f32,

    #[arg(long, default_value_t = NMS_IOU_THRESHOLD, help = "Detector NMS IoU threshold")]
    iou: f32,

    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        help = "Detector classes to keep (all by default)"
    )]
    labels: Vec<Label>,
}

impl Args {
    fn layout_config(&self) -> Result<LayoutConfig, BoxError> {
        let config = LayoutConfigBuilder::default()
            .merge(MergeConfig {
                overlap_threshold: self.overlap_threshold,
                same_row_ratio: self.same_row_ratio,
            })
            .order(OrderConfig {
                row_break_ratio: self.row_break_ratio,
                rtl: !self.ltr,
            })
            .shrink(ShrinkConfig {
                ink_threshold: self.ink_threshold,
            })
            .shrink_wrap(!self.no_shrink)
            .build()?;

        Ok(config)
    }

    fn yolo_config(&self) -> YoloConfig {
        let labels = if self.labels.is_empty() {
            Label::ALL.to_vec()
        } else {
            self.labels.clone()
        };

        YoloConfig {
            proba_threshold: self.conf,
            iou_threshold: self.iou,
            labels,
            ..YoloConfig::default()
        }
    }

    fn model_path(&self) -> Result<PathBuf, FerrpanelError> {
        match &self.model {
            Some(path) => Ok(path.clone()),
            None => std::env::var(MODEL_PATH_ENV_NAME)
                .map(PathBuf::from)
                .context(EnvNotFoundSnafu {
                    name: MODEL_PATH_ENV_NAME,
                }),
        }
    }
}

/// Runs the panel detector over the page.
fn detect(args: &Args, image: &image::DynamicImage) -> Result<RawDetections, BoxError> {
    let model_path = args.model_path()?;
    info!("Loading panel detector from {}", model_path.display());

    let start_time = Instant::now();
    let model = PanelYolo::with_config(model_path, args.yolo_config());
    let mut session = YoloSession::new(session_builder()?, model)?;
    info!("Detector initialized in {:.2?}", start_time.elapsed());

    let start_time = Instant::now();
    let detections = session.detect(image)?;
    info!(
        "Detected {} boxes in {:.2?}",
        detections.len(),
        start_time.elapsed()
    );

    Ok(RawDetections::from(detections))
}

fn load_boxes(path: &Path) -> Result<RawDetections, BoxError> {
    match Detections::from_path(path)? {
        Detections::Raw(raw) => Ok(raw),
        Detections::Associated(_) => Err(format!(
            "{} holds associated panels; use `inclusive-panels` instead",
            path.display()
        )
        .into()),
    }
}

fn process(args: &Args, config: &LayoutConfig) -> Result<ReadingOrder, BoxError> {
    let input = args.input.to_string_lossy().to_string();
    let image = image::open(&args.input).context(ImageOpenSnafu { path: input })?;
    info!("Loaded page {}x{}", image.width(), image.height());

    let raw = match &args.boxes {
        Some(path) => load_boxes(path)?,
        None => detect(args, &image)?,
    };
    if raw.boxes.is_empty() {
        warn!("No panels detected on {}", args.input.display());
    }

    let wrapper = config
        .shrink_wrap
        .then(|| ShrinkWrapper::from_image(&image, config.shrink));
    let order = reading_order(&raw, wrapper.as_ref(), config);

    if let Some(draw) = &args.draw {
        let boxes: Vec<_> = order.reading_order.iter().map(|p| p.bbox).collect();
        save_boxes(&image, &boxes, draw)?;
        info!("Saved debug rendering to {}", draw.display());
    }

    Ok(order)
}

/// Runs `work` on a blocking thread and gives up on it after `timeout`.
///
/// The runtime is shut down in the background, so an expired run returns
/// `Timeout` right away and the abandoned thread dies with the process.
fn run_with_timeout<T, F>(timeout: Duration, work: F) -> Result<T, BoxError>
where
    F: FnOnce() -> Result<T, BoxError> + Send + 'static,
    T: Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let task = runtime.spawn_blocking(work);
    let result = runtime.block_on(tokio::time::timeout(timeout, task));
    runtime.shutdown_background();

    match result {
        Ok(joined) => joined.context(JoinSnafu)?,
        Err(_) => Err(FerrpanelError::Timeout {
            seconds: timeout.as_secs(),
        }
        .into()),
    }
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.layout_config()?;
    info!("Input page: {}", args.input.display());
    info!(
        "Direction: {}, shrink-wrap: {}",
        if config.order.rtl { "right-to-left" } else { "left-to-right" },
        config.shrink_wrap
    );

    let start_time = Instant::now();
    let seconds = args.timeout;
    let work = {
        let args = args.clone();
        let config = config.clone();
        move || process(&args, &config)
    };

    let order = match run_with_timeout(Duration::from_secs(seconds), work) {
        Ok(order) => order,
        Err(err) => {
            if matches!(
                err.downcast_ref::<FerrpanelError>(),
                Some(FerrpanelError::Timeout { .. })
            ) {
                error!("Processing did not finish within {} seconds", seconds);
                error!(
                    "Hint: downscale the page, pass --boxes to skip detection, or raise --timeout"
                );
            }
            return Err(err);
        }
    };

    let output = LayoutOutput::ReadingOrder(order);
    output.write_json(&args.output)?;
    info!(
        "Saved {} panels to {} in {:.2?}",
        output.len(),
        args.output.display(),
        start_time.elapsed()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_abandons_slow_work() {
        let start = Instant::now();
        let result: Result<(), BoxError> = run_with_timeout(Duration::from_millis(100), || {
            std::thread::sleep(Duration::from_secs(5));
            Ok(())
        });

        assert!(start.elapsed() < Duration::from_secs(2));
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FerrpanelError>(),
            Some(FerrpanelError::Timeout { .. })
        ));
    }

    #[test]
    fn test_timeout_passes_through_result() {
        let value = run_with_timeout(Duration::from_secs(5), || Ok(42)).unwrap();
        assert_eq!(value, 42);

        let err = run_with_timeout::<(), _>(Duration::from_secs(5), || Err("bad input".into()))
            .unwrap_err();
        assert_eq!(err.to_string(), "bad input");
    }
}
