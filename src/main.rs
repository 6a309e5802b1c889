use anyhow::{Context, Result};
use clap::Parser;
use smartcrop::capture::{FrameSource, StillFrame};
use smartcrop::config::{ResponsePolicy, WorkbenchConfig};
use smartcrop::geometry::{DisplayBox, NativeSize, ViewportPoint};
use smartcrop::output::{OverlaySink, PngSink};
use smartcrop::overlay::ObservedBox;
use smartcrop::playback::{format_time, DEFAULT_FPS};
use smartcrop::segmentation;
use smartcrop::session::Workbench;

/// Width the video element is laid out at unless told otherwise
const DEFAULT_DISPLAY_WIDTH: f64 = 840.0;

#[derive(Parser, Debug)]
#[command(author, version, about = "Click-to-segment overlay and smart crop driver", long_about = None)]
struct Args {
    /// Base address of the segmentation service
    #[arg(long, env = "SMARTCROP_SERVICE_URL", default_value = "http://localhost:8000")]
    service_url: String,

    /// URL of the source video
    #[arg(long)]
    video_url: String,

    /// Pointer X in viewport coordinates
    #[arg(long)]
    click_x: f64,

    /// Pointer Y in viewport coordinates
    #[arg(long)]
    click_y: f64,

    /// Left edge of the video element in the viewport
    #[arg(long, default_value_t = 0.0)]
    box_left: f64,

    /// Top edge of the video element in the viewport
    #[arg(long, default_value_t = 0.0)]
    box_top: f64,

    /// Displayed width of the video element
    #[arg(long, default_value_t = DEFAULT_DISPLAY_WIDTH)]
    display_width: f64,

    /// Displayed height of the video element (derived from the aspect ratio if omitted)
    #[arg(long)]
    display_height: Option<f64>,

    /// Native video width (taken from --frame-image if omitted)
    #[arg(long, requires = "native_height")]
    native_width: Option<u32>,

    /// Native video height (taken from --frame-image if omitted)
    #[arg(long, requires = "native_width")]
    native_height: Option<u32>,

    /// Video duration in seconds (derived from the frame count if omitted)
    #[arg(long)]
    duration: Option<f64>,

    /// Playback position to pause at, in seconds
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Frames per second used to derive frame indices
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,

    /// Still of the paused frame to draw the overlay over
    #[arg(long)]
    frame_image: Option<String>,

    /// Where to write the overlay image
    #[arg(short, long, default_value = "overlay.png")]
    output: String,

    /// Request a smart crop of the selected object afterwards
    #[arg(long)]
    track: bool,

    /// Drop mask responses older than the newest applied one
    #[arg(long)]
    discard_stale: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("smartcrop starting");

    let policy = if args.discard_stale {
        ResponsePolicy::DiscardStale
    } else {
        ResponsePolicy::LastArrivalWins
    };
    let config = WorkbenchConfig::new(&args.service_url)
        .with_fps(args.fps)
        .with_response_policy(policy);

    let service = segmentation::create_default_service(&config.service_url)
        .context("Failed to set up segmentation service client")?;

    let mut source = match &args.frame_image {
        Some(path) => Some(StillFrame::open(path)?),
        None => None,
    };

    let native = match (args.native_width, args.native_height) {
        (Some(width), Some(height)) => Some(NativeSize::new(width, height)),
        _ => source.as_ref().map(|s| s.resolution()),
    };

    let mut workbench = Workbench::new(config, service);
    let mut sink = PngSink::new(&args.output);

    run_selection(&mut workbench, &args, native, source.as_mut(), &mut sink)?;

    if args.track {
        match workbench.track_object() {
            Some(url) => println!("Smart crop: {url}"),
            None => {
                let reason = workbench
                    .session()
                    .notice()
                    .unwrap_or("no mask to track")
                    .to_owned();
                tracing::warn!("Smart crop not produced: {}", reason);
            }
        }
    }

    Ok(())
}

fn run_selection<O>(
    workbench: &mut Workbench,
    args: &Args,
    native: Option<NativeSize>,
    source: Option<&mut StillFrame>,
    sink: &mut O,
) -> Result<()>
where
    O: OverlaySink,
{
    workbench
        .load_asset(&args.video_url)
        .context("Failed to load video")?;

    let fps = workbench.config().fps;
    let duration = args.duration.unwrap_or_else(|| {
        workbench
            .session()
            .asset()
            .and_then(|a| a.video.as_ref())
            .map_or(0.0, |v| v.total_frames as f64 / fps as f64)
    });
    workbench.metadata_loaded(duration, native);
    tracing::info!("Duration: {}", format_time(duration));

    workbench.seek(args.time);
    workbench.pause();

    let height = args.display_height.unwrap_or_else(|| match native {
        Some(n) if !n.is_empty() => args.display_width * n.height as f64 / n.width as f64,
        _ => args.display_width,
    });
    let display = DisplayBox::new(args.box_left, args.box_top, args.display_width, height);

    let pointer = ViewportPoint::new(args.click_x, args.click_y);
    if workbench.click(pointer, display).is_none() {
        tracing::warn!("Click at ({}, {}) is outside the video", pointer.x, pointer.y);
        return Ok(());
    }
    if let Some(report) = workbench.selection_report() {
        println!("{report}");
    }

    let background = match source {
        Some(source) => Some(
            source
                .frame(workbench.session().frame())
                .context("Failed to read frame")?,
        ),
        None => None,
    };

    let observer = ObservedBox::new(display);
    match workbench.render_overlay(&observer) {
        Some(overlay) => sink
            .write_overlay(overlay, background.as_ref())
            .context("Failed to write overlay")?,
        None => tracing::warn!("No mask for this selection, nothing to draw"),
    }

    Ok(())
}
