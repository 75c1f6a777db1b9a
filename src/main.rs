use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use viewfinder::{
    save_capture, AnimationDriver, CameraBackend, EventBus, FrameQueue, GestureTrace,
    StillImageCamera, TestPatternCamera, Viewfinder, ViewfinderConfig,
};

#[derive(Parser, Debug)]
#[command(name = "viewfinder")]
#[command(about = "Pinch-zoom camera viewfinder with viewport-exact capture")]
#[command(version)]
#[command(long_about = "Drives a pinch-zoom camera viewfinder from a recorded gesture trace, \
lets inertia settle, then captures a still cropped to exactly what the viewport showed. \
Uses a still image as the camera when --image is given and a test pattern otherwise.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "viewfinder.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Gesture trace to replay before capturing
    #[arg(short, long, value_name = "JSON")]
    trace: Option<PathBuf>,

    /// Serve this image as the camera feed
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// Viewport size as WIDTHxHEIGHT
    #[arg(long, value_name = "WxH", value_parser = parse_viewport)]
    viewport: Option<(f64, f64)>,

    /// Override the capture output directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<String>,

    /// Capture without writing files
    #[arg(long)]
    no_save: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    let _log_guard = init_logging(&args)?;

    info!("Starting viewfinder v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let mut config = match ViewfinderConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(output) = &args.output {
        config.capture.path = output.clone();
    }

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                info!("Configuration validation successful");
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }
    config.validate()?;

    let trace = match &args.trace {
        Some(path) => GestureTrace::load(path).await?,
        None => {
            warn!("No gesture trace given, capturing the initial view");
            GestureTrace::default()
        }
    };

    match &args.image {
        Some(path) => run_session(config, StillImageCamera::new(path), &trace, &args).await,
        None => {
            let (width, height) = config.camera.resolution;
            run_session(config, TestPatternCamera::new(width, height), &trace, &args).await
        }
    }
}

async fn run_session<B: CameraBackend>(
    config: ViewfinderConfig,
    backend: B,
    trace: &GestureTrace,
    args: &Args,
) -> Result<()> {
    let event_bus = if args.debug {
        EventBus::with_debug_logging(config.system.event_bus_capacity)
    } else {
        EventBus::new(config.system.event_bus_capacity)
    };
    let driver = AnimationDriver::from_config(&config.gesture);
    let capture_config = config.capture.clone();

    let mut viewfinder = Viewfinder::new(config, backend, FrameQueue::new(), event_bus)?;
    viewfinder.start_camera().map_err(|e| {
        error!("Failed to start camera: {}", e);
        e
    })?;

    if let Some((width, height)) = args.viewport {
        viewfinder.set_viewport(width, height);
    }

    let replayed = trace.replay(&mut viewfinder);
    let settled = viewfinder.settle(&driver).await;
    info!(
        "Replayed {} steps ({} frames), settled after {} more",
        trace.steps.len(),
        replayed,
        settled
    );

    let still = viewfinder.capture()?;

    if !args.no_save {
        let saved = save_capture(&still.frame, &still.jpeg, &capture_config).await?;
        info!("Capture written to {}", saved.image_path.display());
    }

    let metadata =
        serde_json::to_string_pretty(&still.frame).context("Failed to serialize capture")?;
    println!("{}", metadata);

    viewfinder.stop_camera();
    Ok(())
}

fn parse_viewport(value: &str) -> std::result::Result<(f64, f64), String> {
    let (width, height) = value
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;

    let width: f64 = width.trim().parse().map_err(|e| format!("bad width: {}", e))?;
    let height: f64 = height.trim().parse().map_err(|e| format!("bad height: {}", e))?;
    if width <= 0.0 || height <= 0.0 {
        return Err(format!("viewport must be positive, got {}x{}", width, height));
    }
    Ok((width, height))
}

fn init_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("viewfinder={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    let (file_layer, guard) = match &args.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "viewfinder.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(file_layer)
        .with(env_filter)
        .init();

    Ok(guard)
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# Viewfinder Configuration File");
    println!("# This is the default configuration with all available options");
    println!();
    println!("{}", toml::to_string_pretty(&ViewfinderConfig::default())?);
    Ok(())
}
