//! proximity_monitor - zone proximity monitor daemon
//!
//! This daemon:
//! 1. Ingests frames from the configured source (synthetic, raw stream, images, V4L2)
//! 2. Segments the target color and locates the largest object
//! 3. Classifies the object's distance to the danger zone as SAFE / WARNING / DANGER
//! 4. Shows the state on the terminal, and optionally emits JSON transitions and
//!    annotated DANGER snapshots

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use proximity_guard::annotate::save_snapshot;
use proximity_guard::pipeline::write_json_line;
use proximity_guard::{
    annotate, open_source, render, ui, ColorBlobBackend, FpsMeter, MonitorConfig,
    MonitorPipeline, SafetyState,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file (.toml, otherwise JSON).
    #[arg(long, env = "PROXIMITY_CONFIG")]
    config: Option<PathBuf>,
    /// Frame source URL (stub://name, raw:path, images:dir, /dev/videoN).
    #[arg(long)]
    source: Option<String>,
    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,
    /// Write an annotated PNG each time the state enters DANGER.
    #[arg(long, value_name = "DIR")]
    snapshot_dir: Option<PathBuf>,
    /// Print state transitions to stdout as JSON lines.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let is_tty = std::io::stderr().is_terminal();
    let stdout_is_tty = std::io::stdout().is_terminal();
    let ui = ui::Ui::from_args(Some(&args.ui), is_tty, !stdout_is_tty);

    let mut cfg = MonitorConfig::load_from(args.config.as_deref())?;
    if let Some(source) = args.source {
        cfg.source.url = source;
    }
    if let Some(dir) = &args.snapshot_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create snapshot directory {}", dir.display()))?;
    }

    let (width, height) = (cfg.frame.width, cfg.frame.height);
    let mut source = {
        let _stage = ui.stage("connecting frame source");
        let mut source = open_source(&cfg.source, width, height)?;
        source.connect()?;
        source
    };

    let mut pipeline = MonitorPipeline::new(
        ColorBlobBackend::new(cfg.detector.clone()),
        cfg.zone,
        cfg.thresholds,
    );
    pipeline.warm_up(width, height)?;

    let quit = Arc::new(AtomicBool::new(false));
    let quit_flag = Arc::clone(&quit);
    ctrlc::set_handler(move || {
        quit_flag.store(true, Ordering::SeqCst);
    })
    .expect("error setting Ctrl-C handler");

    let [x1, y1, x2, y2] = cfg.zone.as_rect();
    log::info!(
        "proximity_monitor running. source={} frame={}x{} mirror={}",
        cfg.source.url,
        width,
        height,
        cfg.frame.mirror
    );
    log::info!(
        "zone=({}, {}, {}, {}) danger<={} warning<={} min_area={}",
        x1,
        y1,
        x2,
        y2,
        cfg.thresholds.danger(),
        cfg.thresholds.warning(),
        cfg.detector.min_area
    );

    let frame_interval = (cfg.source.target_fps > 0)
        .then(|| Duration::from_secs_f64(1.0 / f64::from(cfg.source.target_fps)));
    let mut fps = FpsMeter::default();
    let mut status = ui.status_line();
    let mut last_health_log = Instant::now();
    let mut danger_entries = 0u64;

    loop {
        if quit.load(Ordering::SeqCst) {
            log::info!("shutdown signal received, stopping");
            break;
        }
        if args.max_frames.is_some_and(|max| fps.total_frames() >= max) {
            log::info!("processed {} frames, stopping", fps.total_frames());
            break;
        }

        let started = Instant::now();
        let Some(mut frame) = source.next_frame()? else {
            log::info!("end of stream after {} frames", fps.total_frames());
            break;
        };
        if (frame.width, frame.height) != (width, height) {
            return Err(anyhow!(
                "source delivered a {}x{} frame, session is {}x{}",
                frame.width,
                frame.height,
                width,
                height
            ));
        }
        if cfg.frame.mirror {
            frame.mirror_horizontal();
        }

        let outcome = pipeline.process(&frame)?;
        let current_fps = fps.tick();
        let overlay = annotate(&outcome, pipeline.zone(), width, height, current_fps);

        if status.update(&outcome, &overlay) {
            if args.json {
                write_json_line(&mut std::io::stdout().lock(), &outcome)?;
            }
            if outcome.state == SafetyState::Danger {
                danger_entries += 1;
                if let Some(dir) = &args.snapshot_dir {
                    render(&overlay, &mut frame);
                    match save_snapshot(&frame, dir) {
                        Ok(path) => log::info!("danger snapshot written to {}", path.display()),
                        Err(e) => log::warn!("danger snapshot failed: {:#}", e),
                    }
                }
            }
        }

        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let stats = source.stats();
            log::info!(
                "source health={} frames={} fps={:.2} danger_entries={} url={}",
                source.is_healthy(),
                stats.frames_captured,
                fps.fps(),
                danger_entries,
                stats.url
            );
            last_health_log = Instant::now();
        }

        if let Some(interval) = frame_interval {
            if let Some(rest) = interval.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }

    status.finish();
    Ok(())
}
