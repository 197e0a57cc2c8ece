use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::{info, warn};
use wsprdds::{corrected_sample_rate, Synthesizer, SystemClock};
use wsprdds_device::{AudioSink, RawSink, SampleSink};

mod config;

use config::Args;

const STOP_POLL: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    let args = Args::parse();
    stderrlog::new()
        .module(module_path!())
        .module("wsprdds")
        .module("wsprdds_device")
        .quiet(false)
        .verbosity(2 + args.verbose as usize)
        .timestamp(stderrlog::Timestamp::Second)
        .init()?;

    let schedule = args.schedule().context("invalid configuration")?;
    let synth =
        Synthesizer::new(args.synth_config(), schedule).context("invalid configuration")?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        let main_thread = std::thread::current();
        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
            main_thread.unpark();
        })
        .context("failed to set Ctrl-C handler")?;
    }

    let sink: Box<dyn SampleSink> = match &args.raw {
        Some(path) => Box::new(
            RawSink::start(
                open_raw(path)?,
                synth,
                SystemClock,
                args.channels as usize,
                args.fs,
            )
            .context("starting raw output failed")?,
        ),
        None => Box::new(
            AudioSink::start(synth, SystemClock, args.device.as_deref(), args.fs)
                .context("starting audio output failed")?,
        ),
    };

    let reported = sink.sample_rate_hz();
    let fs_exact = corrected_sample_rate(reported as f64, args.ppm);
    info!(
        "reported sample rate: {} Hz, corrected: {:.1} Hz",
        reported, fs_exact
    );
    if let Err(err) = calibrate(sink.as_ref(), fs_exact) {
        if let Err(stop_err) = sink.stop() {
            warn!("{}", stop_err);
        }
        return Err(err);
    }

    info!("started transmitting");
    while running.load(Ordering::SeqCst) && sink.is_running() {
        std::thread::park_timeout(STOP_POLL);
    }

    info!("stopping transmitting");
    sink.stop()?;
    info!("exiting");
    Ok(())
}

fn calibrate(sink: &dyn SampleSink, fs_exact: f64) -> Result<()> {
    ensure!(
        fs_exact.is_finite() && fs_exact > 0.0,
        "corrected sample rate {} Hz is not usable",
        fs_exact
    );
    sink.calibrate(fs_exact)
        .context("latching sample rate failed")
}

fn open_raw(path: &Path) -> Result<Box<dyn Write + Send>> {
    if path == Path::new("-") {
        return Ok(Box::new(std::io::stdout()));
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {} failed", path.display()))?;
    Ok(Box::new(std::io::BufWriter::new(file)))
}
