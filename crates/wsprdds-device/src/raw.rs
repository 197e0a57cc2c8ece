use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{info, warn};
use wsprdds::{Clock, Synthesizer};

use crate::{ChunkPump, DeviceError, SampleSink};

/// Writes interleaved unsigned 8-bit frames to any byte sink, paced to the
/// nominal sample rate so transmissions line up with the wall clock.
pub struct RawSink {
    handle: JoinHandle<std::io::Result<()>>,
    running: Arc<AtomicBool>,
    calibration: Sender<f64>,
    sample_rate_hz: u32,
    channels: usize,
}

impl RawSink {
    pub fn start<W, C>(
        writer: W,
        synth: Synthesizer,
        clock: C,
        channels: usize,
        sample_rate_hz: u32,
    ) -> Result<Self, DeviceError>
    where
        W: Write + Send + 'static,
        C: Clock + Send + 'static,
    {
        let (mut pump, calibration) = ChunkPump::new(synth, clock, channels);
        let channels = pump.channels();
        let frames = pump.chunk_len().max(1);
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let handle = std::thread::Builder::new()
            .name("wsprdds-raw".to_string())
            .spawn(move || {
                let mut writer = writer;
                let mut buf = vec![0u8; frames * channels];
                let mut pacer = Pacer::new(sample_rate_hz);
                while flag.load(Ordering::Relaxed) {
                    pacer.wait();
                    pump.pull(&mut buf, channels);
                    pacer.advance(frames as u64);
                    if let Err(err) = writer.write_all(&buf) {
                        flag.store(false, Ordering::Relaxed);
                        return Err(err);
                    }
                }
                writer.flush()
            })?;

        info!(
            "raw output: {} channel(s), nominal {} Hz",
            channels, sample_rate_hz
        );
        Ok(Self {
            handle,
            running,
            calibration,
            sample_rate_hz,
            channels,
        })
    }
}

/// Holds a writer back to `rate` frames per second, measured from the first
/// frame. A zero rate disables pacing.
struct Pacer {
    start: Instant,
    frames: u64,
    rate: u32,
}

impl Pacer {
    fn new(rate: u32) -> Self {
        Self {
            start: Instant::now(),
            frames: 0,
            rate,
        }
    }

    /// Instant at which the next frame is due.
    fn due(&self) -> Instant {
        if self.rate == 0 {
            return self.start;
        }
        self.start + Duration::from_secs_f64(self.frames as f64 / self.rate as f64)
    }

    fn wait(&self) {
        let due = self.due();
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }
    }

    fn advance(&mut self, frames: u64) {
        self.frames += frames;
    }
}

impl SampleSink for RawSink {
    fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn calibrate(&self, fs_exact: f64) -> Result<(), DeviceError> {
        self.calibration
            .send(fs_exact)
            .map_err(|_| DeviceError::Disconnected)
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed) && !self.handle.is_finished()
    }

    fn stop(self: Box<Self>) -> Result<(), DeviceError> {
        info!("stopping raw output");
        self.running.store(false, Ordering::Relaxed);
        match self.handle.join() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                warn!("raw output ended with error: {}", err);
                Err(err.into())
            }
            Err(_) => Err(DeviceError::WriterPanicked),
        }
    }
}
