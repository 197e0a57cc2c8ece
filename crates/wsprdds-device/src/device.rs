use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use log::{error, info, warn};
use regex::Regex;
use wsprdds::{Clock, Synthesizer, MAX_CHANNELS};

use crate::{ChunkPump, DeviceError, SampleSink};

/// Audio output stream fed by a synthesizer.
pub struct AudioSink {
    stream: cpal::Stream,
    running: Arc<AtomicBool>,
    sample_rate_hz: u32,
    channels: usize,
    calibration: Sender<f64>,
}

impl AudioSink {
    /// Open an output device, negotiate `requested_rate` and start streaming.
    ///
    /// `device_regex` picks the first output device whose name matches;
    /// otherwise the host default is used. If no supported config covers the
    /// requested rate, the device default is taken and reported through
    /// [`SampleSink::sample_rate_hz`].
    pub fn start<C>(
        synth: Synthesizer,
        clock: C,
        device_regex: Option<&str>,
        requested_rate: u32,
    ) -> Result<Self, DeviceError>
    where
        C: Clock + Send + 'static,
    {
        let host = cpal::default_host();
        let device = select_output_device(&host, device_regex)?;
        let name = device.name().unwrap_or_else(|_| "<unknown>".to_string());

        let mut config = device.default_output_config()?;
        if let Ok(mut supported) = device.supported_output_configs() {
            if let Some(best) = supported.find(|cfg| {
                is_supported_format(cfg.sample_format())
                    && cfg.min_sample_rate().0 <= requested_rate
                    && cfg.max_sample_rate().0 >= requested_rate
            }) {
                config = best.with_sample_rate(cpal::SampleRate(requested_rate));
            }
        }
        let sample_format = config.sample_format();
        let config: cpal::StreamConfig = config.into();
        if config.sample_rate.0 != requested_rate {
            warn!(
                "{} does not support {} Hz, using {} Hz",
                name, requested_rate, config.sample_rate.0
            );
        }

        let device_channels = config.channels as usize;
        let channels = device_channels.min(MAX_CHANNELS);
        let (pump, calibration) = ChunkPump::new(synth, clock, channels);
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32, C>(&device, &config, pump, flag)?,
            cpal::SampleFormat::I16 => build_stream::<i16, C>(&device, &config, pump, flag)?,
            cpal::SampleFormat::U16 => build_stream::<u16, C>(&device, &config, pump, flag)?,
            cpal::SampleFormat::U8 => build_stream::<u8, C>(&device, &config, pump, flag)?,
            other => return Err(DeviceError::UnsupportedFormat(other)),
        };
        stream.play()?;

        info!(
            "audio output on {}: {} Hz, {:?}, {} device channels ({} synthesized)",
            name, config.sample_rate.0, sample_format, device_channels, channels
        );

        Ok(Self {
            stream,
            running,
            sample_rate_hz: config.sample_rate.0,
            channels,
            calibration,
        })
    }
}

impl SampleSink for AudioSink {
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
        self.running.load(Ordering::Relaxed)
    }

    fn stop(self: Box<Self>) -> Result<(), DeviceError> {
        info!("stopping audio output");
        let Self {
            stream, running, ..
        } = *self;
        running.store(false, Ordering::Relaxed);
        let paused = stream.pause();
        drop(stream);
        info!("audio output closed");
        paused?;
        Ok(())
    }
}

fn build_stream<T, C>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut pump: ChunkPump<C>,
    running: Arc<AtomicBool>,
) -> Result<cpal::Stream, DeviceError>
where
    T: SizedSample + FromSample<u8>,
    C: Clock + Send + 'static,
{
    let channels = config.channels as usize;
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _| pump.pull(data, channels),
        stream_error_handler(running),
        None,
    )?;
    Ok(stream)
}

/// Any stream error ends the transmission; the device does not recover by
/// itself.
fn stream_error_handler(running: Arc<AtomicBool>) -> impl FnMut(cpal::StreamError) + Send {
    move |err| {
        error!("audio stream error: {}", err);
        running.store(false, Ordering::Relaxed);
    }
}

fn is_supported_format(format: cpal::SampleFormat) -> bool {
    matches!(
        format,
        cpal::SampleFormat::F32
            | cpal::SampleFormat::I16
            | cpal::SampleFormat::U16
            | cpal::SampleFormat::U8
    )
}

fn select_output_device(
    host: &cpal::Host,
    device_regex: Option<&str>,
) -> Result<cpal::Device, DeviceError> {
    if let Some(pattern) = device_regex {
        let re = Regex::new(pattern)?;
        for dev in host.output_devices()? {
            let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
            if re.is_match(&name) {
                return Ok(dev);
            }
        }
        return Err(DeviceError::NoMatchingDevice(pattern.to_string()));
    }

    host.default_output_device()
        .ok_or(DeviceError::NoDefaultDevice)
}
