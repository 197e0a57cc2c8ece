use std::path::PathBuf;

use clap::Parser;
use wsprdds::{
    corrected_sample_rate, parse_symbols, ConfigError, PhaseShifts, Schedule, SynthConfig,
};

#[derive(Parser, Debug)]
#[command(
    name = "wsprdds-tx",
    version,
    about = "WSPR transmitter using dithered direct digital synthesis"
)]
pub struct Args {
    /// WSPR symbols: 162 digits between 0 and 3. Spaces and commas are ignored.
    #[arg(short, long)]
    pub symbols: String,

    /// WSPR center frequency (Hz). Give several to cycle between bands.
    #[arg(short = 'f', long = "freq", required = true)]
    pub freqs: Vec<f64>,

    /// Target sample rate (Hz).
    #[arg(long, default_value_t = 48_000)]
    pub fs: u32,

    /// Frequency error of the sample clock in parts per million.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub ppm: f64,

    /// Phase shift of the second channel (degrees).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub p1: f64,

    /// Phase shift of the third channel (degrees).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub p2: f64,

    /// Swap the phase shifts of the second and third channel before each
    /// transmission.
    #[arg(long)]
    pub swap_phases: bool,

    /// Regex selecting the output device by name.
    #[arg(long)]
    pub device: Option<String>,

    /// Write unsigned 8-bit interleaved samples here instead of to an audio
    /// device ("-" for stdout), paced to --fs.
    #[arg(long, conflicts_with = "device")]
    pub raw: Option<PathBuf>,

    /// Channels written by --raw.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub channels: u8,

    /// Samples per synthesizer chunk.
    #[arg(long, default_value_t = 4096, value_parser = clap::value_parser!(u32).range(1..))]
    pub chunk: u32,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Validate the payload, bands and calibration.
    pub fn schedule(&self) -> Result<Schedule, ConfigError> {
        let fs = corrected_sample_rate(self.fs as f64, self.ppm);
        if self.fs == 0 || !(fs.is_finite() && fs > 0.0) {
            return Err(ConfigError::InvalidSampleRate(fs));
        }
        let symbols = parse_symbols(&self.symbols)?;
        Schedule::new(symbols, self.freqs.clone())
    }

    pub fn synth_config(&self) -> SynthConfig {
        SynthConfig {
            chunk_len: self.chunk as usize,
            phase_shifts: PhaseShifts {
                p1_degrees: self.p1,
                p2_degrees: self.p2,
                swap: self.swap_phases,
            },
            ..SynthConfig::default()
        }
    }
}
