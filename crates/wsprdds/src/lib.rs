//! Dithered direct digital synthesis of WSPR transmissions.
//!
//! A [`Synthesizer`] turns a [`Schedule`] into unsigned 8-bit samples, one
//! fixed-size chunk per call, starting a transmission whenever its
//! [`Clock`] enters the transmit window.

pub mod clock;
pub mod convert;
pub mod dither;
pub mod schedule;
pub mod sine_table;
pub mod synth;

pub use clock::{Clock, SystemClock, TxWindow};
pub use convert::{corrected_sample_rate, degrees_to_offset, hz_to_increment};
pub use schedule::{parse_symbols, ConfigError, Schedule, WSPR_SYMBOL_COUNT};
pub use synth::{PhaseShifts, SynthConfig, Synthesizer, Tuning, MAX_CHANNELS};
