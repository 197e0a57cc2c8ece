//! Conversions from physical units to 64-bit fixed-point phase.
//!
//! One full turn of the unit circle is 2^64, so phase arithmetic wraps for
//! free. These run at initialization and transmission start only.

const TURN: f64 = 18_446_744_073_709_551_616.0; // 2^64

/// Phase increment per sample for a tone of `hz` at sample rate `fs_exact`.
///
/// The ratio is reduced to one turn before scaling, so tones at or above the
/// sample rate alias instead of saturating.
pub fn hz_to_increment(fs_exact: f64, hz: f64) -> u64 {
    let turns = (hz / fs_exact).rem_euclid(1.0);
    (turns * TURN) as u64
}

/// Phase offset for a shift of `degrees`. Negative angles wrap.
pub fn degrees_to_offset(degrees: f64) -> u64 {
    let turns = (degrees / 360.0).rem_euclid(1.0);
    (turns * TURN) as u64
}

/// Apply a measured clock error in parts per million to a reported rate.
pub fn corrected_sample_rate(reported_hz: f64, ppm: f64) -> f64 {
    (1.0 + 1e-6 * ppm) * reported_hz
}
