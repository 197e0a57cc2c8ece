//! Pseudorandom source for phase and amplitude dithering.

/// Knuth's MMIX multiplier; full period over the 64-bit state with an odd
/// increment.
const MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const INCREMENT: u64 = 1;

/// Bits of the dither word reserved for phase dithering.
pub const PHASE_DITHER_SHIFT: u32 = 24;
pub const PHASE_DITHER_BITS: u32 = 8;

/// Linear congruential generator advanced once per output sample.
#[derive(Clone, Debug)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Advance the generator and return the high half of the new state.
    #[inline]
    pub fn advance(&mut self) -> DitherWord {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        DitherWord((self.state >> 32) as u32)
    }
}

/// One sample's worth of randomness, split into disjoint fields.
///
/// | bits   | use                      |
/// |--------|--------------------------|
/// | 0..8   | channel 0 amplitude      |
/// | 8..16  | channel 1 amplitude      |
/// | 16..24 | channel 2 amplitude      |
/// | 24..32 | phase                    |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DitherWord(pub u32);

impl DitherWord {
    /// Amplitude dither for `channel` (0..3), in 0..=255.
    #[inline]
    pub fn amplitude(self, channel: usize) -> i32 {
        ((self.0 >> (8 * channel as u32)) & 0xFF) as i32
    }

    /// Phase dither spread uniformly across one step of a sine table with
    /// `table_bits` index bits.
    #[inline]
    pub fn phase(self, table_bits: u32) -> u64 {
        let field = (self.0 >> PHASE_DITHER_SHIFT) as u64;
        field << (64 - table_bits - PHASE_DITHER_BITS)
    }
}

/// Source bits consumed by the amplitude field of `channel`.
pub fn amplitude_mask(channel: usize) -> u32 {
    0xFF << (8 * channel as u32)
}

/// Source bits consumed by the phase field.
pub fn phase_mask() -> u32 {
    ((1u32 << PHASE_DITHER_BITS) - 1) << PHASE_DITHER_SHIFT
}
