/// Default table resolution: 1024 entries.
pub const DEFAULT_TABLE_BITS: u32 = 10;

/// Default peak amplitude. Leaves room below `i16::MAX` for an 8-bit
/// amplitude dither plus the 0x7F00 quantization bias without overflowing
/// a `u16`.
pub const DEFAULT_AMPLITUDE: i16 = 0x7EFF;

const MAX_TABLE_BITS: u32 = 16;

/// One full sine cycle in 16-bit fixed point, indexed by the top bits of a
/// 64-bit phase.
pub struct SineTable {
    values: Box<[i16]>,
    bits: u32,
}

impl SineTable {
    /// Build a table with `1 << bits` entries scaled to `amplitude`.
    ///
    /// `bits` is clamped to `1..=16`.
    pub fn new(bits: u32, amplitude: i16) -> Self {
        let bits = bits.clamp(1, MAX_TABLE_BITS);
        let len = 1usize << bits;
        let values = (0..len)
            .map(|i| {
                let angle = std::f64::consts::TAU * i as f64 / len as f64;
                (amplitude as f64 * angle.sin()).round() as i16
            })
            .collect();
        Self { values, bits }
    }

    /// Number of phase bits used as the table index.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up the value for a 64-bit phase (one full turn = 2^64).
    #[inline]
    pub fn lookup(&self, phase: u64) -> i16 {
        self.values[(phase >> (64 - self.bits)) as usize]
    }
}

impl Default for SineTable {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_BITS, DEFAULT_AMPLITUDE)
    }
}
