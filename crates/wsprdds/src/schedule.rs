use thiserror::Error;

/// Number of symbols in a WSPR transmission.
pub const WSPR_SYMBOL_COUNT: usize = 162;

/// Size of the WSPR tone alphabet.
pub const WSPR_TONE_COUNT: u8 = 4;

/// Tone spacing in Hz: 12000 / 8192.
pub const WSPR_TONE_SPACING_HZ: f64 = 12_000.0 / 8192.0;

/// Symbol rate in baud: 12000 / 8192, about 110.6 s for a full frame.
pub const WSPR_SYMBOL_RATE_HZ: f64 = 12_000.0 / 8192.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("please give {expected} symbols ({actual} given)")]
    SymbolCount { expected: usize, actual: usize },

    #[error("symbol {position} is {found:?}, expected a digit between 0 and {max}")]
    InvalidSymbol {
        position: usize,
        found: char,
        max: u8,
    },

    #[error("please give at least one center frequency")]
    NoBands,

    #[error("invalid center frequency {0} Hz")]
    InvalidFrequency(f64),

    #[error("invalid sample rate {0} Hz")]
    InvalidSampleRate(f64),

    #[error("invalid phase shift {0} degrees")]
    InvalidPhaseShift(f64),
}

/// Parse a textual symbol payload such as `"3140..."`.
///
/// ASCII whitespace and commas are skipped so grouped payloads can be pasted
/// as-is. Length is checked by [`Schedule::new`].
pub fn parse_symbols(text: &str) -> Result<Vec<u8>, ConfigError> {
    let mut symbols = Vec::with_capacity(WSPR_SYMBOL_COUNT);
    for ch in text.chars() {
        if ch.is_ascii_whitespace() || ch == ',' {
            continue;
        }
        let value = ch
            .to_digit(10)
            .filter(|&d| d < WSPR_TONE_COUNT as u32)
            .ok_or(ConfigError::InvalidSymbol {
                position: symbols.len(),
                found: ch,
                max: WSPR_TONE_COUNT - 1,
            })?;
        symbols.push(value as u8);
    }
    Ok(symbols)
}

/// Symbol payload and band list for repeated transmissions.
#[derive(Debug, Clone)]
pub struct Schedule {
    symbols: Vec<u8>,
    bands: Vec<f64>,
    tone_spacing_hz: f64,
    symbol_rate_hz: f64,
}

impl Schedule {
    /// Validate a WSPR payload and its band list.
    pub fn new(symbols: Vec<u8>, bands: Vec<f64>) -> Result<Self, ConfigError> {
        if symbols.len() != WSPR_SYMBOL_COUNT {
            return Err(ConfigError::SymbolCount {
                expected: WSPR_SYMBOL_COUNT,
                actual: symbols.len(),
            });
        }
        if let Some(position) = symbols.iter().position(|&s| s >= WSPR_TONE_COUNT) {
            return Err(ConfigError::InvalidSymbol {
                position,
                found: char::from_digit(symbols[position] as u32, 10).unwrap_or('?'),
                max: WSPR_TONE_COUNT - 1,
            });
        }
        if bands.is_empty() {
            return Err(ConfigError::NoBands);
        }
        if let Some(&bad) = bands.iter().find(|hz| !(hz.is_finite() && **hz > 0.0)) {
            return Err(ConfigError::InvalidFrequency(bad));
        }

        Ok(Self {
            symbols,
            bands,
            tone_spacing_hz: WSPR_TONE_SPACING_HZ,
            symbol_rate_hz: WSPR_SYMBOL_RATE_HZ,
        })
    }

    /// Override tone spacing and symbol rate.
    pub fn with_timing(mut self, tone_spacing_hz: f64, symbol_rate_hz: f64) -> Self {
        self.tone_spacing_hz = tone_spacing_hz;
        self.symbol_rate_hz = symbol_rate_hz;
        self
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn bands(&self) -> &[f64] {
        &self.bands
    }

    pub fn tone_spacing_hz(&self) -> f64 {
        self.tone_spacing_hz
    }

    pub fn symbol_rate_hz(&self) -> f64 {
        self.symbol_rate_hz
    }

    /// Length of one transmission in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.symbols.len() as f64 / self.symbol_rate_hz
    }
}
