use log::{debug, info, warn};
use time::OffsetDateTime;

use crate::clock::{Clock, TxWindow};
use crate::convert::{degrees_to_offset, hz_to_increment};
use crate::dither::Lcg;
use crate::schedule::{ConfigError, Schedule};
use crate::sine_table::{SineTable, DEFAULT_AMPLITUDE, DEFAULT_TABLE_BITS};

/// Output channels: the primary carrier plus two phase-shifted copies.
pub const MAX_CHANNELS: usize = 3;

pub const DEFAULT_CHUNK_LEN: usize = 4096;

/// Added to the signed sine value before taking the high byte. Together with
/// [`DEFAULT_AMPLITUDE`] and an 8-bit dither the sum stays within `u16`.
pub const DEFAULT_BIAS: u16 = 0x7F00;

/// Code emitted on every channel while no transmission is active.
pub const DEFAULT_IDLE_CODE: u8 = 0x80;

/// Phase shifts of the auxiliary channels relative to channel 0.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhaseShifts {
    pub p1_degrees: f64,
    pub p2_degrees: f64,
    /// Exchange the two shifts at the start of every transmission.
    pub swap: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SynthConfig {
    /// The only request length [`Synthesizer::fill`] accepts.
    pub chunk_len: usize,
    pub table_bits: u32,
    pub amplitude: i16,
    pub bias: u16,
    pub idle_code: u8,
    pub dither_seed: u64,
    pub window: TxWindow,
    pub phase_shifts: PhaseShifts,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            chunk_len: DEFAULT_CHUNK_LEN,
            table_bits: DEFAULT_TABLE_BITS,
            amplitude: DEFAULT_AMPLITUDE,
            bias: DEFAULT_BIAS,
            idle_code: DEFAULT_IDLE_CODE,
            dither_seed: 0,
            window: TxWindow::default(),
            phase_shifts: PhaseShifts::default(),
        }
    }
}

/// Phase increments derived from the exact sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuning {
    pub fs_exact: f64,
    /// Added to the symbol timer every sample; a symbol ends on wraparound.
    pub symbol_step: u64,
    /// Frequency increment of one tone step.
    pub tone_step: u64,
    pub band_increments: Vec<u64>,
}

impl Tuning {
    fn new(fs_exact: f64, schedule: &Schedule) -> Self {
        Self {
            fs_exact,
            symbol_step: hz_to_increment(fs_exact, schedule.symbol_rate_hz()),
            tone_step: hz_to_increment(fs_exact, schedule.tone_spacing_hz()),
            band_increments: schedule
                .bands()
                .iter()
                .map(|&hz| hz_to_increment(fs_exact, hz))
                .collect(),
        }
    }

    /// Samples per symbol implied by the symbol step, i.e. one full turn of
    /// the 64-bit timer divided by the step.
    pub fn samples_per_symbol(&self) -> u64 {
        if self.symbol_step == 0 {
            return u64::MAX;
        }
        u64::try_from((1u128 << 64) / self.symbol_step as u128).unwrap_or(u64::MAX)
    }
}

/// Dithered direct digital synthesizer driven by the WSPR schedule.
///
/// All state is owned here and advanced only by [`Synthesizer::fill`], which
/// never allocates or blocks.
pub struct Synthesizer {
    config: SynthConfig,
    schedule: Schedule,
    table: SineTable,
    dither: Lcg,
    tuning: Option<Tuning>,

    transmitting: bool,
    phase: u64,
    freq: u64,
    carrier: u64,
    symbol_phase: u64,
    symbol_index: usize,

    next_band: usize,
    band_index: Option<usize>,
    offsets: [u64; MAX_CHANNELS],
    transmissions: u64,
}

impl Synthesizer {
    /// Create an idle, uninitialized synthesizer. Call
    /// [`initialize`](Self::initialize) once the exact sample rate is known.
    pub fn new(config: SynthConfig, schedule: Schedule) -> Result<Self, ConfigError> {
        let shifts = config.phase_shifts;
        for deg in [shifts.p1_degrees, shifts.p2_degrees] {
            if !deg.is_finite() {
                return Err(ConfigError::InvalidPhaseShift(deg));
            }
        }

        Ok(Self {
            table: SineTable::new(config.table_bits, config.amplitude),
            dither: Lcg::new(config.dither_seed),
            offsets: [
                0,
                degrees_to_offset(shifts.p1_degrees),
                degrees_to_offset(shifts.p2_degrees),
            ],
            config,
            schedule,
            tuning: None,
            transmitting: false,
            phase: 0,
            freq: 0,
            carrier: 0,
            symbol_phase: 0,
            symbol_index: 0,
            next_band: 0,
            band_index: None,
            transmissions: 0,
        })
    }

    /// Latch the exact sample rate. Until this succeeds every
    /// [`fill`](Self::fill) is a no-op. Any transmission in progress is
    /// abandoned.
    pub fn initialize(&mut self, fs_exact: f64) -> Result<(), ConfigError> {
        if !(fs_exact.is_finite() && fs_exact > 0.0) {
            return Err(ConfigError::InvalidSampleRate(fs_exact));
        }

        for (band, &hz) in self.schedule.bands().iter().enumerate() {
            if hz >= fs_exact / 2.0 {
                warn!(
                    "band {} ({} Hz) is above Nyquist for {:.1} Hz, output will alias",
                    band, hz, fs_exact
                );
            }
        }

        let tuning = Tuning::new(fs_exact, &self.schedule);
        info!(
            "synthesizer ready: fs {:.3} Hz, {} samples per symbol",
            fs_exact,
            tuning.samples_per_symbol()
        );
        self.tuning = Some(tuning);
        self.transmitting = false;
        Ok(())
    }

    /// Produce exactly one chunk on each of `channels`.
    ///
    /// Returns the number of samples written per channel, or 0 when the
    /// request was ignored: not initialized, no channels, more than
    /// [`MAX_CHANNELS`], or any channel whose length is not
    /// `config.chunk_len`. Ignored requests leave all state untouched.
    ///
    /// The clock is read once, before the first sample, and only while idle.
    pub fn fill<C>(&mut self, clock: &C, channels: &mut [&mut [u8]]) -> usize
    where
        C: Clock + ?Sized,
    {
        let chunk_len = self.config.chunk_len;
        if self.tuning.is_none()
            || channels.is_empty()
            || channels.len() > MAX_CHANNELS
            || channels.iter().any(|ch| ch.len() != chunk_len)
        {
            return 0;
        }

        if !self.transmitting {
            let now = clock.unix_seconds();
            if self.config.window.is_start(now) {
                self.start_transmission(now);
            }
        }

        let Some(tuning) = self.tuning.as_ref() else {
            return 0;
        };
        let table = &self.table;
        let dither = &mut self.dither;
        let symbols = self.schedule.symbols();
        let table_bits = table.bits();
        let bias = self.config.bias as i32;
        let idle_code = self.config.idle_code;
        let symbol_step = tuning.symbol_step;
        let tone_step = tuning.tone_step;
        let carrier = self.carrier;
        let offsets = self.offsets;

        let mut phase = self.phase;
        let mut freq = self.freq;
        let mut symbol_phase = self.symbol_phase;
        let mut symbol_index = self.symbol_index;
        let mut transmitting = self.transmitting;

        for i in 0..chunk_len {
            let rnd = dither.advance();
            if !transmitting {
                for ch in channels.iter_mut() {
                    ch[i] = idle_code;
                }
                continue;
            }

            phase = phase.wrapping_add(freq);
            let dithered = phase.wrapping_add(rnd.phase(table_bits));
            for (n, ch) in channels.iter_mut().enumerate() {
                let value = table.lookup(dithered.wrapping_add(offsets[n])) as i32;
                ch[i] = quantize(value + rnd.amplitude(n), bias);
            }

            // The symbol timer is a free-running fixed-point accumulator; a
            // wrap past 2^64 marks the boundary.
            let previous = symbol_phase;
            symbol_phase = symbol_phase.wrapping_add(symbol_step);
            if symbol_phase < previous {
                symbol_index += 1;
                match symbols.get(symbol_index) {
                    Some(&tone) => {
                        freq = carrier.wrapping_add(tone_step.wrapping_mul(tone as u64));
                        debug!("WSPR symbol {:3}: {}", symbol_index, tone);
                    }
                    None => {
                        transmitting = false;
                        info!("stopping WSPR transmission");
                    }
                }
            }
        }

        self.phase = phase;
        self.freq = freq;
        self.symbol_phase = symbol_phase;
        self.symbol_index = symbol_index;
        self.transmitting = transmitting;
        chunk_len
    }

    fn start_transmission(&mut self, now: u64) {
        let Some(tuning) = self.tuning.as_ref() else {
            return;
        };
        let band = self.next_band % tuning.band_increments.len();
        let first = self.schedule.symbols().first().copied().unwrap_or(0);

        self.carrier = tuning.band_increments[band];
        self.freq = self
            .carrier
            .wrapping_add(tuning.tone_step.wrapping_mul(first as u64));
        self.phase = 0;
        self.symbol_phase = 0;
        self.symbol_index = 0;
        if self.config.phase_shifts.swap {
            self.offsets.swap(1, 2);
        }
        self.next_band = (band + 1) % tuning.band_increments.len();
        self.band_index = Some(band);
        self.transmitting = true;
        self.transmissions += 1;

        let hz = self.schedule.bands()[band];
        match OffsetDateTime::from_unix_timestamp(now as i64) {
            Ok(at) => info!("starting WSPR transmission on band {} ({} Hz) at {}", band, hz, at),
            Err(_) => info!("starting WSPR transmission on band {} ({} Hz)", band, hz),
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn tuning(&self) -> Option<&Tuning> {
        self.tuning.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.tuning.is_some()
    }

    pub fn is_transmitting(&self) -> bool {
        self.transmitting
    }

    /// Index of the symbol being sent; equals the symbol count once a
    /// transmission has run to completion.
    pub fn symbol_index(&self) -> usize {
        self.symbol_index
    }

    /// Current oscillator phase increment (carrier plus tone offset).
    pub fn frequency_increment(&self) -> u64 {
        self.freq
    }

    /// Carrier increment of the current or most recent transmission.
    pub fn carrier_increment(&self) -> u64 {
        self.carrier
    }

    /// Band of the current or most recent transmission.
    pub fn band_index(&self) -> Option<usize> {
        self.band_index
    }

    /// Phase offsets applied to channels 0, 1 and 2.
    pub fn channel_offsets(&self) -> [u64; MAX_CHANNELS] {
        self.offsets
    }

    /// Transmissions started since creation.
    pub fn transmissions(&self) -> u64 {
        self.transmissions
    }
}

/// Map a biased signed sample to an unsigned 8-bit code by its high byte.
/// Sums outside `u16` wrap rather than trap.
#[inline]
fn quantize(value: i32, bias: i32) -> u8 {
    ((value.wrapping_add(bias) as u16) >> 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{WSPR_SYMBOL_COUNT, WSPR_TONE_SPACING_HZ};
    use std::cell::Cell;

    const BAND_40M: f64 = 7_040_100.0;
    const BAND_20M: f64 = 14_097_100.0;

    fn config(chunk_len: usize) -> SynthConfig {
        SynthConfig {
            chunk_len,
            ..SynthConfig::default()
        }
    }

    /// Schedule with `samples_per_symbol` samples per symbol at `fs`.
    fn fast_schedule(
        symbols: Vec<u8>,
        bands: Vec<f64>,
        fs: f64,
        samples_per_symbol: f64,
    ) -> Schedule {
        Schedule::new(symbols, bands)
            .expect("schedule")
            .with_timing(WSPR_TONE_SPACING_HZ, fs / samples_per_symbol)
    }

    fn synth(config: SynthConfig, schedule: Schedule, fs: f64) -> Synthesizer {
        let mut synth = Synthesizer::new(config, schedule).expect("synth");
        synth.initialize(fs).expect("initialize");
        synth
    }

    fn render<C: Clock>(
        synth: &mut Synthesizer,
        clock: &C,
        channels: usize,
    ) -> (usize, Vec<Vec<u8>>) {
        let mut planes = vec![vec![0u8; synth.config().chunk_len]; channels];
        let written = {
            let mut refs: Vec<&mut [u8]> =
                planes.iter_mut().map(|p| p.as_mut_slice()).collect();
            synth.fill(clock, &mut refs)
        };
        (written, planes)
    }

    fn at(secs: u64) -> impl Fn() -> u64 {
        move || secs
    }

    /// Clock that reads the start second on its first call only.
    fn start_once() -> impl Fn() -> u64 {
        let calls = Cell::new(0u32);
        move || {
            let n = calls.get();
            calls.set(n + 1);
            if n == 0 {
                1
            } else {
                2
            }
        }
    }

    fn run_until_idle(synth: &mut Synthesizer, clock: &impl Clock) -> usize {
        let mut chunks = 0;
        loop {
            render(synth, clock, 1);
            chunks += 1;
            if !synth.is_transmitting() {
                return chunks;
            }
            assert!(chunks < 1_000_000, "transmission never ended");
        }
    }

    #[test]
    fn uninitialized_fill_is_noop() {
        let schedule = Schedule::new(vec![0; WSPR_SYMBOL_COUNT], vec![BAND_40M]).unwrap();
        let mut synth = Synthesizer::new(config(16), schedule).unwrap();
        let mut buf = [0x11u8; 16];
        assert_eq!(synth.fill(&at(1), &mut [&mut buf[..]]), 0);
        assert_eq!(buf, [0x11; 16]);
        assert!(!synth.is_transmitting());
        assert_eq!(synth.transmissions(), 0);
    }

    #[test]
    fn idle_emits_silence_on_every_channel() {
        let schedule = Schedule::new(vec![1; WSPR_SYMBOL_COUNT], vec![BAND_40M]).unwrap();
        let mut synth = synth(config(256), schedule, 100e6);
        for _ in 0..4 {
            let (written, planes) = render(&mut synth, &at(0), 3);
            assert_eq!(written, 256);
            for plane in planes {
                assert!(plane.iter().all(|&b| b == DEFAULT_IDLE_CODE));
            }
        }
        assert!(!synth.is_transmitting());
    }

    #[test]
    fn invalid_requests_are_ignored_without_state_change() {
        let fs = 48_000.0;
        let make = || {
            let schedule = fast_schedule(vec![2; WSPR_SYMBOL_COUNT], vec![1_500.0], fs, 100.0);
            synth(config(64), schedule, fs)
        };
        let mut probed = make();
        let mut reference = make();

        let mut short = [0u8; 63];
        assert_eq!(probed.fill(&at(1), &mut [&mut short[..]]), 0);
        let (mut a, mut b, mut c, mut d) = ([0u8; 64], [0u8; 64], [0u8; 64], [0u8; 64]);
        let mut four = [&mut a[..], &mut b[..], &mut c[..], &mut d[..]];
        assert_eq!(probed.fill(&at(1), &mut four), 0);
        let mut none: [&mut [u8]; 0] = [];
        assert_eq!(probed.fill(&at(1), &mut none), 0);
        assert!(!probed.is_transmitting());

        for _ in 0..10 {
            let (n1, out1) = render(&mut probed, &at(1), 2);
            let (n2, out2) = render(&mut reference, &at(1), 2);
            assert_eq!(n1, 64);
            assert_eq!(n2, 64);
            assert_eq!(out1, out2);
        }
        assert_eq!(probed.symbol_index(), reference.symbol_index());
    }

    #[test]
    fn full_transmission_sends_every_symbol_once() {
        // 12 kHz makes one WSPR symbol exactly 8192 samples.
        let fs = 12_000.0;
        let schedule = Schedule::new(vec![3; WSPR_SYMBOL_COUNT], vec![1_500.0]).unwrap();
        let mut synth = synth(config(4096), schedule, fs);
        assert_eq!(synth.tuning().unwrap().symbol_step, 1 << 51);
        assert_eq!(synth.tuning().unwrap().samples_per_symbol(), 8192);

        for chunk in 1..=(2 * WSPR_SYMBOL_COUNT) {
            render(&mut synth, &at(1), 1);
            if chunk < 2 * WSPR_SYMBOL_COUNT {
                assert!(synth.is_transmitting(), "stopped early at chunk {chunk}");
                assert_eq!(synth.symbol_index(), chunk / 2);
            }
        }
        assert!(!synth.is_transmitting());
        assert_eq!(synth.symbol_index(), WSPR_SYMBOL_COUNT);
        assert_eq!(synth.transmissions(), 1);

        // Still inside the start second, so the next chunk starts again.
        render(&mut synth, &at(1), 1);
        assert!(synth.is_transmitting());
        assert_eq!(synth.transmissions(), 2);
    }

    #[test]
    fn start_condition_does_not_retrigger_mid_transmission() {
        let fs = 48_000.0;
        let schedule = fast_schedule(vec![1; WSPR_SYMBOL_COUNT], vec![1_500.0], fs, 64.0);
        let mut synth = synth(config(32), schedule, fs);
        let mut last = 0;
        for _ in 0..(2 * WSPR_SYMBOL_COUNT - 1) {
            render(&mut synth, &at(121), 1);
            assert!(synth.is_transmitting());
            assert!(synth.symbol_index() >= last);
            last = synth.symbol_index();
        }
        assert_eq!(synth.transmissions(), 1);
        assert_eq!(last, WSPR_SYMBOL_COUNT - 1);
    }

    #[test]
    fn symbol_duration_is_fixed_by_sample_count() {
        let fs = crate::convert::corrected_sample_rate(12_000.0, 143.0);
        let boundaries = |band: f64| {
            let schedule = Schedule::new(vec![0; WSPR_SYMBOL_COUNT], vec![band]).unwrap();
            let mut synth = synth(config(1), schedule, fs);
            let clock = start_once();
            let mut seen = Vec::new();
            let mut index = 0;
            for sample in 1..=(6 * 8200u64) {
                render(&mut synth, &clock, 1);
                if synth.symbol_index() != index {
                    index = synth.symbol_index();
                    seen.push(sample);
                }
            }
            (seen, synth.tuning().unwrap().samples_per_symbol())
        };

        let (low, per_symbol) = boundaries(1_000.0);
        let (high, _) = boundaries(2_000.0);
        assert_eq!(low, high);
        assert!(low.len() >= 5);

        let mut previous = 0;
        for at in low {
            let span = at - previous;
            assert!(
                span + 1 >= per_symbol && span <= per_symbol + 1,
                "span {span} vs {per_symbol}"
            );
            previous = at;
        }
    }

    #[test]
    fn samples_per_symbol_counts_a_full_timer_turn() {
        let tuning = |symbol_step| Tuning {
            fs_exact: 12_000.0,
            symbol_step,
            tone_step: 0,
            band_increments: vec![0],
        };
        assert_eq!(tuning(1 << 51).samples_per_symbol(), 8192);
        assert_eq!(tuning(1 << 63).samples_per_symbol(), 2);
        assert_eq!(tuning(3).samples_per_symbol(), 6_148_914_691_236_517_205);
        assert_eq!(tuning(1).samples_per_symbol(), u64::MAX);
        assert_eq!(tuning(0).samples_per_symbol(), u64::MAX);
    }

    #[test]
    fn output_does_not_depend_on_chunk_layout() {
        let fs = 48_000.0;
        let symbols: Vec<u8> = (0..WSPR_SYMBOL_COUNT).map(|i| (i % 4) as u8).collect();
        let make = |chunk_len: usize| {
            let schedule = fast_schedule(symbols.clone(), vec![1_500.0], fs, 64.0);
            let cfg = SynthConfig {
                dither_seed: 0x5EED,
                phase_shifts: PhaseShifts {
                    p1_degrees: 120.0,
                    p2_degrees: 240.0,
                    swap: false,
                },
                ..config(chunk_len)
            };
            synth(cfg, schedule, fs)
        };
        let total = 48 * 256;

        let collect = |chunk_len: usize| {
            let mut synth = make(chunk_len);
            let clock = start_once();
            let mut out = vec![Vec::new(); 3];
            while out[0].len() < total {
                let (_, planes) = render(&mut synth, &clock, 3);
                for (dst, src) in out.iter_mut().zip(planes) {
                    dst.extend(src);
                }
            }
            out
        };

        let per_sample = collect(1);
        let per_block = collect(256);
        assert_eq!(per_sample, per_block);

        let end = WSPR_SYMBOL_COUNT * 64;
        for plane in &per_block {
            assert!(plane[..end].iter().any(|&b| b != DEFAULT_IDLE_CODE));
            assert!(plane[end..].iter().all(|&b| b == DEFAULT_IDLE_CODE));
        }
    }

    #[test]
    fn all_zero_symbols_hold_the_carrier() {
        let fs = 100_000_000.0;
        let schedule = fast_schedule(vec![0; WSPR_SYMBOL_COUNT], vec![BAND_40M], fs, 16.0);
        let mut synth = synth(config(16), schedule, fs);
        let expected = hz_to_increment(fs, BAND_40M);

        for _ in 0..WSPR_SYMBOL_COUNT - 1 {
            render(&mut synth, &at(1), 1);
            assert!(synth.is_transmitting());
            assert_eq!(synth.frequency_increment(), expected);
        }
        render(&mut synth, &at(2), 1);
        assert!(!synth.is_transmitting());
        assert_eq!(synth.carrier_increment(), expected);
    }

    #[test]
    fn symbols_select_tones_above_the_carrier() {
        let fs = 48_000.0;
        let symbols: Vec<u8> = (0..WSPR_SYMBOL_COUNT).map(|i| (i * 7 % 4) as u8).collect();
        let schedule = fast_schedule(symbols.clone(), vec![1_500.0], fs, 32.0);
        let mut synth = synth(config(32), schedule, fs);
        let tuning = synth.tuning().unwrap().clone();
        let carrier = tuning.band_increments[0];

        render(&mut synth, &at(1), 1);
        for (k, &tone) in symbols.iter().enumerate().skip(1) {
            assert_eq!(synth.symbol_index(), k);
            assert_eq!(synth.frequency_increment(), carrier + tuning.tone_step * tone as u64);
            render(&mut synth, &at(2), 1);
        }
        assert!(!synth.is_transmitting());
    }

    #[test]
    fn bands_rotate_round_robin() {
        let fs = 100_000_000.0;
        let bands = vec![BAND_40M, BAND_20M];
        let schedule = fast_schedule(vec![0; WSPR_SYMBOL_COUNT], bands.clone(), fs, 16.0);
        let mut synth = synth(config(64), schedule, fs);

        for expected in [0usize, 1, 0, 1] {
            run_until_idle(&mut synth, &start_once());
            assert_eq!(synth.band_index(), Some(expected));
            assert_eq!(synth.carrier_increment(), hz_to_increment(fs, bands[expected]));
        }
        assert_eq!(synth.transmissions(), 4);
    }

    #[test]
    fn opposite_phase_channel_mirrors_primary() {
        let fs = 48_000.0;
        let schedule = fast_schedule(vec![0; WSPR_SYMBOL_COUNT], vec![1_000.0], fs, 4096.0);
        let cfg = SynthConfig {
            phase_shifts: PhaseShifts {
                p1_degrees: 180.0,
                p2_degrees: 0.0,
                swap: false,
            },
            ..config(1024)
        };
        let mut synth = synth(cfg, schedule, fs);
        let (_, planes) = render(&mut synth, &at(1), 3);

        for i in 0..1024 {
            let sum = planes[0][i] as u32 + planes[1][i] as u32;
            assert!((253..=255).contains(&sum), "sample {i}: sum {sum}");
            let same = planes[0][i] as i32 - planes[2][i] as i32;
            assert!(same.abs() <= 1, "sample {i}: diff {same}");
        }
    }

    #[test]
    fn phase_shifts_swap_each_transmission() {
        let fs = 48_000.0;
        let schedule = fast_schedule(vec![0; WSPR_SYMBOL_COUNT], vec![1_000.0], fs, 8.0);
        let cfg = SynthConfig {
            phase_shifts: PhaseShifts {
                p1_degrees: 90.0,
                p2_degrees: -90.0,
                swap: true,
            },
            ..config(128)
        };
        let mut synth = synth(cfg, schedule, fs);
        assert_eq!(synth.channel_offsets(), [0, 1 << 62, 3 << 62]);

        run_until_idle(&mut synth, &start_once());
        assert_eq!(synth.channel_offsets(), [0, 3 << 62, 1 << 62]);
        run_until_idle(&mut synth, &start_once());
        assert_eq!(synth.channel_offsets(), [0, 1 << 62, 3 << 62]);
    }

    #[test]
    fn rejects_bad_rates_and_shifts() {
        let schedule = Schedule::new(vec![0; WSPR_SYMBOL_COUNT], vec![BAND_40M]).unwrap();
        let mut synth = Synthesizer::new(config(16), schedule.clone()).unwrap();
        for fs in [0.0, -48_000.0, f64::NAN, f64::INFINITY] {
            assert!(synth.initialize(fs).is_err());
        }
        assert!(!synth.is_initialized());

        let cfg = SynthConfig {
            phase_shifts: PhaseShifts {
                p1_degrees: f64::NAN,
                ..PhaseShifts::default()
            },
            ..config(16)
        };
        assert!(matches!(
            Synthesizer::new(cfg, schedule),
            Err(ConfigError::InvalidPhaseShift(_))
        ));
    }

    #[test]
    fn quantize_wraps_instead_of_trapping() {
        assert_eq!(quantize(0, DEFAULT_BIAS as i32), 0x7F);
        assert_eq!(quantize(DEFAULT_AMPLITUDE as i32 + 255, DEFAULT_BIAS as i32), 0xFE);
        assert_eq!(quantize(-(DEFAULT_AMPLITUDE as i32), DEFAULT_BIAS as i32), 0x00);
        assert_eq!(quantize(0x8100, 0x7F00), 0x00);
    }
}
