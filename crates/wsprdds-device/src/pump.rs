use std::sync::mpsc::{self, Receiver, Sender};

use cpal::{FromSample, Sample};
use log::error;
use wsprdds::{Clock, Synthesizer, MAX_CHANNELS};

/// Adapts fixed-size synthesizer chunks to device buffers of any length.
///
/// Staging planes hold one chunk per channel. Whenever they run dry, exactly
/// one chunk is requested, so the synthesizer never sees a partial request.
pub struct ChunkPump<C> {
    synth: Synthesizer,
    clock: C,
    planes: [Vec<u8>; MAX_CHANNELS],
    channels: usize,
    cursor: usize,
    calibration: Receiver<f64>,
}

impl<C: Clock> ChunkPump<C> {
    /// Create a pump delivering `channels` synthesizer channels (clamped to
    /// `1..=MAX_CHANNELS`), plus the sender that latches the exact rate.
    pub fn new(synth: Synthesizer, clock: C, channels: usize) -> (Self, Sender<f64>) {
        let (tx, rx) = mpsc::channel();
        let chunk_len = synth.config().chunk_len;
        let idle_code = synth.config().idle_code;
        let pump = Self {
            planes: std::array::from_fn(|_| vec![idle_code; chunk_len]),
            channels: channels.clamp(1, MAX_CHANNELS),
            cursor: chunk_len,
            synth,
            clock,
            calibration: rx,
        };
        (pump, tx)
    }

    pub fn synth(&self) -> &Synthesizer {
        &self.synth
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn chunk_len(&self) -> usize {
        self.planes[0].len()
    }

    /// Fill interleaved `data` with frames of `frame_channels` samples.
    /// Frame channels beyond the synthesizer's get the format's equilibrium.
    pub fn pull<T>(&mut self, data: &mut [T], frame_channels: usize)
    where
        T: Sample + FromSample<u8>,
    {
        let chunk_len = self.chunk_len();
        if frame_channels == 0 || chunk_len == 0 {
            data.fill(T::EQUILIBRIUM);
            return;
        }

        for frame in data.chunks_mut(frame_channels) {
            if self.cursor >= chunk_len {
                self.refill();
            }
            for (ch, out) in frame.iter_mut().enumerate() {
                *out = if ch < self.channels {
                    T::from_sample(self.planes[ch][self.cursor])
                } else {
                    T::EQUILIBRIUM
                };
            }
            self.cursor += 1;
        }
    }

    fn refill(&mut self) {
        if let Ok(fs_exact) = self.calibration.try_recv() {
            if let Err(err) = self.synth.initialize(fs_exact) {
                error!("calibration rejected: {}", err);
            }
        }

        let idle_code = self.synth.config().idle_code;
        let [a, b, c] = &mut self.planes;
        let mut refs = [a.as_mut_slice(), b.as_mut_slice(), c.as_mut_slice()];
        if self.synth.fill(&self.clock, &mut refs[..self.channels]) == 0 {
            for plane in refs.iter_mut() {
                plane.fill(idle_code);
            }
        }
        self.cursor = 0;
    }
}
