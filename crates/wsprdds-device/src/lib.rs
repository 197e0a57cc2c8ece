//! Sample sinks that drive a [`wsprdds::Synthesizer`] at the device's pace.

pub mod device;
pub mod error;
pub mod pump;
pub mod raw;

pub use device::AudioSink;
pub use error::DeviceError;
pub use pump::ChunkPump;
pub use raw::RawSink;

/// A running output that pulls chunks from a synthesizer.
///
/// The synthesizer starts uninitialized; the owner reads the negotiated
/// rate, corrects it and hands the result to [`calibrate`](Self::calibrate).
pub trait SampleSink {
    /// Rate the sink actually runs at, before ppm correction.
    fn sample_rate_hz(&self) -> u32;

    /// Synthesizer channels being delivered.
    fn channels(&self) -> usize;

    /// Latch the exact sample rate into the synthesizer.
    fn calibrate(&self, fs_exact: f64) -> Result<(), DeviceError>;

    /// False once the sink stopped on its own, e.g. after a write error.
    fn is_running(&self) -> bool;

    /// Stop pulling samples, then release the device.
    fn stop(self: Box<Self>) -> Result<(), DeviceError>;
}
