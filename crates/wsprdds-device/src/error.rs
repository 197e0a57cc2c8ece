use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no default output device available")]
    NoDefaultDevice,

    #[error("no output device matched {0:?}")]
    NoMatchingDevice(String),

    #[error("invalid device pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("enumerating devices failed: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("querying default output config failed: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("building output stream failed: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("starting output stream failed: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("stopping output stream failed: {0}")]
    Pause(#[from] cpal::PauseStreamError),

    #[error("unsupported sample format {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("raw output failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("raw writer thread panicked")]
    WriterPanicked,

    #[error("sample callback is gone, cannot latch calibration")]
    Disconnected,
}
