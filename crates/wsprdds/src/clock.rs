use time::OffsetDateTime;

/// Supplier of wall-clock time in whole seconds since the Unix epoch.
pub trait Clock {
    fn unix_seconds(&self) -> u64;
}

/// UTC system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> u64 {
        OffsetDateTime::now_utc().unix_timestamp().max(0) as u64
    }
}

impl<F> Clock for F
where
    F: Fn() -> u64,
{
    fn unix_seconds(&self) -> u64 {
        self()
    }
}

/// Periodic transmission window: a transmission may start when the clock
/// reads `offset_secs` into a `period_secs` long period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxWindow {
    pub period_secs: u64,
    pub offset_secs: u64,
}

impl Default for TxWindow {
    /// WSPR convention: one second into every even UTC minute.
    fn default() -> Self {
        Self {
            period_secs: 120,
            offset_secs: 1,
        }
    }
}

impl TxWindow {
    pub fn is_start(&self, unix_seconds: u64) -> bool {
        self.period_secs != 0 && unix_seconds % self.period_secs == self.offset_secs
    }
}
