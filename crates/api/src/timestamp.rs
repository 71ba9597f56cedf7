/// Peer selection timestamp.
///
/// Internally i64 microseconds from unix epoch.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Construct a new timestamp of "now".
    pub fn now() -> Self {
        std::time::SystemTime::now().into()
    }

    /// Construct a timestamp from i64 microseconds since unix epoch.
    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Get the i64 microseconds since unix epoch.
    pub fn as_micros(&self) -> i64 {
        self.0
    }

    /// Whole minutes between two timestamps regardless of their order,
    /// clamped to `i32::MAX`.
    pub fn abs_diff_minutes(&self, other: Timestamp) -> u32 {
        let minutes = self.0.abs_diff(other.0) / 60_000_000;
        minutes.min(i32::MAX as u64) as u32
    }
}

impl std::ops::Add<std::time::Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: std::time::Duration) -> Self::Output {
        Timestamp(self.0.saturating_add(rhs.as_micros() as i64))
    }
}

impl std::ops::Sub<std::time::Duration> for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: std::time::Duration) -> Self::Output {
        Timestamp(self.0.saturating_sub(rhs.as_micros() as i64))
    }
}

impl From<std::time::SystemTime> for Timestamp {
    fn from(t: std::time::SystemTime) -> Self {
        // pre-epoch clocks are clamped to the epoch
        Self(
            t.duration_since(std::time::SystemTime::UNIX_EPOCH)
                .map(|d| d.as_micros() as i64)
                .unwrap_or_default(),
        )
    }
}
