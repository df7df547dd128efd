//! # Value Types
//!
//! Small value types owned by the crate rather than pulled from an external
//! dependency. Currently this is just [`Timestamp`], the wire-level
//! counterpart of a wall-clock date-time.

/// A UTC instant split into epoch seconds and a nanosecond remainder.
///
/// This is exactly what the wire carries for timestamp fields: an `i64`
/// seconds component followed by a `u32` nanosecond remainder, 12 bytes
/// total. No sub-nanosecond precision is claimed, and no calendar or
/// timezone arithmetic is provided; convert at the edges of your system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

impl Timestamp {
    /// Nanoseconds per second; `subsec_nanos` is normalized below this bound.
    pub const NANOS_PER_SEC: u32 = 1_000_000_000;

    /// Builds a timestamp from epoch seconds and a nanosecond remainder.
    ///
    /// A remainder of a full second or more is carried into the seconds
    /// component, so the stored `subsec_nanos` is always below
    /// [`Self::NANOS_PER_SEC`].
    pub fn new(secs: i64, nanos: u32) -> Self {
        let carry = (nanos / Self::NANOS_PER_SEC) as i64;
        Self {
            secs: secs + carry,
            nanos: nanos % Self::NANOS_PER_SEC,
        }
    }

    /// Seconds since the UTC epoch (may be negative).
    pub fn secs(&self) -> i64 {
        self.secs
    }

    /// Nanosecond remainder, always `< 1_000_000_000`.
    pub fn subsec_nanos(&self) -> u32 {
        self.nanos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_keeps_components() {
        let ts = Timestamp::new(1_702_300_000, 123_456_789);
        assert_eq!(ts.secs(), 1_702_300_000);
        assert_eq!(ts.subsec_nanos(), 123_456_789);
    }

    #[test]
    fn timestamp_carries_whole_seconds_from_nanos() {
        let ts = Timestamp::new(10, 2_500_000_000);
        assert_eq!(ts.secs(), 12);
        assert_eq!(ts.subsec_nanos(), 500_000_000);
    }

    #[test]
    fn timestamp_supports_negative_seconds() {
        let ts = Timestamp::new(-86_400, 1);
        assert_eq!(ts.secs(), -86_400);
        assert_eq!(ts.subsec_nanos(), 1);
    }

    #[test]
    fn timestamp_orders_by_seconds_then_nanos() {
        let a = Timestamp::new(1, 999_999_999);
        let b = Timestamp::new(2, 0);
        assert!(a < b);
    }
}
