use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Booking references look like `BK<millis><seq>`. The millisecond timestamp
/// keeps them sortable; the rolling sequence disambiguates bookings created
/// inside the same millisecond.
pub fn next_reference() -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed) % 1000;
    format!("BK{}{:03}", Utc::now().timestamp_millis(), seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_are_unique_and_prefixed() {
        let a = next_reference();
        let b = next_reference();
        assert!(a.starts_with("BK"));
        assert!(b.starts_with("BK"));
        assert_ne!(a, b);
    }
}
