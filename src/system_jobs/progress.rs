use std::sync::atomic::{AtomicU8, Ordering};

/// Upper bound of the percentage scale.
pub const MAX_PERCENT: u8 = 100;

/// Lock-free progress cell for a single job.
///
/// Written by the job's own execution, read by any number of observers.
/// Reads never block and always return a value that some prior `set` stored;
/// a single byte cannot be read half-written.
#[derive(Debug, Default)]
pub struct ProgressCell(AtomicU8);

impl ProgressCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    /// Store a new percentage and return the value actually stored.
    ///
    /// Values above 100 are clamped; the caller decides whether to report
    /// the clamp (the registry logs it as a job-author bug).
    pub fn set(&self, percent: u8) -> u8 {
        let clamped = percent.min(MAX_PERCENT);
        self.0.store(clamped, Ordering::Release);
        clamped
    }

    pub fn get(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_starts_at_zero() {
        assert_eq!(ProgressCell::new().get(), 0);
    }

    #[test]
    fn test_get_returns_latest_set() {
        let cell = ProgressCell::new();
        for percent in [10, 55, 99, 100] {
            assert_eq!(cell.set(percent), percent);
            assert_eq!(cell.get(), percent);
        }
    }

    #[test]
    fn test_set_clamps_above_100() {
        let cell = ProgressCell::new();
        assert_eq!(cell.set(101), 100);
        assert_eq!(cell.get(), 100);
        assert_eq!(cell.set(255), 100);
        assert_eq!(cell.get(), 100);
    }

    #[test]
    fn test_reads_during_writes_are_always_in_range() {
        let cell = Arc::new(ProgressCell::new());

        let writer = {
            let cell = Arc::clone(&cell);
            std::thread::spawn(move || {
                for percent in 0..=100u8 {
                    cell.set(percent);
                }
            })
        };

        let reader = {
            let cell = Arc::clone(&cell);
            std::thread::spawn(move || {
                let mut last = 0u8;
                for _ in 0..10_000 {
                    let value = cell.get();
                    assert!(value <= MAX_PERCENT);
                    // Single-writer with increasing inputs: reads never go back.
                    assert!(value >= last);
                    last = value;
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
    }
}
