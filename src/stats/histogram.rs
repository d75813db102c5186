//! Log-bucketed latency histogram
//!
//! A fixed-size histogram for latency tracking with logarithmic buckets over
//! a configurable millisecond range. The bucket index of a value is derived
//! from its natural logarithm, so a small fixed array covers microsecond to
//! multi-minute latencies with proportional resolution.
//!
//! All operations go through a single mutex. Updates are infrequent relative
//! to the event loop's database work, and the lock makes the read-and-reset
//! used by interval reporting a single atomic step: a percentile computed
//! under the lock sees a consistent snapshot, and no sample can land between
//! the read and the reset.

use std::sync::Mutex;

/// Fixed-size latency histogram with logarithmic buckets.
///
/// Values are latencies in milliseconds. A value `v` lands in bucket
/// `ceil((ln(v) - ln(min)) * (size-1) / (ln(max) - ln(min)))`, clamped to the
/// bucket range; the representative value of bucket `i` is the inverse
/// mapping `exp(i/mult + ln(min))`.
#[derive(Debug)]
pub struct Histogram {
    size: usize,

    range_mult: f64,
    range_deduct: f64,

    buckets: Mutex<Vec<u64>>,
}

impl Histogram {
    /// Create a new histogram spanning `[range_min, range_max]` milliseconds.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < range_min < range_max`.
    pub fn new(size: usize, range_min: f64, range_max: f64) -> Self {
        assert!(
            range_min > 0.0 && range_min < range_max,
            "histogram range must satisfy 0 < min < max"
        );

        let range_deduct = range_min.ln();
        let range_mult = (size - 1) as f64 / (range_max.ln() - range_deduct);

        Self {
            size,
            range_mult,
            range_deduct,
            buckets: Mutex::new(vec![0; size]),
        }
    }

    /// Record a value in milliseconds.
    ///
    /// Values above the range are clamped into the last bucket; values at or
    /// below zero (where the logarithm is undefined) land in bucket 0.
    pub fn add(&self, value: f64) {
        let idx = self.bucket_index(value);
        let mut buckets = self.buckets.lock().unwrap();
        buckets[idx] += 1;
    }

    /// Bucket index for a value, clamped to `[0, size - 1]`.
    fn bucket_index(&self, value: f64) -> usize {
        if value <= 0.0 {
            return 0;
        }

        let i = ((value.ln() - self.range_deduct) * self.range_mult).ceil();
        if !i.is_finite() || i < 0.0 {
            0
        } else if i >= self.size as f64 {
            self.size - 1
        } else {
            i as usize
        }
    }

    /// Representative value (in milliseconds) of bucket `i`.
    fn decimal(&self, i: usize) -> f64 {
        (i as f64 / self.range_mult + self.range_deduct).exp()
    }

    /// Total number of recorded samples.
    pub fn len(&self) -> u64 {
        self.buckets.lock().unwrap().iter().sum()
    }

    /// Check if no samples have been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at the given percentile, or 0.0 if the histogram is empty.
    ///
    /// Walks the buckets accumulating counts until the cumulative count
    /// reaches `ceil(total * p / 100)` and returns that bucket's
    /// representative value. `p = 100` returns the highest non-empty bucket.
    pub fn percentile(&self, p: u32) -> f64 {
        let buckets = self.buckets.lock().unwrap();
        self.percentile_locked(&buckets, p)
    }

    /// Compute the percentile and zero every bucket in one lock acquisition.
    ///
    /// Used by the interval reporter so each progress line shows the tail of
    /// its own window without racing concurrent `add` calls.
    pub fn percentile_and_reset(&self, p: u32) -> f64 {
        let mut buckets = self.buckets.lock().unwrap();
        let value = self.percentile_locked(&buckets, p);
        buckets.iter_mut().for_each(|c| *c = 0);
        value
    }

    fn percentile_locked(&self, buckets: &[u64], p: u32) -> f64 {
        if p > 100 {
            return 0.0;
        }

        let total: u64 = buckets.iter().sum();
        if total == 0 {
            return 0.0;
        }

        let nmax = ((total * p as u64) as f64 / 100.0).ceil() as u64;

        let mut cumulative = 0u64;
        let mut last = 0usize;
        for (i, &count) in buckets.iter().enumerate() {
            if count == 0 {
                continue;
            }
            last = i;
            cumulative += count;
            if cumulative >= nmax {
                break;
            }
        }
        self.decimal(last)
    }

    /// Print every non-empty bucket as `value |<bar> count`, with the bar
    /// scaled so the fullest bucket spans 40 characters.
    pub fn print(&self) {
        println!("       value  ------------- distribution ------------- count");

        let buckets = self.buckets.lock().unwrap();

        let max_count = buckets.iter().copied().max().unwrap_or(0);
        if max_count == 0 {
            return;
        }

        for (i, &count) in buckets.iter().enumerate() {
            if count == 0 {
                continue;
            }

            let width = ((count * 40) as f64 / max_count as f64).round() as usize;
            println!(
                "{:12.3} |{:<40} {}",
                self.decimal(i),
                "*".repeat(width),
                count
            );
        }
    }
}
