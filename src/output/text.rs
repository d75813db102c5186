//! Human-readable final report
//!
//! Renders the end-of-run statistics in sysbench's exact layout so existing
//! tooling that scrapes sysbench output keeps working. Interval lines are
//! printed by the reporter task; this module only handles the final
//! multi-section report.

use crate::config::RunnerOpts;
use crate::stats::histogram::Histogram;
use crate::stats::{CounterSet, NANOS_PER_MILLI};

/// Print the final multi-section report to stdout.
pub fn print_report(
    opts: &RunnerOpts,
    counters: &CounterSet,
    histogram: &Histogram,
    total_time: f64,
) {
    print!("{}", format_report(opts, counters, histogram, total_time));
}

/// Render the final report, one section per sysbench block.
pub fn format_report(
    opts: &RunnerOpts,
    counters: &CounterSet,
    histogram: &Histogram,
    total_time: f64,
) -> String {
    let reads = counters.reads();
    let writes = counters.writes();
    let others = counters.others();
    let queries = counters.queries();
    let transactions = counters.transactions();
    let ignored_errors = counters.ignored_errors();

    let mut report = String::new();

    report.push_str(&format!(
        "SQL statistics:\n\
         \x20   queries performed:\n\
         \x20       read:                            {}\n\
         \x20       write:                           {}\n\
         \x20       other:                           {}\n\
         \x20       total:                           {}\n\
         \x20   transactions:                        {:<6} ({:.2} per sec.)\n\
         \x20   queries:                             {:<6} ({:.2} per sec.)\n\
         \x20   ignored errors:                      {:<6} ({:.2} per sec.)\n\
         \x20   reconnects:                          N/A    (N/A per sec.)\n\n",
        reads,
        writes,
        others,
        reads + writes + others,
        transactions,
        transactions as f64 / total_time,
        queries,
        queries as f64 / total_time,
        ignored_errors,
        ignored_errors as f64 / total_time,
    ));

    report.push_str(&format!(
        "General statistics:\n\
         \x20   total time:                          {:.4}s\n\
         \x20   total number of events:              {}\n\n",
        total_time, transactions,
    ));

    let latency_avg_ms = if transactions > 0 {
        (counters.latency_nano_sum() as f64 / NANOS_PER_MILLI) / transactions as f64
    } else {
        0.0
    };

    report.push_str(&format!(
        "Latency (ms):\n\
         \x20        min: {:39.2}\n\
         \x20        avg: {:39.2}\n\
         \x20        max: {:39.2}\n\
         \x20        {}th percentile: {:27.2}\n\
         \x20        sum: {:39.2}\n\n",
        counters.latency_nano_min() as f64 / NANOS_PER_MILLI,
        latency_avg_ms,
        counters.latency_nano_max() as f64 / NANOS_PER_MILLI,
        opts.percentile,
        histogram.percentile(opts.percentile),
        counters.latency_nano_sum() as f64 / NANOS_PER_MILLI,
    ));

    let fairness = counters.fairness();
    report.push_str(&format!(
        "Threads fairness (Event distribution by threads):\n\
         \x20   events (avg/stddev):           {:.4}/{:.2}\n\
         \x20   execution time (avg/stddev):   {:.4}/{:.2}\n",
        fairness.events_avg,
        fairness.events_stddev,
        fairness.time_avg_secs,
        fairness.time_stddev_secs,
    ));

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{HISTOGRAM_MAX_MS, HISTOGRAM_MIN_MS, HISTOGRAM_SIZE};

    fn opts() -> RunnerOpts {
        RunnerOpts {
            threads: 2,
            events: 0,
            time: 10,
            report_interval: 0,
            histogram: false,
            percentile: 95,
            json_output: None,
        }
    }

    #[test]
    fn test_empty_run_prints_zeroed_latency() {
        // A run with zero transactions reports 0.00 latency everywhere: no
        // divide by zero on avg, and the untouched minimum prints as 0, not
        // as the u64::MAX sentinel it is initialised to.
        let counters = CounterSet::new(2);
        let histogram = Histogram::new(HISTOGRAM_SIZE, HISTOGRAM_MIN_MS, HISTOGRAM_MAX_MS);

        let report = format_report(&opts(), &counters, &histogram, 1.0);

        assert!(report.contains(&format!("min: {:39.2}", 0.0)), "{report}");
        assert!(report.contains(&format!("avg: {:39.2}", 0.0)), "{report}");
        assert!(report.contains(&format!("max: {:39.2}", 0.0)), "{report}");
        assert!(report.contains(&format!("sum: {:39.2}", 0.0)), "{report}");
        assert!(report.contains("95th percentile:"), "{report}");
        assert!(!report.contains("18446744073709"), "{report}");
        assert!(
            report.contains(&format!(
                "transactions:                        {:<6} ({:.2} per sec.)",
                0, 0.0
            )),
            "{report}"
        );
    }

    #[test]
    fn test_report_with_samples() {
        let counters = CounterSet::new(2);
        counters.record_queries(10, 4, 2, 0);
        counters.record_transaction(0, 2_000_000);
        counters.record_transaction(1, 4_000_000);

        let histogram = Histogram::new(HISTOGRAM_SIZE, HISTOGRAM_MIN_MS, HISTOGRAM_MAX_MS);
        histogram.add(2.0);
        histogram.add(4.0);

        let report = format_report(&opts(), &counters, &histogram, 2.5);

        assert!(report.contains("        read:                            10"));
        assert!(report.contains("        write:                           4"));
        assert!(report.contains("        total:                           16"));
        assert!(report.contains(&format!("min: {:39.2}", 2.0)), "{report}");
        assert!(report.contains(&format!("avg: {:39.2}", 3.0)), "{report}");
        assert!(report.contains(&format!("max: {:39.2}", 4.0)), "{report}");
        assert!(report.contains(&format!("sum: {:39.2}", 6.0)), "{report}");
        // 2 transactions over 2.5s.
        assert!(report.contains("(0.80 per sec.)"), "{report}");
        // One transaction per thread: avg 1, stddev 0.
        assert!(
            report.contains(&format!(
                "events (avg/stddev):           {:.4}/{:.2}",
                1.0, 0.0
            )),
            "{report}"
        );

        // The printing wrapper goes through the same renderer.
        print_report(&opts(), &counters, &histogram, 2.5);
    }
}
