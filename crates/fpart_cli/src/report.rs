//! End-of-run reporting: stage timings and the placement summary.

use fpart_engine::PartitionSummary;
use std::fmt::Write as _;
use std::time::Duration;

/// Wall-clock durations of the three pipeline stages.
#[derive(Debug, Clone, Copy)]
pub struct StageTimings {
    /// Reading and validating the input file.
    pub read: Duration,
    /// The partitioning run (propagation, greedy pass, fallback pass).
    pub partition: Duration,
    /// Writing the assignment file.
    pub write: Duration,
}

impl StageTimings {
    /// Total runtime across all stages.
    pub fn total(&self) -> Duration {
        self.read + self.partition + self.write
    }
}

/// Renders the per-stage timing table.
pub fn render_timings(timings: &StageTimings) -> String {
    let mut out = String::new();
    out.push_str("----- Timing Result -----\n");
    let _ = writeln!(out, "  Input Time:\t{:.6} sec", timings.read.as_secs_f64());
    let _ = writeln!(
        out,
        "+ Partition Time:\t{:.6} sec",
        timings.partition.as_secs_f64()
    );
    let _ = writeln!(out, "+ Output Time:\t{:.6} sec", timings.write.as_secs_f64());
    let _ = writeln!(
        out,
        "= Total Runtime:\t{:.6} sec",
        timings.total().as_secs_f64()
    );
    out
}

/// Renders the human-readable placement summary.
pub fn render_text(summary: &PartitionSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "partitioned {} node(s) across {} device(s) (capacity {})",
        summary.num_nodes, summary.num_devices, summary.capacity
    );
    let _ = writeln!(out, "  fallback placements:   {}", summary.fallback_placed);
    let _ = writeln!(out, "  cut connections:       {}", summary.cut_connections);
    let _ = writeln!(
        out,
        "  violating connections: {}",
        summary.violating_connections
    );
    let _ = writeln!(out, "  max occupancy:         {}", summary.max_occupancy);
    out
}

/// Renders the machine-readable summary with timings.
pub fn render_json(summary: &PartitionSummary, timings: &StageTimings) -> String {
    let value = serde_json::json!({
        "summary": summary,
        "timing_sec": {
            "read": timings.read.as_secs_f64(),
            "partition": timings.partition.as_secs_f64(),
            "write": timings.write.as_secs_f64(),
            "total": timings.total().as_secs_f64(),
        },
    });
    serde_json::to_string_pretty(&value).expect("summary serialization cannot fail")
}
