//! Events decoded from a streamed chat response.

use serde::{Deserialize, Serialize};

/// A parsed unit of a streamed chat response.
///
/// Transient: consumed once by the accumulator and never stored.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A fragment of assistant text to append to the running buffer.
    ContentDelta(String),
    /// The terminal record, carrying server-side timing figures.
    Done(Metrics),
}

/// Server-reported timing and throughput figures for one generation.
///
/// Every field is optional; servers omit what they do not measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_duration_ns: Option<u64>,
    pub load_duration_ns: Option<u64>,
    pub prompt_eval_count: Option<u64>,
    pub prompt_eval_duration_ns: Option<u64>,
    pub eval_count: Option<u64>,
    pub eval_duration_ns: Option<u64>,
}

const NOT_AVAILABLE: &str = "N/A";

impl Metrics {
    /// Generated tokens per second, if both count and duration are known.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn tokens_per_second(&self) -> Option<f64> {
        match (self.eval_count, self.eval_duration_ns) {
            (Some(count), Some(ns)) if count > 0 && ns > 0 => {
                Some(count as f64 / (ns as f64 / 1e9))
            }
            _ => None,
        }
    }

    /// One-line summary shown beneath a completed assistant message.
    #[must_use]
    pub fn footer(&self) -> String {
        let speed = self
            .tokens_per_second()
            .map_or_else(|| NOT_AVAILABLE.to_string(), |tps| format!("{tps:.2} tok/s"));
        let tokens = self
            .eval_count
            .filter(|&n| n > 0)
            .map_or_else(|| NOT_AVAILABLE.to_string(), |n| n.to_string());

        format!(
            "Total: {} | Tokens: {} | Speed: {} | Load: {}",
            format_duration(self.total_duration_ns),
            tokens,
            speed,
            format_duration(self.load_duration_ns),
        )
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_duration(ns: Option<u64>) -> String {
    match ns {
        Some(ns) if ns > 0 => format!("{:.2}s", ns as f64 / 1e9),
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footer_formats_known_values() {
        let metrics = Metrics {
            total_duration_ns: Some(2_500_000_000),
            load_duration_ns: Some(100_000_000),
            eval_count: Some(50),
            eval_duration_ns: Some(2_000_000_000),
            ..Metrics::default()
        };
        assert_eq!(
            metrics.footer(),
            "Total: 2.50s | Tokens: 50 | Speed: 25.00 tok/s | Load: 0.10s"
        );
    }

    #[test]
    fn test_footer_marks_missing_values() {
        assert_eq!(
            Metrics::default().footer(),
            "Total: N/A | Tokens: N/A | Speed: N/A | Load: N/A"
        );
    }

    #[test]
    fn test_tokens_per_second_needs_nonzero_duration() {
        let metrics = Metrics {
            eval_count: Some(10),
            eval_duration_ns: Some(0),
            ..Metrics::default()
        };
        assert_eq!(metrics.tokens_per_second(), None);
    }
}
