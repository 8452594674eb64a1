//! Plain-text reports

use std::fmt::Write;

use crate::analyze::{best_predictor, PredictorComparison};
use crate::metrics::{MetricsRecord, MAX_BER_AFTER, MAX_NS_PER_PIXEL, MIN_COMPRESSION_RATIO};

const LABEL_WIDTH: usize = 30;
const VALUE_WIDTH: usize = 16;

fn separator(out: &mut String) {
    let _ = writeln!(out, "+{}+{}+", "-".repeat(LABEL_WIDTH + 2), "-".repeat(VALUE_WIDTH + 2));
}

fn row(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        out,
        "| {:<lw$} | {:>vw$} |",
        label,
        value,
        lw = LABEL_WIDTH,
        vw = VALUE_WIDTH
    );
}

fn verdict(ok: bool) -> &'static str {
    if ok {
        "meets"
    } else {
        "does not meet"
    }
}

/// Quantitative requirements table followed by the verdicts
pub fn render(metrics: &MetricsRecord) -> String {
    let mut out = String::new();

    separator(&mut out);
    row(&mut out, "Quantitative requirement", "Value");
    separator(&mut out);
    row(&mut out, "Compression ratio", &format!("1:{:.2}", metrics.compression_ratio));
    row(&mut out, "BER before correction", &format!("{:.10}", metrics.ber_before));
    row(&mut out, "BER after correction", &format!("{:.10}", metrics.ber_after));
    row(&mut out, "Compression time (seconds)", &format!("{:.6}", metrics.source_coding_time));
    row(&mut out, "Time per pixel (ns)", &format!("{:.2}", metrics.per_pixel_time_ns));
    row(&mut out, "Channel bit flips", &metrics.channel_flips.to_string());
    row(&mut out, "Valid blocks", &metrics.valid_blocks.to_string());
    row(&mut out, "Invalid blocks", &metrics.invalid_blocks.to_string());
    row(&mut out, "Corrected codewords", &metrics.corrected_codewords.to_string());
    separator(&mut out);

    let _ = writeln!(
        out,
        "Compression ratio {} the requirement (> 1:{})",
        verdict(metrics.compression_ok),
        MIN_COMPRESSION_RATIO
    );
    let _ = writeln!(
        out,
        "BER after correction {} the requirement (< {:e})",
        verdict(metrics.ber_ok),
        MAX_BER_AFTER
    );
    let _ = writeln!(
        out,
        "Time per pixel {} the requirement (<= {} ns)",
        verdict(metrics.timing_ok),
        MAX_NS_PER_PIXEL
    );

    if let Some(mismatch) = metrics.size_mismatch {
        let _ = writeln!(
            out,
            "Decoded {} residuals, expected {}",
            mismatch.actual, mismatch.expected
        );
    }
    if metrics.dropped_tail_bits > 0 {
        let _ = writeln!(out, "Dropped {} undecodable tail bits", metrics.dropped_tail_bits);
    }

    let _ = writeln!(
        out,
        "Overall: {}",
        if metrics.passed { "PASS" } else { "FAIL" }
    );
    let _ = writeln!(
        out,
        "Reconstruction: {}",
        if metrics.exact_match {
            "matches the original"
        } else {
            "does not match the original"
        }
    );

    out
}

/// One row per predictor strategy, then the strategy with the best ratio
pub fn render_comparison(results: &[PredictorComparison]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:>10} {:>12} {:>10} {:>12}",
        "Predictor", "Symbols", "Coded bits", "Ratio", "Time (s)"
    );
    for result in results {
        let _ = writeln!(
            out,
            "{:<20} {:>10} {:>12} {:>10} {:>12.6}",
            result.strategy.id(),
            result.distinct_residuals,
            result.encoded_bits,
            format!("1:{:.2}", result.compression_ratio),
            result.source_coding_time
        );
    }
    if let Some(best) = best_predictor(results) {
        let _ = writeln!(
            out,
            "Best predictor: {} (1:{:.2})",
            best.strategy, best.compression_ratio
        );
    }
    out
}
