//! Human-readable rendering of harness records.
//!
//! Every function here is pure and deterministic: identical input gives
//! identical text. Times are printed in seconds with six decimals.

use std::time::Duration;

use crate::introspect::{FootprintReport, GrowthStep, Representation};
use crate::scaling::{ObservedRatio, RatioRecord};
use crate::schema::{Measurement, Section};
use crate::stats::{Comparison, Summary};
use crate::verify::Agreement;

const NAME_WIDTH: usize = 24;

fn secs(d: Duration) -> String {
    format!("{:.6}s", d.as_secs_f64())
}

/// `          for + iterator | mean=0.001234s  min=0.001100s  n=7`
pub fn format_summary(name: &str, summary: &Summary) -> String {
    format!(
        "{name:>width$} | mean={}  min={}  n={}",
        secs(summary.mean),
        secs(summary.min),
        summary.count,
        width = NAME_WIDTH
    )
}

/// Summary line followed by every raw sample.
pub fn format_summary_with_samples(name: &str, summary: &Summary, samples: &[Duration]) -> String {
    let raw: Vec<String> = samples
        .iter()
        .map(|s| format!("{:.6}", s.as_secs_f64()))
        .collect();
    format!("{}  samples=[{}]", format_summary(name, summary), raw.join(", "))
}

fn exponent_label(exponent: f64) -> String {
    if exponent == 1.0 {
        "O(N)".to_string()
    } else if exponent.fract() == 0.0 {
        format!("O(N^{})", exponent as i64)
    } else {
        format!("O(N^{exponent:.2})")
    }
}

/// `n: 200->400 (x2.0)  time ~ x3.97  ideal O(N^2): x4.00`
pub fn format_ratio(r: &RatioRecord) -> String {
    let observed = match r.observed {
        ObservedRatio::Measured(v) => format!("x{v:.2}"),
        ObservedRatio::Indeterminate => "indeterminate".to_string(),
    };
    format!(
        "n: {}->{} (x{:.1})  time ~ {}  ideal {}: x{:.2}",
        r.from_size,
        r.to_size,
        r.size_ratio,
        observed,
        exponent_label(r.exponent),
        r.ideal_ratio
    )
}

pub fn format_size_point(size: u64, summary: &Summary) -> String {
    format!(
        "n={size:>8} | mean={} | min={}",
        secs(summary.mean),
        secs(summary.min)
    )
}

pub fn format_footprint(name: &str, f: &FootprintReport) -> String {
    let repr = match f.representation {
        Representation::Packed => "packed",
        Representation::Boxed => "boxed",
        Representation::Empty => "empty",
    };
    format!(
        "{name:>width$} | container={} B  element={} B ({repr})  count={}  est_total={} B",
        f.container_bytes,
        f.element_bytes,
        f.element_count,
        f.estimated_total_bytes(),
        width = NAME_WIDTH
    )
}

pub fn format_comparison(c: &Comparison) -> String {
    match c.speedup {
        Some(x) => format!(
            "{} vs {}: x{x:.2} by {}",
            c.candidate,
            c.baseline,
            c.basis.as_str()
        ),
        None => format!(
            "{} vs {}: indeterminate by {}",
            c.candidate,
            c.baseline,
            c.basis.as_str()
        ),
    }
}

pub fn format_growth_step(step: &GrowthStep) -> String {
    if step.resized {
        format!(
            "{:<10} | {:<15} | RESIZE (+{})",
            step.len, step.buffer_bytes, step.growth
        )
    } else {
        format!("{:<10} | {:<15} |  -", step.len, step.buffer_bytes)
    }
}

pub fn format_agreement(a: &Agreement) -> String {
    if a.ok() {
        format!("correctness: all strategies match {}", a.reference)
    } else {
        format!(
            "correctness: MISMATCH against {}: {}",
            a.reference,
            a.mismatches.join(", ")
        )
    }
}

fn format_measurement(m: &Measurement) -> String {
    format_summary_with_samples(&m.name, &m.summary, &m.samples)
}

/// All lines for one experiment section, in a fixed order.
pub fn render_section(section: &Section) -> Vec<String> {
    let mut lines = vec![format!("=== {} ===", section.title)];

    lines.extend(section.measurements.iter().map(format_measurement));

    lines.extend(section.agreements.iter().map(format_agreement));

    for c in &section.comparisons {
        lines.push(format_comparison(c));
    }

    for s in &section.scaling {
        lines.push(format!("--- scaling: {} ({} basis) ---", s.name, s.report.basis.as_str()));
        for p in &s.report.points {
            lines.push(format_size_point(p.size, &p.summary));
        }
        lines.extend(s.report.ratios.iter().map(format_ratio));
    }

    for f in &section.footprints {
        lines.push(format_footprint(&f.name, &f.report));
    }

    for g in &section.growth {
        lines.push(format!("--- growth: {} ---", g.name));
        lines.push(format!("{:<10} | {:<15} | Status", "Length", "Size(bytes)"));
        lines.extend(g.steps.iter().map(format_growth_step));
    }

    lines
}
