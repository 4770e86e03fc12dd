//! Growth-law checks: measure one workload family at increasing sizes and
//! compare observed time ratios against `size_ratio ^ exponent`.
//!
//! Nothing here passes or fails a run. Small sizes are dominated by fixed
//! overhead, so only the trend across the larger sizes carries weight; the
//! caller judges closeness with [`RatioRecord::within`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{HarnessError, Result};
use crate::harness::{clock_resolution, run, TrialConfig};
use crate::stats::{summarize, Basis, Summary};
use crate::workload::Workload;

/// Sizes, assumed exponent and comparison basis for one scaling run.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalingPlan {
    pub sizes: Vec<u64>,
    pub exponent: f64,
    pub basis: Basis,
}

impl ScalingPlan {
    pub fn new(sizes: impl Into<Vec<u64>>, exponent: f64) -> Self {
        ScalingPlan {
            sizes: sizes.into(),
            exponent,
            basis: Basis::Mean,
        }
    }

    pub fn with_basis(mut self, basis: Basis) -> Self {
        self.basis = basis;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sizes.len() < 2 {
            return Err(HarnessError::invalid(format!(
                "scaling needs at least two sizes, got {}",
                self.sizes.len()
            )));
        }
        if self.sizes.contains(&0) {
            return Err(HarnessError::invalid("scaling sizes must be positive"));
        }
        if let Some(w) = self.sizes.windows(2).find(|w| w[1] <= w[0]) {
            return Err(HarnessError::invalid(format!(
                "scaling sizes must be strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }
        if !self.exponent.is_finite() || self.exponent <= 0.0 {
            return Err(HarnessError::invalid(format!(
                "assumed exponent must be a positive number, got {}",
                self.exponent
            )));
        }
        Ok(())
    }
}

/// One measured problem size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizePoint {
    pub size: u64,
    pub summary: Summary,
}

/// Observed growth between two adjacent sizes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ObservedRatio {
    Measured(f64),
    /// The smaller size's time was zero or at clock resolution.
    Indeterminate,
}

impl ObservedRatio {
    pub fn value(&self) -> Option<f64> {
        match self {
            ObservedRatio::Measured(v) => Some(*v),
            ObservedRatio::Indeterminate => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatioRecord {
    pub from_size: u64,
    pub to_size: u64,
    pub size_ratio: f64,
    pub observed: ObservedRatio,
    pub ideal_ratio: f64,
    pub exponent: f64,
}

impl RatioRecord {
    /// Relative distance from the ideal ratio: `observed / ideal - 1`.
    pub fn deviation(&self) -> Option<f64> {
        self.observed.value().map(|v| v / self.ideal_ratio - 1.0)
    }

    /// Whether the observed ratio lies within `tolerance` (relative) of the
    /// ideal one.
    pub fn within(&self, tolerance: f64) -> Option<bool> {
        self.deviation().map(|d| d.abs() <= tolerance)
    }
}

/// Measured points plus derived ratios.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalingReport {
    pub exponent: f64,
    pub basis: Basis,
    pub points: Vec<SizePoint>,
    pub ratios: Vec<RatioRecord>,
}

/// Build a workload per size with `factory`, run a trial session at each
/// size and derive adjacent ratios.
///
/// The plan and trial configuration are validated before any workload is
/// built.
pub fn verify_scaling<F, W>(
    mut factory: F,
    plan: &ScalingPlan,
    trial: &TrialConfig,
) -> Result<ScalingReport>
where
    F: FnMut(u64) -> W,
    W: Workload,
{
    plan.validate()?;
    trial.validate()?;

    let mut points = Vec::with_capacity(plan.sizes.len());
    for &size in &plan.sizes {
        let mut workload = factory(size);
        let set = run(&mut workload, trial)?;
        points.push(SizePoint {
            size,
            summary: summarize(&set)?,
        });
    }

    let ratios = ratios_from_points(&points, plan.exponent, plan.basis, clock_resolution());
    Ok(ScalingReport {
        exponent: plan.exponent,
        basis: plan.basis,
        points,
        ratios,
    })
}

/// Ratios between adjacent points. A ratio whose denominator is at or below
/// `resolution` is marked indeterminate instead of divided.
pub fn ratios_from_points(
    points: &[SizePoint],
    exponent: f64,
    basis: Basis,
    resolution: Duration,
) -> Vec<RatioRecord> {
    points
        .windows(2)
        .map(|pair| {
            let (a, b) = (&pair[0], &pair[1]);
            let size_ratio = b.size as f64 / a.size as f64;
            let denom = a.summary.pick(basis);

            let observed = if denom.is_zero() || denom <= resolution {
                warn!(
                    from = a.size,
                    to = b.size,
                    ?denom,
                    ?resolution,
                    "ratio indeterminate: time at clock resolution"
                );
                ObservedRatio::Indeterminate
            } else {
                ObservedRatio::Measured(
                    b.summary.pick(basis).as_nanos() as f64 / denom.as_nanos() as f64,
                )
            };

            RatioRecord {
                from_size: a.size,
                to_size: b.size,
                size_ratio,
                observed,
                ideal_ratio: size_ratio.powf(exponent),
                exponent,
            }
        })
        .collect()
}
