//! Reduction of sample sets into summaries, and single-number comparisons.

use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};
use crate::harness::{clock_resolution, SampleSet};

/// Mean/minimum reduction of a sample set.
///
/// `mean` is the plain arithmetic mean, floored to whole nanoseconds, so
/// `min <= mean <= max` holds exactly. `min` is the best-case estimate: noise
/// from preemption or cache misses inflates the mean but cannot push the
/// minimum below the true cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(with = "secs")]
    pub mean: Duration,
    #[serde(with = "secs")]
    pub min: Duration,
    #[serde(with = "secs")]
    pub max: Duration,
    pub count: usize,
}

impl Summary {
    pub fn from_samples(samples: &[Duration]) -> Result<Self> {
        let (first, rest) = samples.split_first().ok_or(HarnessError::EmptyInput)?;

        let mut total: u128 = first.as_nanos();
        let mut min = *first;
        let mut max = *first;
        for s in rest {
            total += s.as_nanos();
            min = min.min(*s);
            max = max.max(*s);
        }

        let mean_ns = total / samples.len() as u128;
        let mean = Duration::new(
            (mean_ns / 1_000_000_000) as u64,
            (mean_ns % 1_000_000_000) as u32,
        );

        Ok(Summary {
            mean,
            min,
            max,
            count: samples.len(),
        })
    }

    /// The statistic chosen by `basis`.
    pub fn pick(&self, basis: Basis) -> Duration {
        match basis {
            Basis::Mean => self.mean,
            Basis::Min => self.min,
        }
    }

    /// Per-execution view of a summary whose samples each covered `batch`
    /// executions.
    pub fn per_call(&self, batch: usize) -> Summary {
        let batch = batch.max(1) as u32;
        Summary {
            mean: self.mean / batch,
            min: self.min / batch,
            max: self.max / batch,
            count: self.count,
        }
    }
}

/// Reduce a sample set. Fails with [`HarnessError::EmptyInput`] when the set
/// holds no samples.
pub fn summarize(set: &SampleSet) -> Result<Summary> {
    Summary::from_samples(set.samples())
}

/// Which statistic drives a single-number comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Basis {
    #[default]
    Mean,
    Min,
}

impl Basis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Basis::Mean => "mean",
            Basis::Min => "min",
        }
    }
}

/// Speedup of a candidate relative to a baseline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub baseline: String,
    pub candidate: String,
    pub basis: Basis,
    /// `baseline / candidate`; `None` when the candidate is at or below
    /// clock resolution.
    pub speedup: Option<f64>,
}

/// Compare two summaries on the given basis.
pub fn compare(
    baseline: (&str, &Summary),
    candidate: (&str, &Summary),
    basis: Basis,
) -> Comparison {
    compare_with_resolution(baseline, candidate, basis, clock_resolution())
}

pub fn compare_with_resolution(
    baseline: (&str, &Summary),
    candidate: (&str, &Summary),
    basis: Basis,
    resolution: Duration,
) -> Comparison {
    let denom = candidate.1.pick(basis);
    let speedup = if denom.is_zero() || denom <= resolution {
        None
    } else {
        Some(baseline.1.pick(basis).as_nanos() as f64 / denom.as_nanos() as f64)
    };

    Comparison {
        baseline: baseline.0.to_string(),
        candidate: candidate.0.to_string(),
        basis,
        speedup,
    }
}

/// Serde adapter writing durations as fractional seconds.
pub(crate) mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let v = f64::deserialize(d)?;
        Duration::try_from_secs_f64(v).map_err(serde::de::Error::custom)
    }
}

pub(crate) mod secs_vec {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &[Duration], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(v.iter().map(Duration::as_secs_f64))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Duration>, D::Error> {
        Vec::<f64>::deserialize(d)?
            .into_iter()
            .map(|v| Duration::try_from_secs_f64(v).map_err(serde::de::Error::custom))
            .collect()
    }
}
