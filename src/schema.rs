use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::harness::{SampleSet, TrialConfig};
use crate::introspect::{FootprintReport, GrowthStep};
use crate::scaling::ScalingReport;
use crate::stats::{summarize, Comparison, Summary};
use crate::verify::Agreement;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub profile: String,
    pub seed: u64,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    pub unit: String,

    pub repeat: usize,
    pub warmup: usize,
    /// Executions covered by each sample.
    pub batch: usize,
    pub suppress_reclaim: bool,

    pub summary: Summary,
    #[serde(with = "crate::stats::secs_vec")]
    pub samples: Vec<Duration>,

    /// Fingerprint of the workload's result, when one was recorded.
    pub fingerprint: Option<String>,
    pub extra: serde_json::Value,
}

impl Measurement {
    pub fn from_samples(trial: &TrialConfig, set: SampleSet) -> Result<Self> {
        let summary = summarize(&set)?;
        Ok(Measurement {
            name: set.workload().to_string(),
            unit: "s".to_string(),
            repeat: trial.repeat,
            warmup: trial.warmup,
            batch: set.batch(),
            suppress_reclaim: trial.suppress_reclaim,
            summary,
            samples: set.into_samples(),
            fingerprint: None,
            extra: serde_json::Value::Null,
        })
    }

    pub fn with_fingerprint(mut self, fingerprint: String) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = extra;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingEntry {
    pub name: String,
    pub report: ScalingReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootprintEntry {
    pub name: String,
    pub report: FootprintReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthEntry {
    pub name: String,
    pub steps: Vec<GrowthStep>,
}

/// Everything one experiment produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub measurements: Vec<Measurement>,
    pub agreements: Vec<Agreement>,
    pub comparisons: Vec<Comparison>,
    pub scaling: Vec<ScalingEntry>,
    pub footprints: Vec<FootprintEntry>,
    pub growth: Vec<GrowthEntry>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Section {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn measurement(&self, name: &str) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub run: RunMeta,
    pub sections: Vec<Section>,
}

impl ExperimentReport {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
