use clap::ValueEnum;

pub mod benches;
pub mod dataset;
pub mod error;
pub mod harness;
pub mod introspect;
pub mod reclaim;
pub mod report;
pub mod scaling;
pub mod schema;
pub mod stats;
pub mod verify;
pub mod workload;

pub use error::{BoxError, HarnessError, Result};
pub use harness::{measure, run, BenchConfig, Profile, SampleSet, TrialConfig};
pub use introspect::{footprint, FootprintReport};
pub use scaling::{verify_scaling, RatioRecord, ScalingPlan};
pub use stats::{summarize, Basis, Summary};
pub use workload::{try_workload, workload, Workload};

/// Experiment to run.
#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum Experiment {
    /// Run every experiment.
    #[default]
    All,
    /// Same O(N) loop written three ways, plus push-loop vs collect.
    Sums,
    /// Quadratic and linear scaling, front insertion, capacity growth.
    Growth,
    /// Packed vs boxed vs linked element storage.
    Layout,
    /// Linear scan vs hash lookup.
    Lookup,
    /// Repeated concatenation vs single-pass string building.
    Strings,
}

/// Workload family for ad-hoc scaling runs.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum ScalingKind {
    /// Nested loop over all pairs: O(N^2).
    PairSum,
    /// Build a Vec by inserting at the front: O(N^2).
    InsertFront,
    /// Build a Vec by pushing at the back: O(N).
    PushBack,
    /// Sum a prepared vector: O(N).
    Sum,
}

impl ScalingKind {
    /// Exponent of the growth law this workload is expected to follow.
    pub fn expected_exponent(&self) -> f64 {
        match self {
            ScalingKind::PairSum | ScalingKind::InsertFront => 2.0,
            ScalingKind::PushBack | ScalingKind::Sum => 1.0,
        }
    }
}
