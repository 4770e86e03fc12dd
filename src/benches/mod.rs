//! Demo experiments that drive the harness.

use std::hint::black_box;

use serde::Serialize;

use crate::error::Result;
use crate::harness::{run, BenchConfig, TrialConfig};
use crate::scaling::{verify_scaling, ScalingPlan, ScalingReport};
use crate::schema::{Measurement, Section};
use crate::stats::{compare, Basis, Comparison};
use crate::verify::{fingerprint, Agreement};
use crate::workload::workload;
use crate::{dataset, Experiment, ScalingKind};

pub mod lookup;

/// Run the selected experiment(s), one section each.
pub fn run_experiment(cfg: &BenchConfig, experiment: Experiment) -> Result<Vec<Section>> {
    let all = experiment == Experiment::All;
    let mut out = Vec::new();
    if all || experiment == Experiment::Sums {
        out.push(sums::run(cfg)?);
    }
    if all || experiment == Experiment::Growth {
        out.push(growth::run(cfg)?);
    }
    if all || experiment == Experiment::Layout {
        out.push(layout::run(cfg)?);
    }
    if all || experiment == Experiment::Lookup {
        out.push(lookup::run(cfg)?);
    }
    if all || experiment == Experiment::Strings {
        out.push(strings::run(cfg)?);
    }
    Ok(out)
}

/// Measure `body`, then execute it once more outside the session to
/// fingerprint its result.
pub(crate) fn measure_checked<F, T>(trial: &TrialConfig, name: &str, mut body: F) -> Result<Measurement>
where
    F: FnMut() -> T,
    T: Serialize,
{
    let set = run(&mut workload(name, &mut body), trial)?;
    let result = body();
    let m = Measurement::from_samples(trial, set)?;
    Ok(m.with_fingerprint(fingerprint(&result)?))
}

/// Agreement over the named measurements, in the given order.
pub(crate) fn agreement(section: &Section, names: &[&str]) -> Option<Agreement> {
    let results: Vec<(String, String)> = names
        .iter()
        .filter_map(|n| section.measurement(n))
        .filter_map(|m| m.fingerprint.clone().map(|fp| (m.name.clone(), fp)))
        .collect();
    Agreement::check(&results)
}

/// Speedup of `candidate` over `baseline` on both bases.
pub(crate) fn compare_both(section: &Section, baseline: &str, candidate: &str) -> Vec<Comparison> {
    match (section.measurement(baseline), section.measurement(candidate)) {
        (Some(b), Some(c)) => [Basis::Mean, Basis::Min]
            .into_iter()
            .map(|basis| compare((b.name.as_str(), &b.summary), (c.name.as_str(), &c.summary), basis))
            .collect(),
        _ => Vec::new(),
    }
}

/// Scaling run for one of the built-in workload families.
pub fn scale(kind: ScalingKind, plan: &ScalingPlan, trial: &TrialConfig) -> Result<ScalingReport> {
    match kind {
        ScalingKind::PairSum => verify_scaling(
            |n| workload(format!("pair_sum({n})"), move || growth::pair_sum(black_box(n))),
            plan,
            trial,
        ),
        ScalingKind::InsertFront => verify_scaling(
            |n| workload(format!("insert_front({n})"), move || growth::insert_front(black_box(n))),
            plan,
            trial,
        ),
        ScalingKind::PushBack => verify_scaling(
            |n| workload(format!("push_back({n})"), move || growth::push_back(black_box(n))),
            plan,
            trial,
        ),
        ScalingKind::Sum => verify_scaling(
            |n| {
                let data = dataset::sequence(n as usize);
                workload(format!("sum({n})"), move || sums::sum_builtin(black_box(&data)))
            },
            plan,
            trial,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::Profile;
    use crate::reclaim::test_lock;
    use crate::scaling::ObservedRatio;

    #[test]
    fn checked_measurement_carries_fingerprint() {
        let _l = test_lock();
        let m = measure_checked(&TrialConfig::new(2), "answer", || 42u64).unwrap();
        assert_eq!(m.samples.len(), 2);
        assert_eq!(m.fingerprint, Some(fingerprint(&42u64).unwrap()));
    }

    #[test]
    fn scale_validates_before_building() {
        let plan = ScalingPlan::new(vec![500, 100], 2.0);
        assert!(scale(ScalingKind::PairSum, &plan, &TrialConfig::new(1)).is_err());
    }

    #[test]
    fn scale_sum_produces_ratios() {
        let _l = test_lock();
        let plan = ScalingPlan::new(vec![1_000, 2_000, 4_000], 1.0);
        let report = scale(ScalingKind::Sum, &plan, &TrialConfig::new(2)).unwrap();
        assert_eq!(report.points.len(), 3);
        assert_eq!(report.ratios.len(), 2);
        for r in &report.ratios {
            assert_eq!(r.ideal_ratio, 2.0);
            if let ObservedRatio::Measured(v) = r.observed {
                assert!(v > 0.0);
            }
        }
    }

    #[test]
    fn run_single_experiment_yields_one_section() {
        let _l = test_lock();
        let mut cfg = BenchConfig::new(Profile::Quick, 1);
        cfg.repeat = Some(1);
        let sections = run_experiment(&cfg, Experiment::Strings).unwrap();
        assert_eq!(sections.len(), 1);
        assert!(sections[0].title.starts_with("strings"));
    }
}
