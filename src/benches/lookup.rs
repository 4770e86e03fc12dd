//! Membership tests: linear scan vs hash lookup.

use std::collections::HashSet;
use std::hint::black_box;

use serde_json::json;

use crate::benches::{agreement, compare_both, measure_checked};
use crate::dataset;
use crate::error::Result;
use crate::harness::BenchConfig;
use crate::schema::Section;

/// Number of random probes in the mixed scenario.
const PROBES: usize = 64;

pub fn count_hits_scan(haystack: &[u64], needles: &[u64]) -> usize {
    needles.iter().filter(|n| haystack.contains(n)).count()
}

pub fn count_hits_set(haystack: &HashSet<u64>, needles: &[u64]) -> usize {
    needles.iter().filter(|n| haystack.contains(*n)).count()
}

pub fn run(cfg: &BenchConfig) -> Result<Section> {
    let n = cfg.size(200_000);
    let list = dataset::sequence(n);
    let set: HashSet<u64> = list.iter().copied().collect();
    // Probes over twice the value range: roughly half miss.
    let probes = dataset::random_values(PROBES, 2 * n as u64, cfg.seed);

    let scenarios: [(&str, Vec<u64>); 3] = [
        ("hit (last)", vec![n as u64 - 1]),
        ("miss", vec![n as u64 + 1]),
        ("random", probes),
    ];

    let trial = cfg.trial().with_batch(10);
    let mut section = Section::new(format!("lookup: O(N) scan vs O(1) hash (N={n})"));

    for (label, needles) in &scenarios {
        let scan = format!("Vec::contains {label}");
        let hashed = format!("HashSet::contains {label}");

        let extra = json!({ "haystack": n, "needles": needles.len() });
        section.measurements.push(
            measure_checked(&trial, &scan, || {
                count_hits_scan(black_box(&list), black_box(needles))
            })?
            .with_extra(extra.clone()),
        );
        section.measurements.push(
            measure_checked(&trial, &hashed, || {
                count_hits_set(black_box(&set), black_box(needles))
            })?
            .with_extra(extra),
        );

        section.agreements.extend(agreement(&section, &[scan.as_str(), hashed.as_str()]));
        section.comparisons.extend(compare_both(&section, &scan, &hashed));
    }

    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::Profile;
    use crate::reclaim::test_lock;

    #[test]
    fn scan_and_set_count_alike() {
        let list = dataset::sequence(1_000);
        let set: HashSet<u64> = list.iter().copied().collect();
        let needles = [0, 999, 1_000, 5_000, 10];
        assert_eq!(count_hits_scan(&list, &needles), 3);
        assert_eq!(count_hits_set(&set, &needles), 3);
    }

    #[test]
    fn section_pairs_each_scenario() {
        let _l = test_lock();
        let mut cfg = BenchConfig::new(Profile::Quick, 11);
        cfg.repeat = Some(1);
        let section = run(&cfg).unwrap();

        assert_eq!(section.measurements.len(), 6);
        assert_eq!(section.agreements.len(), 3);
        assert!(section.agreements.iter().all(|a| a.ok()));
        assert!(section.measurements.iter().all(|m| m.batch == 10));
        assert_eq!(section.measurements[5].extra["needles"], PROBES);
    }
}
