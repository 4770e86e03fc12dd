use std::hint::black_box;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::{BoxError, HarnessError, Result, Stage};
use crate::reclaim;
use crate::workload::Workload;

#[derive(Clone, Copy, Debug)]
pub enum Profile {
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub profile: Profile,
    pub seed: u64,
    /// Overrides the profile's repeat count.
    pub repeat: Option<usize>,
    pub suppress_reclaim: bool,
}

impl BenchConfig {
    pub fn new(profile: Profile, seed: u64) -> Self {
        BenchConfig {
            profile,
            seed,
            repeat: None,
            suppress_reclaim: true,
        }
    }

    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }

    pub fn warmup_iters(&self) -> usize {
        match self.profile {
            Profile::Quick => 1,
            Profile::Full => 2,
        }
    }

    pub fn repeat_count(&self) -> usize {
        self.repeat.unwrap_or(match self.profile {
            Profile::Quick => 3,
            Profile::Full => 7,
        })
    }

    /// Scale a quick-profile problem size up for the full profile.
    pub fn size(&self, quick: usize) -> usize {
        match self.profile {
            Profile::Quick => quick,
            Profile::Full => quick * 10,
        }
    }

    pub fn trial(&self) -> TrialConfig {
        TrialConfig {
            repeat: self.repeat_count(),
            warmup: self.warmup_iters(),
            batch: 1,
            suppress_reclaim: self.suppress_reclaim,
        }
    }
}

/// How one workload is sampled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialConfig {
    /// Number of timed sample windows. Must be at least 1.
    pub repeat: usize,
    /// Untimed executions before the first window.
    pub warmup: usize,
    /// Executions per window. Must be at least 1.
    pub batch: usize,
    /// Suspend reclamation for the whole session.
    pub suppress_reclaim: bool,
}

impl Default for TrialConfig {
    fn default() -> Self {
        TrialConfig {
            repeat: 7,
            warmup: 0,
            batch: 1,
            suppress_reclaim: true,
        }
    }
}

impl TrialConfig {
    pub fn new(repeat: usize) -> Self {
        TrialConfig {
            repeat,
            ..Default::default()
        }
    }

    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_batch(mut self, batch: usize) -> Self {
        self.batch = batch;
        self
    }

    pub fn with_suppress_reclaim(mut self, suppress: bool) -> Self {
        self.suppress_reclaim = suppress;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.repeat == 0 {
            return Err(HarnessError::invalid("repeat count must be at least 1"));
        }
        if self.batch == 0 {
            return Err(HarnessError::invalid("batch size must be at least 1"));
        }
        Ok(())
    }
}

/// Samples collected for one workload under one configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleSet {
    workload: String,
    batch: usize,
    samples: Vec<Duration>,
}

impl SampleSet {
    /// Wrap samples collected elsewhere, e.g. replayed from a report.
    pub fn from_samples(workload: impl Into<String>, batch: usize, samples: Vec<Duration>) -> Self {
        SampleSet {
            workload: workload.into(),
            batch: batch.max(1),
            samples,
        }
    }

    pub fn workload(&self) -> &str {
        &self.workload
    }

    /// Executions covered by each sample.
    pub fn batch(&self) -> usize {
        self.batch
    }

    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn into_samples(self) -> Vec<Duration> {
        self.samples
    }
}

/// Where workload outputs go once an execution returns.
pub enum Retention<T> {
    /// Dropped immediately, inside the timed window.
    Drop,
    /// Kept alive until the retention itself is dropped.
    Defer(Vec<T>),
}

impl<T> Retention<T> {
    /// Defer drops while reclamation is disabled, drop in place otherwise.
    pub fn for_current_state(capacity: usize) -> Self {
        if reclaim::is_enabled() {
            Retention::Drop
        } else {
            Retention::Defer(Vec::with_capacity(capacity))
        }
    }

    #[inline]
    fn keep(&mut self, out: T) {
        match self {
            Retention::Drop => drop(black_box(out)),
            Retention::Defer(held) => held.push(black_box(out)),
        }
    }

    pub fn retained(&self) -> usize {
        match self {
            Retention::Drop => 0,
            Retention::Defer(held) => held.len(),
        }
    }
}

/// Time one execution of `workload`. The output is dropped inside the
/// window; errors propagate without a sample.
pub fn measure<W: Workload + ?Sized>(workload: &mut W) -> Result<Duration, BoxError> {
    measure_into(workload, 1, &mut Retention::Drop)
}

/// Time `batch` consecutive executions as a single window, handing every
/// output to `retention` before the window closes.
pub fn measure_into<W: Workload + ?Sized>(
    workload: &mut W,
    batch: usize,
    retention: &mut Retention<W::Output>,
) -> Result<Duration, BoxError> {
    let start = Instant::now();
    for _ in 0..batch {
        let out = workload.execute()?;
        retention.keep(out);
    }
    Ok(start.elapsed())
}

/// Run a full trial session: validate, warm up, then take `repeat` samples
/// sequentially.
///
/// With `suppress_reclaim` set, reclamation is suspended from before the
/// first sample until after the last one, and released on every exit path.
/// Outputs retained during suspension are freed after the release. A failing
/// workload ends the session immediately; nothing is retried.
pub fn run<W: Workload + ?Sized>(workload: &mut W, config: &TrialConfig) -> Result<SampleSet> {
    config.validate()?;

    let name = workload.name().to_string();
    debug!(
        workload = %name,
        repeat = config.repeat,
        warmup = config.warmup,
        batch = config.batch,
        suppress_reclaim = config.suppress_reclaim,
        "starting trial session"
    );

    let failure = |stage, index| {
        let name = name.clone();
        move |source| HarnessError::WorkloadFailure {
            workload: name,
            stage,
            index,
            source,
        }
    };

    for i in 0..config.warmup {
        let out = workload.execute().map_err(failure(Stage::Warmup, i))?;
        drop(black_box(out));
    }

    let guard = config.suppress_reclaim.then(reclaim::suspend);
    let mut retention = Retention::for_current_state(config.repeat * config.batch);

    let mut samples = Vec::with_capacity(config.repeat);
    for i in 0..config.repeat {
        let sample = measure_into(workload, config.batch, &mut retention)
            .map_err(failure(Stage::Sample, i))?;
        samples.push(sample);
    }

    drop(guard);
    debug!(workload = %name, retained = retention.retained(), "trial session finished");
    drop(retention);

    Ok(SampleSet {
        workload: name,
        batch: config.batch,
        samples,
    })
}

/// Smallest non-zero step observed on the monotonic clock. Estimated once
/// per process; never zero.
pub fn clock_resolution() -> Duration {
    static RESOLUTION: OnceLock<Duration> = OnceLock::new();
    *RESOLUTION.get_or_init(|| {
        let mut best = Duration::MAX;
        for _ in 0..1_000 {
            let t0 = Instant::now();
            let mut t1 = Instant::now();
            while t1 == t0 {
                t1 = Instant::now();
            }
            best = best.min(t1 - t0);
        }
        best.max(Duration::from_nanos(1))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reclaim::test_lock;
    use crate::workload::{try_workload, workload};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn returns_exactly_repeat_samples() {
        let _l = test_lock();
        for repeat in 1..=9 {
            let mut w = workload("spin", || (0..1_000u64).map(black_box).sum::<u64>());
            let set = run(&mut w, &TrialConfig::new(repeat)).unwrap();
            assert_eq!(set.len(), repeat);
            assert_eq!(set.workload(), "spin");
            assert!(set.samples().iter().all(|s| *s >= Duration::ZERO));
        }
    }

    #[test]
    fn warmup_and_batch_execution_counts() {
        let _l = test_lock();
        let calls = Cell::new(0usize);
        let mut w = workload("count", || calls.set(calls.get() + 1));
        let cfg = TrialConfig::new(4).with_warmup(3).with_batch(5);
        let set = run(&mut w, &cfg).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.batch(), 5);
        assert_eq!(calls.get(), 3 + 4 * 5);
    }

    #[test]
    fn zero_repeat_rejected_before_running() {
        let calls = Cell::new(0usize);
        let mut w = workload("never", || calls.set(calls.get() + 1));
        let err = run(&mut w, &TrialConfig::new(0).with_warmup(2)).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidConfiguration(_)));
        assert_eq!(calls.get(), 0);

        let err = run(&mut w, &TrialConfig::new(3).with_batch(0)).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidConfiguration(_)));
    }

    #[test]
    fn failure_stops_session_and_restores_reclaim() {
        let _l = test_lock();
        let calls = Cell::new(0usize);
        let mut w = try_workload("flaky", || {
            calls.set(calls.get() + 1);
            if calls.get() == 3 {
                Err("boom")
            } else {
                Ok(calls.get())
            }
        });
        let err = run(&mut w, &TrialConfig::new(10)).unwrap_err();
        match err {
            HarnessError::WorkloadFailure {
                workload,
                stage,
                index,
                ..
            } => {
                assert_eq!(workload, "flaky");
                assert_eq!(stage, Stage::Sample);
                assert_eq!(index, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls.get(), 3);
        assert!(reclaim::is_enabled());
    }

    #[test]
    fn warmup_failure_is_reported() {
        let mut w = try_workload("cold", || Err::<(), _>("not ready"));
        let err = run(&mut w, &TrialConfig::new(2).with_warmup(1)).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::WorkloadFailure {
                stage: Stage::Warmup,
                index: 0,
                ..
            }
        ));
    }

    #[test]
    fn suppression_defers_output_drops() {
        let _l = test_lock();

        struct Tracked(Rc<Cell<usize>>);
        impl Drop for Tracked {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let dropped = Rc::new(Cell::new(0usize));
        let seen_during = Rc::new(Cell::new(0usize));
        let (d, s) = (dropped.clone(), seen_during.clone());
        let mut w = workload("alloc", move || {
            s.set(s.get().max(d.get()));
            Tracked(d.clone())
        });

        run(&mut w, &TrialConfig::new(5)).unwrap();
        assert_eq!(seen_during.get(), 0);
        assert_eq!(dropped.get(), 5);
        assert!(reclaim::is_enabled());

        dropped.set(0);
        seen_during.set(0);
        run(&mut w, &TrialConfig::new(5).with_suppress_reclaim(false)).unwrap();
        assert_eq!(seen_during.get(), 4);
        assert_eq!(dropped.get(), 5);
    }

    #[test]
    fn suppression_leaves_prior_disable_in_place() {
        let _l = test_lock();
        reclaim::disable();
        let mut w = workload("noop", || ());
        run(&mut w, &TrialConfig::new(2)).unwrap();
        assert!(!reclaim::is_enabled());
        reclaim::enable();
        assert!(reclaim::is_enabled());
    }

    #[test]
    fn measure_times_one_execution() {
        let calls = Cell::new(0usize);
        let mut w = workload("sleepy", || {
            calls.set(calls.get() + 1);
            std::thread::sleep(Duration::from_millis(2));
        });
        let d = measure(&mut w).unwrap();
        assert!(d >= Duration::from_millis(2));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn clock_resolution_is_positive_and_stable() {
        let r = clock_resolution();
        assert!(r > Duration::ZERO);
        assert!(r < Duration::from_millis(20));
        assert_eq!(r, clock_resolution());
    }

    #[test]
    fn min_spread_does_not_grow_with_repeat() {
        let _l = test_lock();
        let spread = |repeat: usize| {
            let mins: Vec<Duration> = (0..12)
                .map(|_| {
                    let mut w = workload("tiny", || black_box(1u64) + 1);
                    let set = run(&mut w, &TrialConfig::new(repeat)).unwrap();
                    *set.samples().iter().min().unwrap()
                })
                .collect();
            let lo = *mins.iter().min().unwrap();
            let hi = *mins.iter().max().unwrap();
            hi - lo
        };

        let coarse = spread(3);
        let fine = spread(200);
        // Generous slack: the property is statistical.
        assert!(
            fine <= coarse + clock_resolution() * 50 + Duration::from_micros(20),
            "min spread grew: {fine:?} vs {coarse:?}"
        );
    }
}
