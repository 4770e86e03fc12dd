//! Workloads: the named units of computation the harness measures.
//!
//! A workload is borrowed by the harness for the duration of a call and
//! never stored. Infallible closures are wrapped with [`workload`], closures
//! returning `Result` with [`try_workload`].

use crate::error::BoxError;

/// A named, zero-argument unit of computation.
pub trait Workload {
    /// Value produced by one execution.
    type Output;

    fn name(&self) -> &str;

    /// Execute the workload once.
    fn execute(&mut self) -> Result<Self::Output, BoxError>;
}

impl<W: Workload + ?Sized> Workload for &mut W {
    type Output = W::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn execute(&mut self) -> Result<Self::Output, BoxError> {
        (**self).execute()
    }
}

/// Workload backed by an infallible closure.
pub struct FnWorkload<F> {
    name: String,
    body: F,
}

impl<F, T> Workload for FnWorkload<F>
where
    F: FnMut() -> T,
{
    type Output = T;

    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn execute(&mut self) -> Result<T, BoxError> {
        Ok((self.body)())
    }
}

/// Workload backed by a closure that may fail.
pub struct TryFnWorkload<F> {
    name: String,
    body: F,
}

impl<F, T, E> Workload for TryFnWorkload<F>
where
    F: FnMut() -> Result<T, E>,
    E: Into<BoxError>,
{
    type Output = T;

    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn execute(&mut self) -> Result<T, BoxError> {
        (self.body)().map_err(Into::into)
    }
}

/// Wrap an infallible closure as a named workload.
pub fn workload<F, T>(name: impl Into<String>, body: F) -> FnWorkload<F>
where
    F: FnMut() -> T,
{
    FnWorkload {
        name: name.into(),
        body,
    }
}

/// Wrap a fallible closure as a named workload. An `Err` aborts the trial
/// session with [`crate::HarnessError::WorkloadFailure`].
pub fn try_workload<F, T, E>(name: impl Into<String>, body: F) -> TryFnWorkload<F>
where
    F: FnMut() -> Result<T, E>,
    E: Into<BoxError>,
{
    TryFnWorkload {
        name: name.into(),
        body,
    }
}
