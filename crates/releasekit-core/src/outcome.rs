//! Combinators for composing many outcome-producing operations.
//!
//! Two policies exist:
//! - [`combine_all`] for independent operations: everything runs, every
//!   failure is reported.
//! - [`combine_in_order`] for dependent operations: sequential, stops at the
//!   first failure and never starts the operations after it.
//!
//! Operations are futures. A future does nothing until polled, so an
//! operation skipped by [`combine_in_order`] never executes.

use std::fmt::Display;
use std::future::Future;

use futures::future::join_all;
use tracing::debug;

use crate::{Error, Outcome};

/// Run every operation concurrently and collect all results.
///
/// Returns every value when all succeed. Otherwise returns
/// [`Error::Aggregate`] with one [`Error::Labeled`] entry per failed
/// operation, after every operation has completed.
pub async fn combine_all<T, L, F, I>(ops: I) -> Outcome<Vec<T>>
where
    I: IntoIterator<Item = (L, F)>,
    L: Display,
    F: Future<Output = Outcome<T>>,
{
    let (labels, futures): (Vec<String>, Vec<F>) = ops
        .into_iter()
        .map(|(label, op)| (label.to_string(), op))
        .unzip();

    let results = join_all(futures).await;
    collect_all(labels.into_iter().zip(results))
}

/// Run operations one at a time, in order, stopping at the first failure.
///
/// The returned failure is labeled with the identity of the operation that
/// failed. Operations after it are dropped without being polled.
pub async fn combine_in_order<T, L, F, I>(ops: I) -> Outcome<Vec<T>>
where
    I: IntoIterator<Item = (L, F)>,
    L: Display,
    F: Future<Output = Outcome<T>>,
{
    let ops = ops.into_iter();
    let mut values = Vec::with_capacity(ops.size_hint().0);

    for (label, op) in ops {
        match op.await {
            Ok(value) => values.push(value),
            Err(e) => {
                debug!(operation = %label, "Stopping ordered sequence after failure");
                return Err(Error::labeled(label.to_string(), e));
            }
        }
    }

    Ok(values)
}

/// Aggregate already computed results with the combine-all rule.
pub fn collect_all<T, L, I>(results: I) -> Outcome<Vec<T>>
where
    I: IntoIterator<Item = (L, Outcome<T>)>,
    L: Display,
{
    let mut values = Vec::new();
    let mut failures = Vec::new();

    for (label, result) in results {
        match result {
            Ok(value) => values.push(value),
            Err(e) => failures.push(Error::labeled(label.to_string(), e)),
        }
    }

    if failures.is_empty() {
        Ok(values)
    } else {
        Err(Error::Aggregate(failures))
    }
}
