//! Deployment plans for releasekit.
//!
//! A plan collects the packaging tasks for one project and runs them all
//! against a shared [`BuildContext`](releasekit_packaging::BuildContext).

pub mod plan;

pub use plan::DeploymentPlan;
