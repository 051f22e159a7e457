//! # prewarm-preload
//!
//! Executes cache-warming plans: pre-populates responses for likely
//! questions, warms preferred and time-appropriate modules, and seeds
//! common-question bundles per module. Execution is fire-and-forget: a
//! failed action is logged and skipped, never aborting the batch.

pub mod catalog;
pub mod scheduler;

pub use catalog::StaticModuleCatalog;
pub use scheduler::PreloadScheduler;
