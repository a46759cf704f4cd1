//! Module for all the main functionality in the library (to keep everything sorted)
pub mod batch;
pub mod filter;
pub mod progress;
pub mod publish;
pub mod schedule;
pub mod update;
