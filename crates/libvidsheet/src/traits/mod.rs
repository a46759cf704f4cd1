//! Module for all traits that binaries implement to configure the library

pub mod pipeline_options;
