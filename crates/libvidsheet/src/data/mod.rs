//! Module for the Data the library works with: the tabular dataset, its rows and the durable store

pub mod dataset;
pub mod row;
pub mod store;
