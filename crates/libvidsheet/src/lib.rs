//! Library of "vidsheet", contains all the logic needed for the binary
//!
//! A spreadsheet (CSV file) lists videos to publish or update; every row carries a progress marker column so that
//! a batch can be stopped at any point and simply be run again without redoing already finished rows.

#![allow(clippy::needless_return)]
#![allow(special_module_name)] // because of module "main", dont have a better name for that
#![warn(clippy::implicit_return)]

#[macro_use]
extern crate log;

pub mod auth;
pub mod data;
pub mod error;
pub mod fetch;
pub mod host;
pub mod main;
pub mod traits;
pub mod utils;
pub use error::Error;

pub use chrono;
pub use chrono_tz;
