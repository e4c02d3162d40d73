#![doc = include_str!("../README.md")]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod log;
pub mod lookup;
pub mod selectors;
pub mod tools;

pub use config::Config;
pub use error::{BilregError, Result};
pub use lookup::*;
