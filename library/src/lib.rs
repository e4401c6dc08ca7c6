#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod system;
pub mod units;
pub mod universe;

pub use universe::{load, Universe};

pub type Result<T> = std::result::Result<T, crate::error::Error>;
