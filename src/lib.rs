pub mod common;
pub mod config;
pub mod error;
pub mod parsers;
pub mod shell;
pub mod store;
pub mod tracks;
pub mod txtfiles;

#[cfg(test)]
mod testing;

pub use common::Filetype;
pub use config::Config;
pub use error::{DubplateError, DubplateExpectedError, Result};
pub use store::{Store, Track};

#[cfg(test)]
mod txtfiles_test;
