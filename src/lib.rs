pub mod cli;
pub mod config;
pub mod dynamo;
pub mod error;
#[cfg(test)]
mod memory;
pub mod policy;
pub mod rds;
pub mod s3;

pub use error::{Error, ErrorKind, Result};
