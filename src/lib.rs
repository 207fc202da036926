pub mod chart;
pub mod cli;
pub mod config;
pub mod cyclicality;
pub mod error;
pub mod file_reader;
pub mod file_writer;
pub mod logger;
pub mod model;
pub mod net_load;
pub mod pipeline;
pub mod staging;

pub use error::{Error, Result};
