//! Core library: inventory, tag classification, nearest-time matching and
//! location tag propagation.

pub mod classifier;
pub mod config;
pub mod error;
pub mod gateway;
pub mod matcher;
pub mod models;
pub mod pipeline;
pub mod scanner;
pub mod timestamp;

pub use error::{PhotoGpsError, Result};
pub use gateway::{ExifTool, MetadataGateway};
pub use pipeline::{PropagationRunner, PropagationSummary};
