mod client;
mod coordinator;
mod error;
mod logger;
mod protocol;
mod types;

pub use client::{AlteregoClient, AlteregoClientBuilder};
pub use coordinator::{FeedIntervals, RECOMMENDED_TICK_INTERVAL, StationCoordinator};
pub use error::{Error, Result};
pub use logger::MessageLogMode;
pub use types::*;
