pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod gateway;
pub mod types;

pub use config::{Config, Timings};
pub use controller::{ControllerSettings, DiscoveryController, ScanOutcome, ViewState};
pub use error::{DiscoveryError, Result};
pub use gateway::{DiscoveryApi, Filters, HttpGateway, ListQuery};
pub use types::{DiscoveryRecord, Pagination, RecordPage, RecordStatus, Stats, TriggerAck};
