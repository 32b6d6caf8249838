pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod identity;
pub mod notification;
pub mod policy;
pub mod report;
pub mod storage;

// Re-export common error type
pub use error::{Result, StatusboardError};
