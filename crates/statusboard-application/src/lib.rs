//! Application layer for Statusboard.
//!
//! Use cases that combine the report store, the identity resolver and the
//! access policy, and report outcomes through the notification sink.

pub mod context;
pub mod form;
pub mod identity_usecase;
pub mod report_usecase;

#[cfg(test)]
mod test_support;

pub use context::AppContext;
pub use form::ReportForm;
pub use identity_usecase::IdentityUseCase;
pub use report_usecase::{Dashboard, ReportUseCase};
