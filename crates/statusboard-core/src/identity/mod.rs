//! Identity domain module.
//!
//! Resolves who the actor is and which role backs their access decisions.
//! The mode (mock or external session) is chosen once at construction.
//!
//! # Module Structure
//!
//! - `model`: `Role`, `UserProfile`, `Session`, `Identity` and friends
//! - `role`: primary-role derivation from external role metadata
//! - `provider`: the external `SessionProvider` port
//! - `mock`: local, storage-mirrored identity
//! - `external`: session-provider-backed identity
//! - `resolver`: `IdentityResolver`, the sum of the two

mod external;
mod mock;
mod model;
mod provider;
mod resolver;
pub mod role;

// Re-export public API
pub use external::{ExternalIdentity, ExternalState};
pub use mock::MockIdentity;
pub use model::{
    Capabilities, ChangeOutcome, ExternalUser, Identity, IdentityMode, Role, Session, UserProfile,
};
pub use provider::{AuthEvent, SessionChange, SessionProvider};
pub use resolver::{IdentityResolver, IdentitySource};
pub use role::{derive_primary_role, recognized_roles};
