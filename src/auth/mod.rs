//! Account credentials, token issuance, and refresh-token rotation.

pub mod audit;
pub mod config;
pub mod error;
pub mod jwt;
pub mod password;
pub mod roles;
pub mod service;
pub mod storage;
pub mod utils;

pub use audit::{spawn_audit_worker, AuditSink};
pub use config::AuthConfig;
pub use error::AuthError;
pub use roles::Role;
pub use service::{SessionService, TokenPair};
