//! # Marquee (catalog backend: accounts & sessions)
//!
//! `marquee` is the account and session authority for the movie catalog.
//! It owns credential verification, access-token issuance, and the
//! refresh-token rotation lifecycle.
//!
//! ## Sessions
//!
//! - **Access tokens** are short-lived signed JWTs (`sub`, `roles`,
//!   `iat`, `exp`). They are never persisted; expiry is embedded in the
//!   claims.
//! - **Refresh tokens** are opaque random values. The database stores
//!   only a SHA-256 digest; the raw value exists exactly once, in the
//!   response that issued it.
//! - **Rotation is single-use.** A refresh consumes the presented token
//!   and issues a replacement in the same operation. Consuming is one
//!   conditional UPDATE, so under concurrent refreshes of the same value
//!   exactly one caller wins — across processes sharing the database.
//!
//! ## Errors
//!
//! Login and refresh failures are deliberately indistinguishable on the
//! wire (`401` in every case) to prevent account and token enumeration.

pub mod api;
pub mod auth;
pub mod cli;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
