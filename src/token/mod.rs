//! Session token payloads and signing
//!
//! The payload is the logical content of a session token prior to signing.
//! Expiry is the payload's own concern; integrity is the signer's. Nothing
//! here talks to the network.

pub mod payload;
pub mod signer;

pub use payload::TokenPayload;
pub use signer::{JwtSigner, TokenSigner};
