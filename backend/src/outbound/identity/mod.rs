//! Identity provider adapters implementing `IdentityVerifier`.

mod firebase;

pub use firebase::{DEFAULT_JWKS_URL, FirebaseTokenVerifier};
