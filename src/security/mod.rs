/// Security primitives: password hashing, the token codec, and the
/// Redis-backed revocation registry.
pub mod jwt;
pub mod password;
pub mod revocation;

pub use jwt::{
    Claims, DecodeError, TokenClass, TokenCodec, UserClaim, ACCESS_TOKEN_TTL_SECS,
    REFRESH_TOKEN_TTL_SECS,
};
pub use revocation::{RevocationRegistry, RevocationStore, JTI_TTL_SECS};
