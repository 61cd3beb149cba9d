//! Credential adapters: bcrypt password hashing and HS256 session tokens.

mod bcrypt_hasher;
mod jwt_codec;
mod signing_key;

pub use bcrypt_hasher::{BcryptPasswordHasher, DEFAULT_BCRYPT_COST};
pub use jwt_codec::{JwtSessionCodec, SESSION_TTL_HOURS};
pub use signing_key::{
    BuildMode, SIGNING_KEY_MIN_LEN, SigningKey, SigningKeyError, signing_key_from_env,
};
