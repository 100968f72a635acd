//! Identity token codec pipeline.
//!
//! # Data Flow
//! ```text
//! encode:  Identity
//!     → compact.rs (fields → `urn;k1;v1;...`)
//!     → salted.rs  (prepend random salt and payload length)
//!     → xor.rs     (mask with the security key)
//!     → hex.rs     (printable cookie text)
//!     → safe.rs    (transparent)
//!     → Token
//!
//! decode:  Token
//!     → safe.rs    (any inner failure becomes "no identity")
//!     → hex.rs → xor.rs → salted.rs → compact.rs
//!     → Option<Identity>
//! ```
//!
//! # Design Decisions
//! - Stages wrap an inner codec by value, so the nesting is fixed at compile
//!   time and decode always runs in the mirror order of encode
//! - Only `Compact` knows the identity layout; outer stages see bytes
//! - `Safe` is not a `Codec`: its decode is total and returns `Option`

pub mod compact;
pub mod hex;
pub mod safe;
pub mod salted;
pub mod xor;

use thiserror::Error;

use crate::auth::Identity;

pub use self::compact::Compact;
pub use self::hex::Hex;
pub use self::safe::Safe;
pub use self::salted::Salted;
pub use self::xor::Xor;

/// Errors raised by the inner codec stages.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Wrong number of fields after splitting the compact form.
    #[error("expected an odd number of fields, got {0}")]
    FieldCount(usize),

    /// A compact field is not valid percent-encoded UTF-8.
    #[error("malformed field: {0}")]
    Field(String),

    /// The identity has an empty URN and cannot be represented.
    #[error("identity URN is empty")]
    EmptyUrn,

    /// Salt header is missing or inconsistent with the payload.
    #[error("invalid salt: {0}")]
    Salt(String),

    /// Token is not valid hex text.
    #[error("invalid hex: {0}")]
    Hex(#[from] ::hex::FromHexError),
}

/// A reversible transform between an identity and bytes.
pub trait Codec: Send + Sync {
    /// Encode the identity into bytes.
    fn encode(&self, identity: &Identity) -> Result<Vec<u8>, CodecError>;

    /// Decode bytes produced by [`Codec::encode`].
    fn decode(&self, bytes: &[u8]) -> Result<Identity, CodecError>;
}

impl<C: Codec + ?Sized> Codec for Box<C> {
    fn encode(&self, identity: &Identity) -> Result<Vec<u8>, CodecError> {
        (**self).encode(identity)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Identity, CodecError> {
        (**self).decode(bytes)
    }
}

/// The cookie token pipeline: compact, salted, masked, hex, safe.
pub type TokenCodec = Safe<Hex<Xor<Salted<Compact>>>>;

/// Build the cookie token pipeline around the given secret key.
pub fn token_codec(secret: &str) -> TokenCodec {
    Safe::new(Hex::new(Xor::new(Salted::new(Compact), secret.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jeff() -> Identity {
        Identity::new("urn:facebook:1234").with_property("name", "Jeff Lebowski")
    }

    #[test]
    fn test_pipeline_round_trip() {
        let codec = token_codec("secret-key");
        let token = codec.encode(&jeff()).unwrap();
        assert_eq!(codec.decode(&token), Some(jeff()));
    }

    #[test]
    fn test_pipeline_tokens_are_printable_and_salted() {
        let codec = token_codec("secret-key");
        let first = codec.encode(&jeff()).unwrap();
        let second = codec.encode(&jeff()).unwrap();
        assert_ne!(first, second);
        assert!(first.iter().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_pipeline_rejects_other_key() {
        let token = token_codec("one").encode(&jeff()).unwrap();
        assert_ne!(token_codec("two").decode(&token), Some(jeff()));
    }

    #[test]
    fn test_pipeline_truncated_tokens_are_no_identity() {
        let codec = token_codec("secret-key");
        let token = codec.encode(&jeff()).unwrap();
        for len in 0..4 {
            assert_eq!(codec.decode(&token[..len]), None);
        }
        assert_eq!(codec.decode(b"not a token"), None);
        assert_eq!(codec.decode(&[0xff, 0x00, 0x13]), None);
    }

    #[test]
    fn test_boxed_codec_delegates() {
        let boxed: Box<dyn Codec> = Box::new(Compact);
        let bytes = boxed.encode(&jeff()).unwrap();
        assert_eq!(boxed.decode(&bytes).unwrap(), jeff());
    }
}
