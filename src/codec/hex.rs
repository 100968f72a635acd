//! Hex text encoding for cookie-safe tokens.

use crate::auth::Identity;
use crate::codec::{Codec, CodecError};

#[derive(Debug, Clone)]
pub struct Hex<C> {
    inner: C,
}

impl<C: Codec> Hex<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: Codec> Codec for Hex<C> {
    fn encode(&self, identity: &Identity) -> Result<Vec<u8>, CodecError> {
        Ok(hex::encode(self.inner.encode(identity)?).into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Identity, CodecError> {
        self.inner.decode(&hex::decode(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Compact;

    #[test]
    fn test_output_is_lowercase_hex() {
        let bytes = Hex::new(Compact).encode(&Identity::new("urn:test:1")).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), hex::encode("urn%3Atest%3A1"));
    }

    #[test]
    fn test_rejects_non_hex() {
        let codec = Hex::new(Compact);
        assert!(matches!(codec.decode(b"zz"), Err(CodecError::Hex(_))));
        assert!(matches!(codec.decode(b"abc"), Err(CodecError::Hex(_))));
    }
}
