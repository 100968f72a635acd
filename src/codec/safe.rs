//! Outermost stage: decode never fails.

use crate::auth::Identity;
use crate::codec::{Codec, CodecError};

/// Turns every inner decode failure into "no identity".
///
/// Encoding passes straight through; a failure there is a bug in the caller
/// and is returned as-is.
#[derive(Debug, Clone)]
pub struct Safe<C> {
    inner: C,
}

impl<C: Codec> Safe<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn encode(&self, identity: &Identity) -> Result<Vec<u8>, CodecError> {
        self.inner.encode(identity)
    }

    pub fn decode(&self, token: &[u8]) -> Option<Identity> {
        match self.inner.decode(token) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::debug!(error = %e, "Discarding undecodable identity token");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Compact, Hex};

    #[test]
    fn test_failures_become_none() {
        let codec = Safe::new(Hex::new(Compact));
        assert_eq!(codec.decode(b"xyz"), None);
        assert_eq!(codec.decode(b""), None);
    }

    #[test]
    fn test_encode_errors_propagate() {
        let codec = Safe::new(Compact);
        assert!(codec.encode(&Identity::new("")).is_err());
    }
}
