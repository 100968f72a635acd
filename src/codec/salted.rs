//! Random salt prefix.

use rand::{Rng, RngCore};

use crate::auth::Identity;
use crate::codec::{Codec, CodecError};

/// Shortest salt written in front of the payload.
pub const MIN_SALT: usize = 8;

/// Longest salt written in front of the payload.
pub const MAX_SALT: usize = 32;

/// Size of the big-endian payload length written after the salt.
const LENGTH_BYTES: usize = 4;

/// Frames the inner encoding as `[len][len random bytes][payload len][payload]`.
///
/// The salt makes every encoding of an identity different; the payload
/// length makes a cut-short token fail instead of decoding to a shorter
/// identity.
#[derive(Debug, Clone)]
pub struct Salted<C> {
    inner: C,
}

impl<C: Codec> Salted<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: Codec> Codec for Salted<C> {
    fn encode(&self, identity: &Identity) -> Result<Vec<u8>, CodecError> {
        let payload = self.inner.encode(identity)?;
        let declared = u32::try_from(payload.len())
            .map_err(|_| CodecError::Salt(format!("payload of {} bytes", payload.len())))?;
        let mut rng = rand::thread_rng();
        let len = rng.gen_range(MIN_SALT..=MAX_SALT);

        let mut out = vec![0u8; 1 + len];
        out[0] = len as u8;
        rng.fill_bytes(&mut out[1..]);
        out.extend_from_slice(&declared.to_be_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Identity, CodecError> {
        let (&len, rest) = bytes
            .split_first()
            .ok_or_else(|| CodecError::Salt("empty input".into()))?;
        let len = len as usize;
        if !(MIN_SALT..=MAX_SALT).contains(&len) {
            return Err(CodecError::Salt(format!("length {} out of range", len)));
        }
        if rest.len() < len + LENGTH_BYTES {
            return Err(CodecError::Salt(format!(
                "declared {} bytes, only {} present",
                len,
                rest.len()
            )));
        }
        let (header, payload) = rest[len..].split_at(LENGTH_BYTES);
        let mut declared = [0u8; LENGTH_BYTES];
        declared.copy_from_slice(header);
        let declared = u32::from_be_bytes(declared) as usize;
        if declared != payload.len() {
            return Err(CodecError::Salt(format!(
                "payload declared {} bytes, found {}",
                declared,
                payload.len()
            )));
        }
        self.inner.decode(payload)
    }
}
