//! Compact identity serialization.
//!
//! Layout: `urn;key1;value1;key2;value2...`, each field percent-encoded so
//! the `;` delimiter never occurs inside a field.

use crate::auth::Identity;
use crate::codec::{Codec, CodecError};

const DELIMITER: char = ';';

/// Innermost stage: identity fields to delimited bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compact;

impl Codec for Compact {
    fn encode(&self, identity: &Identity) -> Result<Vec<u8>, CodecError> {
        if identity.urn().is_empty() {
            return Err(CodecError::EmptyUrn);
        }
        let mut out = String::from(urlencoding::encode(identity.urn()));
        for (key, value) in identity.properties() {
            out.push(DELIMITER);
            out.push_str(&urlencoding::encode(key));
            out.push(DELIMITER);
            out.push_str(&urlencoding::encode(value));
        }
        Ok(out.into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Identity, CodecError> {
        let text = std::str::from_utf8(bytes).map_err(|e| CodecError::Field(e.to_string()))?;
        let fields = text
            .split(DELIMITER)
            .map(|f| {
                urlencoding::decode(f)
                    .map(|s| s.into_owned())
                    .map_err(|e| CodecError::Field(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if fields.len() % 2 == 0 {
            return Err(CodecError::FieldCount(fields.len()));
        }

        let mut fields = fields.into_iter();
        let urn = fields.next().unwrap_or_default();
        if urn.is_empty() {
            return Err(CodecError::EmptyUrn);
        }

        let mut identity = Identity::new(urn);
        while let (Some(key), Some(value)) = (fields.next(), fields.next()) {
            identity = identity.with_property(key, value);
        }
        Ok(identity)
    }
}
