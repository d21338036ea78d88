//! TXT record data.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// TXT record data: an ordered sequence of character strings, each at most
/// 255 octets (RFC 1035 §3.3.14).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TXT {
    /// The strings, in wire order.
    pub texts: Vec<String>,
}

impl TXT {
    /// Builds TXT data, rejecting over-long strings.
    pub fn new(texts: Vec<String>) -> Result<Self> {
        for text in &texts {
            if text.len() > 255 {
                return Err(Error::TextTooLong { length: text.len() });
            }
        }
        Ok(Self { texts })
    }

    pub(crate) fn parse(data: &[u8]) -> Result<Self> {
        Ok(Self {
            texts: decode_texts(data)?,
        })
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        encode_texts(&self.texts)
    }
}

impl fmt::Display for TXT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for text in &self.texts {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{text:?}")?;
            first = false;
        }
        Ok(())
    }
}

/// Encodes character strings as length-prefixed octets.
pub fn encode_texts(texts: &[String]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for text in texts {
        if text.len() > 255 {
            return Err(Error::TextTooLong { length: text.len() });
        }
        out.push(text.len() as u8);
        out.extend_from_slice(text.as_bytes());
    }
    Ok(out)
}

/// Decodes length-prefixed character strings until the data runs out.
pub fn decode_texts(data: &[u8]) -> Result<Vec<String>> {
    let mut texts = Vec::with_capacity(1);
    let mut pos = 0;
    while pos < data.len() {
        let len = usize::from(data[pos]);
        let text = data
            .get(pos + 1..pos + 1 + len)
            .ok_or(Error::UnexpectedEof {
                offset: pos + 1 + len,
            })?;
        texts.push(String::from_utf8_lossy(text).into_owned());
        pos += 1 + len;
    }
    Ok(texts)
}
