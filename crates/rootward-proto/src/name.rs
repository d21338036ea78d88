//! Domain names: textual representation, wire encoding with message
//! compression, decoding with pointer handling, and ancestry walks.
//!
//! Names are stored fully qualified (trailing dot); the root is `"."`.
//! Comparison and hashing are case-insensitive per RFC 1035; the canonical
//! form is lower-cased.

use crate::error::{Error, Result};
use crate::{MAX_LABEL_LENGTH, MAX_NAME_LENGTH, MAX_WIRE_NAME_LENGTH};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;
use std::str::FromStr;

/// Upper bound on compression pointer hops while decoding a single name.
const MAX_POINTER_JUMPS: usize = 64;

/// Compression pointers address at most 14 bits of message offset.
const MAX_POINTER_OFFSET: usize = 0x4000;

/// A fully-qualified DNS domain name.
///
/// # Wire Format
///
/// A name is a sequence of length-prefixed labels terminated by a zero
/// octet; `example.com.` encodes as:
///
/// ```text
/// 07 'e' 'x' 'a' 'm' 'p' 'l' 'e' 03 'c' 'o' 'm' 00
/// ```
///
/// Within a message a name (or any tail of it) may instead be a two-octet
/// pointer whose top two bits are `11` and whose low 14 bits give the
/// absolute offset of the remainder.
#[derive(Clone)]
pub struct Name {
    /// Presentation form with trailing dot; `"."` for the root.
    text: CompactString,
}

impl Name {
    /// Returns the root name.
    pub fn root() -> Self {
        Self {
            text: CompactString::const_new("."),
        }
    }

    /// Builds a name from label text the wire decoder produced, trailing
    /// dot already in place.
    fn from_decoded(text: CompactString) -> Self {
        Self { text }
    }

    /// Returns the presentation form, trailing dot included.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if this is the root name.
    pub fn is_root(&self) -> bool {
        self.text == "."
    }

    /// Iterates the labels left to right, root label excluded.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.text.split('.').filter(|l| !l.is_empty())
    }

    /// Removes the leftmost label. The root has no parent.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let rest = self
            .text
            .split_once('.')
            .map(|(_, rest)| rest)
            .unwrap_or("");
        Some(if rest.is_empty() {
            Self::root()
        } else {
            Self {
                text: CompactString::from(rest),
            }
        })
    }

    /// All strict ancestors below the root, nearest the root first.
    ///
    /// `www.example.com.` yields `[com., example.com.]`; a top-level name
    /// and the root both yield nothing.
    pub fn ancestors(&self) -> Vec<Self> {
        let mut chain = Vec::new();
        let mut current = self.parent();
        while let Some(name) = current {
            if name.is_root() {
                break;
            }
            current = name.parent();
            chain.push(name);
        }
        chain.reverse();
        chain
    }

    /// Returns true if `self` equals `other` or sits below it.
    pub fn is_subdomain_of(&self, other: &Name) -> bool {
        if other.is_root() {
            return true;
        }
        let this = self.text.as_bytes();
        let that = other.text.as_bytes();
        if this.len() < that.len() {
            return false;
        }
        let tail = &this[this.len() - that.len()..];
        if !tail.eq_ignore_ascii_case(that) {
            return false;
        }
        this.len() == that.len() || this[this.len() - that.len() - 1] == b'.'
    }

    /// Returns the lower-cased canonical form.
    #[must_use]
    pub fn canonical(&self) -> Self {
        Self {
            text: self.text.to_ascii_lowercase().into(),
        }
    }

    /// Encoded wire length, length octets and terminator included.
    pub fn wire_len(&self) -> usize {
        if self.is_root() {
            1
        } else {
            self.text.len() + 1
        }
    }

    /// Encodes the name without compression.
    pub fn encode(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(self.wire_len());
        for label in self.labels() {
            wire.push(label.len() as u8);
            wire.extend_from_slice(label.as_bytes());
        }
        wire.push(0);
        wire
    }

    /// Encodes the name against the message emitted so far, compressing
    /// with pointers where a suffix already occurs in `msg`.
    ///
    /// The strategy, in order: emit a pointer to an occurrence of the whole
    /// encoded name; emit the first label followed by a pointer when the
    /// tail (or the same label-plus-pointer sequence) occurs; otherwise
    /// recurse on the tail and fall through to literal labels.
    pub fn encode_compressed(&self, msg: &[u8]) -> Vec<u8> {
        compress_name(&self.text, msg)
    }
}

/// Searches `haystack` for `needle` at an offset a pointer can express.
fn find_pointable(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|w| w == needle)
        .filter(|&i| i < MAX_POINTER_OFFSET)
}

/// Two-octet compression pointer to `offset`.
fn pointer(offset: usize) -> [u8; 2] {
    [0xC0 | (offset >> 8) as u8, (offset & 0xFF) as u8]
}

/// Uncompressed encoding of a presentation-form name (trailing dot
/// optional; empty and `"."` are the root).
fn encode_plain(name: &str) -> Vec<u8> {
    let trimmed = name.trim_end_matches('.');
    if trimmed.is_empty() {
        return vec![0];
    }
    let mut wire = Vec::with_capacity(trimmed.len() + 2);
    for label in trimmed.split('.') {
        wire.push(label.len() as u8);
        wire.extend_from_slice(label.as_bytes());
    }
    wire.push(0);
    wire
}

fn compress_name(name: &str, msg: &[u8]) -> Vec<u8> {
    let trimmed = name.trim_end_matches('.');
    if trimmed.is_empty() {
        return vec![0];
    }

    let plain = encode_plain(trimmed);
    if msg.is_empty() {
        return plain;
    }

    // Whole name already present.
    if let Some(i) = find_pointable(msg, &plain) {
        return pointer(i).to_vec();
    }

    if let Some((first, rest)) = trimmed.split_once('.') {
        let mut head = Vec::with_capacity(first.len() + 3);
        head.push(first.len() as u8);
        head.extend_from_slice(first.as_bytes());

        // The tail occurs literally: point at it, unless this exact
        // label-plus-pointer sequence is itself already in the message.
        let rest_plain = encode_plain(rest);
        if let Some(i) = find_pointable(msg, &rest_plain) {
            let mut search = head.clone();
            search.extend_from_slice(&pointer(i));
            if let Some(j) = find_pointable(msg, &search) {
                return pointer(j).to_vec();
            }
        }

        let mut out = head;
        out.extend_from_slice(&compress_name(rest, msg));
        return out;
    }

    plain
}

/// Decodes a name from `msg` starting at `offset`.
///
/// Returns the name and the offset of the octet following it in the
/// caller's reading order; a pointer never advances the cursor past its
/// own two octets. Pointers must target earlier offsets.
pub fn decode_name(msg: &[u8], offset: usize) -> Result<(Name, usize)> {
    let mut text = CompactString::default();
    let mut pos = offset;
    let mut next = None;
    let mut jumps = 0;
    let mut wire_len = 0usize;

    loop {
        let len_byte = *msg.get(pos).ok_or(Error::UnexpectedEof { offset: pos })?;

        if len_byte & 0xC0 == 0xC0 {
            let low = *msg
                .get(pos + 1)
                .ok_or(Error::UnexpectedEof { offset: pos + 1 })?;
            let target = usize::from(len_byte & 0x3F) << 8 | usize::from(low);
            if target >= pos {
                return Err(Error::MalformedPointer {
                    offset: pos,
                    target,
                });
            }
            jumps += 1;
            if jumps > MAX_POINTER_JUMPS {
                return Err(Error::MalformedPointer {
                    offset: pos,
                    target,
                });
            }
            if next.is_none() {
                next = Some(pos + 2);
            }
            pos = target;
            continue;
        }

        if len_byte >= 0x40 {
            return Err(Error::InvalidLabelType {
                value: len_byte,
                offset: pos,
            });
        }

        let len = usize::from(len_byte);
        if len == 0 {
            pos += 1;
            break;
        }

        let label = msg
            .get(pos + 1..pos + 1 + len)
            .ok_or(Error::UnexpectedEof {
                offset: pos + 1 + len,
            })?;
        wire_len += 1 + len;
        if wire_len + 1 > MAX_WIRE_NAME_LENGTH {
            return Err(Error::NameTooLong { length: wire_len });
        }

        for &b in label {
            text.push(b as char);
        }
        text.push('.');
        pos += 1 + len;
    }

    if text.is_empty() {
        text.push('.');
    }
    Ok((Name::from_decoded(text), next.unwrap_or(pos)))
}

impl FromStr for Name {
    type Err = Error;

    /// Parses a presentation-form name. A missing trailing dot is implied;
    /// the empty string and `"."` are the root.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s == "." {
            return Ok(Self::root());
        }

        let trimmed = s.strip_suffix('.').unwrap_or(s);
        if trimmed.len() > MAX_NAME_LENGTH {
            return Err(Error::NameTooLong {
                length: trimmed.len(),
            });
        }

        for label in trimmed.split('.') {
            if label.is_empty() || label.len() > MAX_LABEL_LENGTH {
                return Err(Error::LabelTooLong {
                    length: label.len(),
                });
            }
            for (i, c) in label.chars().enumerate() {
                if !c.is_ascii_alphanumeric() && !matches!(c, '-' | '_' | '*' | '/') {
                    return Err(Error::InvalidLabelChar {
                        character: c,
                        position: i,
                    });
                }
            }
        }

        let mut text = CompactString::from(trimmed);
        text.push('.');
        Ok(Self { text })
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.text.as_str())
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.text.eq_ignore_ascii_case(&other.text)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.text.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::root()
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::from_str(&text).map_err(serde::de::Error::custom)
    }
}

/// Builds the reverse-lookup name for an address, without trailing dot.
///
/// IPv4 addresses map into `in-addr.arpa` with the octets reversed; IPv6
/// addresses map into `ip6.arpa` with all 32 nibbles reversed.
pub fn arpa_name(addr: IpAddr) -> String {
    match addr {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            format!("{}.{}.{}.{}.in-addr.arpa", o[3], o[2], o[1], o[0])
        }
        IpAddr::V6(v6) => {
            let mut nibbles: SmallVec<[u8; 32]> = SmallVec::new();
            for byte in v6.octets() {
                nibbles.push(byte >> 4);
                nibbles.push(byte & 0x0F);
            }
            let mut out = String::with_capacity(72);
            for nibble in nibbles.iter().rev() {
                out.push(char::from_digit(u32::from(*nibble), 16).unwrap_or('0'));
                out.push('.');
            }
            out.push_str("ip6.arpa");
            out
        }
    }
}
