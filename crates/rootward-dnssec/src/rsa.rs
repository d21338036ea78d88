//! RSA public-key handling for algorithm 8 (RSA/SHA-256).
//!
//! DNSKEY key material for RSA follows RFC 3110: an exponent length (one
//! octet, or a zero octet followed by a two-octet length), the public
//! exponent, then the modulus. Verification is PKCS#1 v1.5 over SHA-256;
//! the parameter set accepts 1024-bit moduli because some deployed zones
//! still sign with them.

use crate::{DnssecError, Result};
use ring::signature::{UnparsedPublicKey, RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY};

/// An RSA public key split into its RFC 3110 components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    /// Big-endian public exponent.
    pub exponent: Vec<u8>,
    /// Big-endian modulus.
    pub modulus: Vec<u8>,
}

/// Splits RFC 3110 DNSKEY key material into exponent and modulus.
pub fn decode_rsa_public_key(key: &[u8]) -> Result<RsaPublicKey> {
    let Some(&first) = key.first() else {
        return Err(DnssecError::InvalidPublicKey("empty key".to_string()));
    };

    let (exponent_len, offset) = if first == 0 {
        if key.len() < 3 {
            return Err(DnssecError::InvalidPublicKey(
                "truncated exponent length".to_string(),
            ));
        }
        (usize::from(u16::from_be_bytes([key[1], key[2]])), 3)
    } else {
        (usize::from(first), 1)
    };

    if key.len() <= offset + exponent_len {
        return Err(DnssecError::InvalidPublicKey(
            "truncated exponent or modulus".to_string(),
        ));
    }

    Ok(RsaPublicKey {
        exponent: key[offset..offset + exponent_len].to_vec(),
        modulus: key[offset + exponent_len..].to_vec(),
    })
}

/// Verifies a PKCS#1 v1.5 / SHA-256 signature over `message` with RFC
/// 3110 key material.
pub fn verify_signature(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
    let key = decode_rsa_public_key(public_key)?;
    let der = rsa_public_key_der(&key.modulus, &key.exponent);

    UnparsedPublicKey::new(&RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY, &der)
        .verify(message, signature)
        .map_err(|_| DnssecError::SignatureInvalid)
}

/// Encodes an `RSAPublicKey` DER structure (`SEQUENCE { modulus INTEGER,
/// exponent INTEGER }`), the form ring expects for RSA keys.
fn rsa_public_key_der(modulus: &[u8], exponent: &[u8]) -> Vec<u8> {
    fn der_length(len: usize) -> Vec<u8> {
        if len < 0x80 {
            vec![len as u8]
        } else if len < 0x100 {
            vec![0x81, len as u8]
        } else {
            vec![0x82, (len >> 8) as u8, len as u8]
        }
    }

    fn der_integer(value: &[u8]) -> Vec<u8> {
        // A set high bit would make the INTEGER negative; pad with a zero.
        let pad = value.first().is_some_and(|b| b & 0x80 != 0);
        let mut out = vec![0x02];
        out.extend(der_length(value.len() + usize::from(pad)));
        if pad {
            out.push(0);
        }
        out.extend_from_slice(value);
        out
    }

    let modulus = der_integer(modulus);
    let exponent = der_integer(exponent);

    let mut out = vec![0x30];
    out.extend(der_length(modulus.len() + exponent.len()));
    out.extend(modulus);
    out.extend(exponent);
    out
}
