//! # Rootward DNSSEC Validation
//!
//! The chain-of-trust machinery for the resolver: RFC 3110 RSA public-key
//! decoding, PKCS#1 v1.5 / SHA-256 signature verification over the RFC
//! 4034 canonical RRSet form, DS digest computation, and the per-zone key
//! retrieval step that walks trust from a parent's DS set to a child's
//! zone-signing key.
//!
//! Only algorithm 8 (RSA/SHA-256) and digest type 2 (SHA-256) are
//! supported; anything else is rejected as unsupported rather than
//! treated as valid.
//!
//! The trust anchor is the root KSK digest published in the IANA
//! root-anchors XML, loaded once at startup via [`root_trust_anchor`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod anchor;
mod rsa;

pub use anchor::{root_trust_anchor, root_trust_anchor_from_str};
pub use rsa::{decode_rsa_public_key, verify_signature, RsaPublicKey};

use rootward_proto::{
    group_records,
    rdata::{DNSKEY, DS, RRSIG},
    Message, Name, Question, RData, RecordType, Rrset,
};
use sha2::{Digest, Sha256};
use std::future::Future;
use std::net::IpAddr;
use thiserror::Error;
use tracing::{debug, trace};

/// The RSA/SHA-256 signing algorithm number (RFC 5702).
pub const ALGORITHM_RSA_SHA256: u8 = 8;

/// The SHA-256 DS digest type (RFC 4509).
pub const DIGEST_SHA256: u8 = 2;

/// Result type alias for validation operations.
pub type Result<T> = std::result::Result<T, DnssecError>;

/// Why a chain of trust could not be established.
#[derive(Error, Debug)]
pub enum DnssecError {
    /// The zone returned no usable DNSKEY RRSet.
    #[error("no DNSKEY for {zone}")]
    NoDnskey {
        /// The zone queried.
        zone: String,
    },

    /// An RRSet that should be signed has no covering RRSIG.
    #[error("missing RRSIG for {name} {rtype}")]
    MissingRrsig {
        /// RRSet owner.
        name: String,
        /// RRSet type.
        rtype: String,
    },

    /// The zone's KSK digest matches none of the trusted DS records.
    #[error("KSK digest mismatch for {zone}")]
    KskDigestMismatch {
        /// The zone whose KSK failed the check.
        zone: String,
    },

    /// A signature did not verify.
    #[error("signature invalid")]
    SignatureInvalid,

    /// A signing algorithm other than RSA/SHA-256.
    #[error("unsupported algorithm {0}")]
    UnsupportedAlgorithm(u8),

    /// A DS digest type other than SHA-256.
    #[error("unsupported digest type {0}")]
    UnsupportedDigestType(u8),

    /// RSA key material that does not follow RFC 3110.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The DNSKEY query itself failed.
    #[error("failed to fetch DNSKEY for {zone}")]
    KeyFetchFailed {
        /// The zone queried.
        zone: String,
    },

    /// The trust anchor file could not be read.
    #[error("cannot read trust anchor: {0}")]
    AnchorIo(#[from] std::io::Error),

    /// The trust anchor XML held no usable key digest.
    #[error("malformed trust anchor: {0}")]
    AnchorParse(String),
}

/// Issues DNSKEY queries on behalf of the validator.
///
/// The resolver's transport implements this; the query must go out with
/// EDNS and the DO bit so the RRSIG over the DNSKEY RRSet comes back.
pub trait KeyFetcher: Send + Sync {
    /// Fetches the DNSKEY RRSet for `zone` from `server`, returning the
    /// response message or `None` when the exchange failed.
    fn fetch_dnskey(
        &self,
        zone: &Name,
        server: IpAddr,
    ) -> impl Future<Output = Option<Message>> + Send;
}

/// Computes the DS-style SHA-256 digest of a DNSKEY:
/// `SHA-256(owner-wire || DNSKEY-rdata-wire)`.
pub fn dnskey_digest(owner: &Name, dnskey: &DNSKEY) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(owner.encode());
    hasher.update(dnskey.flags.to_be_bytes());
    hasher.update([dnskey.protocol, dnskey.algorithm]);
    hasher.update(&dnskey.public_key);
    hasher.finalize().to_vec()
}

/// Returns true if `dnskey` is the key a trusted DS record commits to.
pub fn ds_matches_dnskey(ds: &DS, owner: &Name, dnskey: &DNSKEY) -> bool {
    ds.digest_type == DIGEST_SHA256 && ds.digest == dnskey_digest(owner, dnskey)
}

/// Builds the message an RRSIG signs (RFC 4034 §3.1.8.1):
///
/// 1. The RRSIG RDATA with the signature field left off, the signer name
///    uncompressed.
/// 2. Each record of the set as
///    `owner || type || class || original-TTL || rdlength || rdata`,
///    with the records ordered by ascending RDATA wire bytes.
///
/// The ordering makes the result independent of the arrival order of the
/// records.
pub fn signed_message(rrset: &Rrset, rrsig: &RRSIG) -> rootward_proto::Result<Vec<u8>> {
    let mut message = rrsig.rdata_without_signature();

    let mut rdatas = Vec::with_capacity(rrset.rdatas.len());
    for rdata in &rrset.rdatas {
        rdatas.push(rdata.encode(&[])?);
    }
    rdatas.sort();

    let owner = rrset.name.encode();
    for rdata in rdatas {
        message.extend_from_slice(&owner);
        message.extend_from_slice(&rrset.rtype.to_u16().to_be_bytes());
        message.extend_from_slice(&rrset.rclass.to_u16().to_be_bytes());
        message.extend_from_slice(&rrsig.original_ttl.to_be_bytes());
        message.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        message.extend_from_slice(&rdata);
    }
    Ok(message)
}

/// Verifies `rrsig` over `rrset` with the given RSA public key material.
pub fn verify_rrset(public_key: &[u8], rrset: &Rrset, rrsig: &RRSIG) -> Result<()> {
    if rrsig.algorithm != ALGORITHM_RSA_SHA256 {
        return Err(DnssecError::UnsupportedAlgorithm(rrsig.algorithm));
    }
    let message = signed_message(rrset, rrsig).map_err(|_| DnssecError::SignatureInvalid)?;
    verify_signature(public_key, &message, &rrsig.signature)
}

/// Fetches and validates the zone-signing key of `zone`.
///
/// Queries `server` for the zone's DNSKEY RRSet (DO set), splits it into
/// ZSK (flags 256) and KSK (flags 257), checks some KSK's digest against
/// `trusted`, the DS set inherited from the parent, and verifies the
/// DNSKEY RRSet's own RRSIG under that KSK. On success the ZSK's key
/// material is returned, ready to verify the zone's other signatures.
pub async fn zone_signing_key<F: KeyFetcher>(
    fetcher: &F,
    zone: &Name,
    server: IpAddr,
    trusted: &[DS],
) -> Result<Vec<u8>> {
    debug!(zone = %zone, %server, "fetching DNSKEY RRSet");
    let response = fetcher
        .fetch_dnskey(zone, server)
        .await
        .ok_or_else(|| DnssecError::KeyFetchFailed {
            zone: zone.to_string(),
        })?;

    let rrsets = group_records(&response.answers);
    let dnskey_rrset = rrsets
        .get(&Question::in_class(zone.canonical(), RecordType::DNSKEY))
        .ok_or_else(|| DnssecError::NoDnskey {
            zone: zone.to_string(),
        })?;
    let rrsig_rrset = rrsets
        .get(&Question::in_class(zone.canonical(), RecordType::RRSIG))
        .ok_or_else(|| DnssecError::MissingRrsig {
            name: zone.to_string(),
            rtype: RecordType::DNSKEY.to_string(),
        })?;

    // Split the key set by flags and hand trust down: some KSK must be
    // the one the parent's DS set commits to.
    let mut zsk: Option<&DNSKEY> = None;
    let mut saw_ksk = false;
    let mut trusted_ksk: Option<&DNSKEY> = None;
    for rdata in &dnskey_rrset.rdatas {
        let RData::DNSKEY(key) = rdata else { continue };
        if key.is_zsk() && zsk.is_none() {
            zsk = Some(key);
        }
        if key.is_ksk() {
            saw_ksk = true;
            if trusted_ksk.is_none()
                && trusted.iter().any(|ds| ds_matches_dnskey(ds, zone, key))
            {
                trusted_ksk = Some(key);
            }
        }
    }

    let (Some(zsk), true) = (zsk, saw_ksk) else {
        return Err(DnssecError::NoDnskey {
            zone: zone.to_string(),
        });
    };
    let trusted_ksk = trusted_ksk.ok_or_else(|| DnssecError::KskDigestMismatch {
        zone: zone.to_string(),
    })?;
    trace!(zone = %zone, "KSK digest matches trusted DS");

    // The DNSKEY RRSet must be signed by that KSK.
    let mut last = DnssecError::MissingRrsig {
        name: zone.to_string(),
        rtype: RecordType::DNSKEY.to_string(),
    };
    for rdata in &rrsig_rrset.rdatas {
        let RData::RRSIG(rrsig) = rdata else { continue };
        if rrsig.type_covered != RecordType::DNSKEY {
            continue;
        }
        match verify_rrset(&trusted_ksk.public_key, dnskey_rrset, rrsig) {
            Ok(()) => {
                trace!(zone = %zone, key_tag = rrsig.key_tag, "DNSKEY RRSet verified");
                return Ok(zsk.public_key.clone());
            }
            Err(err) => last = err,
        }
    }
    Err(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_encoding::{BASE64, HEXUPPER};
    use rootward_proto::RecordClass;
    use std::str::FromStr;

    /// Root zone KSK-2017, as published by IANA.
    const ROOT_KSK: &str = "AwEAAaz/tAm8yTn4Mfeh5eyI96WSVexTBAvkMgJzkKTOiW1vkIbzxeF3\
        +/4RgWOq7HrxRixHlFlExOLAJr5emLvN7SWXgnLh4+B5xQlNVz8Og8kvArMtNROxVQuCaSnIDdD5LKyWbRd2\
        n9WGe2R8PzgCmr3EgVLrjyBxWezF0jLHwVN8efS3rCj/EWgvIWgb9tarpVUDK/b58Da+sqqls3eNbuv7pr+e\
        oZG+SrDK6nWeL3c6H5Apxz7LjVc1uTIdsIXxuOLYA4/ilBmSVIzuDWfdRUfhHdY6+cn8HFRm+2hM8AnXGXws\
        9555KrUB5qihylGa8subX2Nn6UwNR1AkUTV74bU=";

    /// Root zone ZSK in use late 2022.
    const ROOT_ZSK: &str = "AwEAAeB54o2xvW6vY4qQZ0krDsEZCe6MsRWCqsXd4+cNJZMePnlV/xwDrIbb\
        eH1SJzv742rOHzgAKM1/3SQHHSkoEIPx8XQdHAZBxfhaXl3e8c5WrE3aGXS5AeTWAkt85ccqWgKyitxjFmJE\
        Ool0BqS2xueltaDwgWcC10nPUY+y5l/kTOYyptYQS4gg1uJNXIob/R1XIEJ10ZCurkYqZxgqyHc7tZv09N23\
        o9rnGdjnYiArH7FjlXD8Rvjde8YWkmfdbCEWnchrnxDK8KV2/ZvBpG/WYnRKXYPUceGCw59OJdJ5M7utkm54\
        7RB3eEd8CVVhbXopZlsKq3GCrBwaIVe9ci0=";

    fn dnskey(presentation: &str) -> DNSKEY {
        let fields: Vec<&str> = presentation.split_whitespace().collect();
        DNSKEY::from_presentation(&fields).unwrap()
    }

    fn rrsig(presentation: &str) -> RRSIG {
        let fields: Vec<&str> = presentation.split_whitespace().collect();
        RRSIG::from_presentation(&fields).unwrap()
    }

    fn rrset(name: &str, rtype: RecordType, ttl: u32, rdatas: Vec<RData>) -> Rrset {
        Rrset::new(
            Name::from_str(name).unwrap(),
            rtype,
            RecordClass::IN,
            ttl,
            rdatas,
        )
    }

    #[test]
    fn root_ksk_digest_matches_published_ds() {
        let ksk = DNSKEY {
            flags: 257,
            protocol: 3,
            algorithm: 8,
            public_key: BASE64.decode(ROOT_KSK.as_bytes()).unwrap(),
        };
        let digest = dnskey_digest(&Name::root(), &ksk);
        assert_eq!(
            HEXUPPER.encode(&digest),
            "E06D44B80B8F1D39A95C0B0D7C65D08458E880409BBC683457104237C7F8EC8D"
        );

        let ds = DS {
            key_tag: 20326,
            algorithm: 8,
            digest_type: 2,
            digest,
        };
        assert!(ds_matches_dnskey(&ds, &Name::root(), &ksk));
    }

    #[test]
    fn rfc3110_key_decodes() {
        let key = BASE64.decode(ROOT_KSK.as_bytes()).unwrap();
        let decoded = decode_rsa_public_key(&key).unwrap();
        // Leading 0x03 length octet, exponent 65537.
        assert_eq!(decoded.exponent, &[1, 0, 1]);
        assert_eq!(decoded.modulus.len(), 256);
    }

    #[test]
    fn root_dnskey_rrset_verifies_under_ksk() {
        // The December 2022 root DNSKEY RRSet and its KSK signature.
        let sig = rrsig(
            "DNSKEY 8 0 172800 20221211000000 20221120000000 20326 . \
             Y8Or1olHbjYMKfZxcKA8mP9+GWhl66Cu6Mrjh9NzLuBZ+14JZodwSJ5JaXzJxRzgHxTd/TWvnI4bAM/D\
             Q8NYyRX/QezQdGU4ZE5RcrZLanxuX/FQR/qIMlLttCsoPtlM677HA3CecqLljbrcayIDSKMghh5iKV1i\
             OoW1BP1KZwgH4Y87fiWbevk+AmN5xbJCPk1iCis+kMulacxTFC+g0jyLv1V0C2hneqZ58os/QvW7XNBW\
             Ld9OC1LbMVVkfgUsVYqfwLjcieQ5YVRshfy2Iazv2sLo87sGvBnLmSUx8F4hiotEK6UjTNNun1tKe0VT\
             BVkXQyaIzfUOkPgoMoWojg==",
        );
        let zsk = dnskey(&format!("256 3 8 {ROOT_ZSK}"));
        let ksk = dnskey(&format!("257 3 8 {ROOT_KSK}"));
        let ksk_key = ksk.public_key.clone();
        let set = rrset(
            ".",
            RecordType::DNSKEY,
            172800,
            vec![RData::DNSKEY(zsk), RData::DNSKEY(ksk)],
        );
        verify_rrset(&ksk_key, &set, &sig).unwrap();
    }

    #[test]
    fn root_soa_verifies_under_zsk() {
        let sig = rrsig(
            "SOA 8 0 86400 20221206050000 20221123040000 18733 . \
             ieJensee3piTLdSd1AhvQYVjMsD8kHfosBeoNOUXC+jngk5jWWqOH/WNqE8pHtzEaEBzVXVrW1GxZZdc\
             6GTmxQqZ49kKDZnuGVY1/8wGKq8AtiSrAJ/rr9YUb4zrwVjnnVlDDlMr7kCUUrH5K3C4CheMSjvljqcR\
             AphMx8R4qSB+ZtFwz1H+loN7qzvztFZTAfcNAJQrTvoz+PduT7pvKWU7cwgu1foFSfLWvTJ3ZJYF2OAi\
             Lm7VG1IBBHsYXC0qXa3ropoaAfuHBbwYXt7Pf7UK7UwxmQkA1xUrI+csHMtF0SBmSUhwA6m2es54EPmQ\
             k8vf/1AGFg+1u9ReS68JVA==",
        );
        let zsk = dnskey(&format!("256 3 8 {ROOT_ZSK}"));
        let soa = RData::SOA(rootward_proto::rdata::SOA {
            mname: Name::from_str("a.root-servers.net.").unwrap(),
            rname: Name::from_str("nstld.verisign-grs.com.").unwrap(),
            serial: 2022112300,
            refresh: 1800,
            retry: 900,
            expire: 604800,
            minimum: 86400,
        });
        let set = rrset(".", RecordType::SOA, 86400, vec![soa]);
        verify_rrset(&zsk.public_key, &set, &sig).unwrap();
    }

    #[test]
    fn com_chain_verifies() {
        // com. DNSKEY RRSet verified under its KSK, then a DS RRSet below
        // com. verified under its ZSK.
        let zsk = dnskey(
            "256 3 8 AwEAAbU0/L1XBGooCMnlQi1/60VALOD25bfj6WTnjwilw58VvOvo6+kPxQ+p0zv3ZR0lIIGf\
             4P5lmfdF9RFBPTNBB3xMst3xkkww7Oy19t+q8kIXgtmtD7iTsZoXewNkBUc7FY5Gt+IuBc4Ouwj20U6W\
             VjAs2/2NIrkxwpb9/TJZzxoMCPkHue8bnDEjKwT626SpCE/drXm81wpceQjHzn0Imrs=",
        );
        let ksk = dnskey(
            "257 3 8 AQPDzldNmMvZFX4NcNJ0uEnKDg7tmv/F3MyQR0lpBmVcNcsIszxNFxsBfKNW9JYCYqpik836\
             6LE7VbIcNRzfp2h9OO8HRl+H+E08zauK8k7evWEmu/6od+2boggPoiEfGNyvNPaSI7FOIroDsnw/tagg\
             zHRX1Z7SOiOiPWPNIwSUyWOZ79VmcQ1GLkC6NlYvG3HwYmynQv6oFwGv/KELSw7ZSdrbTQ0HXvZbqMUI\
             7BaMskmvgm1G7oKZ1YiF7O9ioVNc0+7ASbqmZN7Z98EGU/Qh2K/BgUe8Hs0XVcdPKrtyYnoQHd2ynKPc\
             MMlTEih2/2HDHjRPJ2aywIpKNnv4oPo/",
        );
        let ksk_key = ksk.public_key.clone();
        let zsk_key = zsk.public_key.clone();

        let dnskey_sig = rrsig(
            "DNSKEY 8 1 86400 20221216182421 20221201181921 30909 com. \
             Tb327kPhjTTD9JPdRAfYdsQMKU6wh23hz1WMFBmt+YjmsnNsqUFM1JzBwJ99by2MCvDrf8lszPS/zOfl\
             Uf8xuIyQL0iydFLK5LpTTNcjfcvDvxzUR1dLKrwS0Bg4+vmJeZ+zAfO8DFVAIGzHvn8eTNbZsOgiAjkz\
             ViNZd5P65DXVRchKA3vH7oFwiV77zUJMSxLOQiSEAplPAeFZA3ujoA0zNupKnhUhF9WmxHwXA7wZgE1Y\
             wxDR8cuprY9yLxKMDDHWG+Fzt7WmfFQhDoLYPdx43c+cbXyAvQvM5Yln3lCUKDpjJRk6OHZqLL4aP7ks\
             0v9H6ITCyV/WvH02inkX+A==",
        );
        let dnskey_set = rrset(
            "com.",
            RecordType::DNSKEY,
            86400,
            vec![RData::DNSKEY(zsk), RData::DNSKEY(ksk)],
        );
        verify_rrset(&ksk_key, &dnskey_set, &dnskey_sig).unwrap();

        let ds = DS::from_presentation(&[
            "55204",
            "8",
            "2",
            "206D88653C43D99BF4567BBD7DF9C078DB357F59AA183741024D3457",
            "23052E88",
        ])
        .unwrap();
        let ds_sig = rrsig(
            "DS 8 2 86400 20221216051736 20221209040736 53929 com. \
             ZJVa2+Vqd2wWbVwf6a16nf8Z00MmpGQDEGqgbOSt/HSfjh4ZsgbwBTaU8j2XASY9RAqd4Xnam+mdGUqi\
             gx1OE+4JfczbM5zJbdrd9J1ge9FKbQ3Vg4Zsml9QUUrH6s8HjmfGytIw1GNa6xUJnM9irnmqbloeAGq9\
             4vVxdPYs6ecBe1fmcwMjq5p38RWwO1RDlVzvMIwPmhesKmoQ+YHgxw==",
        );
        let ds_set = rrset(
            "verisign.com.",
            RecordType::DS,
            86400,
            vec![RData::DS(ds)],
        );
        verify_rrset(&zsk_key, &ds_set, &ds_sig).unwrap();
    }

    #[test]
    fn multi_record_ds_rrset_sorts_by_rdata() {
        // Six DS records; the signature only verifies when the set is
        // canonically ordered by RDATA bytes, whatever order they arrive in.
        let zsk = dnskey(
            "256 3 8 AwEAAbU0/L1XBGooCMnlQi1/60VALOD25bfj6WTnjwilw58VvOvo6+kPxQ+p0zv3ZR0lIIGf\
             4P5lmfdF9RFBPTNBB3xMst3xkkww7Oy19t+q8kIXgtmtD7iTsZoXewNkBUc7FY5Gt+IuBc4Ouwj20U6W\
             VjAs2/2NIrkxwpb9/TJZzxoMCPkHue8bnDEjKwT626SpCE/drXm81wpceQjHzn0Imrs=",
        );
        let sig = rrsig(
            "DS 8 2 86400 20221212051553 20221205040553 53929 com. \
             JjgTzM/cAorgscQOn4211xbU17GrwIzcab0qTEscZuREUoTYs0iUv3oej6OnEsDpSicqiLJ0ZL96XhRX\
             iIFCeuq0IVRBn0k/PcOusmya+GLrNxUt+d0lWpc28ZAmyW7NKy7jifk5hYjBaM+TT6RUmjuh/Tvqw1vu\
             jrTAZg7bJwxQgcWWaRhztkRBFBPpbdZ+UDesiEo6buDi4WqYN5rR9w==",
        );
        let mut rdatas = vec![
            "31589 8 1 3490A6806D47F17A34C29E2CE80E8A999FFBE4BE",
            "31589 8 2 CDE0D742D6998AA554A92D890F8184C698CFAC8A26FA59875A990C03E576343C",
            "43547 8 1 B6225AB2CC613E0DCA7962BDC2342EA4F1B56083",
            "43547 8 2 615A64233543F66F44D68933625B17497C89A70E858ED76A2145997EDF96A918",
            "31406 8 1 189968811E6EBA862DD6C209F75623D8D9ED9142",
            "31406 8 2 F78CF3344F72137235098ECBBD08947C2C9001C7F6A085A17F518B5D8F6B916D",
        ];
        // Arrival order must not matter.
        rdatas.rotate_left(3);
        let rdatas: Vec<RData> = rdatas
            .into_iter()
            .map(|text| {
                let fields: Vec<&str> = text.split_whitespace().collect();
                RData::DS(DS::from_presentation(&fields).unwrap())
            })
            .collect();
        let set = rrset("example.com.", RecordType::DS, 86400, rdatas);
        verify_rrset(&zsk.public_key, &set, &sig).unwrap();
    }

    #[test]
    fn example_com_address_verifies() {
        let zsk = dnskey(
            "256 3 8 AwEAAb1oJO+fCqdkxHtQYVB/tFPgJphc+VxjUYz+eVGf077zMxHKgce9EwGBifFuKhjl2EA0\
             VQPsWVX1vzuUmWri3OgsTBlITkdMz6VU4g94uO6T9MIktokouOidIzvOqLR+O2LSXNhiYOIWA9s3Lxk5\
             R2lrwd6vrRvT2CR1GdZuUlKB",
        );
        let sig = rrsig(
            "A 8 2 86400 20221220080923 20221129053336 59208 example.com. \
             H6tWP087fHsTBz2/IimDLUH8xJYr+SRnkPLNDQ61kNCgzDYOMPzenVmUdPmhkTRu3zUyThJCTs8UwVzX\
             Guwh5tmerMKt9Q36PaiXr2FyHi9I6vgSiSP0TZttSBbcDopJb9hzSHWt7hoGHxNEnrU21qpw5OpTO8JO\
             iXSbYMS0kGY=",
        );
        let set = rrset(
            "example.com.",
            RecordType::A,
            86400,
            vec![RData::A("93.184.216.34".parse().unwrap())],
        );
        verify_rrset(&zsk.public_key, &set, &sig).unwrap();
    }

    #[test]
    fn signed_message_is_order_independent() {
        let a = RData::A("192.0.2.1".parse().unwrap());
        let b = RData::A("192.0.2.200".parse().unwrap());
        let sig = RRSIG {
            type_covered: RecordType::A,
            algorithm: 8,
            labels: 2,
            original_ttl: 300,
            expiration: 1_700_000_000,
            inception: 1_690_000_000,
            key_tag: 12345,
            signer_name: Name::from_str("example.com.").unwrap(),
            signature: vec![0; 16],
        };

        let forward = rrset(
            "example.com.",
            RecordType::A,
            300,
            vec![a.clone(), b.clone()],
        );
        let backward = rrset("example.com.", RecordType::A, 300, vec![b, a]);
        assert_eq!(
            signed_message(&forward, &sig).unwrap(),
            signed_message(&backward, &sig).unwrap()
        );
    }

    #[test]
    fn tampered_record_fails_verification() {
        let zsk = dnskey(
            "256 3 8 AwEAAb1oJO+fCqdkxHtQYVB/tFPgJphc+VxjUYz+eVGf077zMxHKgce9EwGBifFuKhjl2EA0\
             VQPsWVX1vzuUmWri3OgsTBlITkdMz6VU4g94uO6T9MIktokouOidIzvOqLR+O2LSXNhiYOIWA9s3Lxk5\
             R2lrwd6vrRvT2CR1GdZuUlKB",
        );
        let sig = rrsig(
            "A 8 2 86400 20221220080923 20221129053336 59208 example.com. \
             H6tWP087fHsTBz2/IimDLUH8xJYr+SRnkPLNDQ61kNCgzDYOMPzenVmUdPmhkTRu3zUyThJCTs8UwVzX\
             Guwh5tmerMKt9Q36PaiXr2FyHi9I6vgSiSP0TZttSBbcDopJb9hzSHWt7hoGHxNEnrU21qpw5OpTO8JO\
             iXSbYMS0kGY=",
        );
        let set = rrset(
            "example.com.",
            RecordType::A,
            86400,
            vec![RData::A("93.184.216.35".parse().unwrap())],
        );
        assert!(matches!(
            verify_rrset(&zsk.public_key, &set, &sig),
            Err(DnssecError::SignatureInvalid)
        ));
    }

    #[test]
    fn non_rsa_algorithm_rejected() {
        let sig = RRSIG {
            type_covered: RecordType::A,
            algorithm: 13,
            labels: 2,
            original_ttl: 300,
            expiration: 0,
            inception: 0,
            key_tag: 0,
            signer_name: Name::root(),
            signature: Vec::new(),
        };
        let set = rrset("example.com.", RecordType::A, 300, Vec::new());
        assert!(matches!(
            verify_rrset(&[], &set, &sig),
            Err(DnssecError::UnsupportedAlgorithm(13))
        ));
    }

    mod zsk_fetch {
        use super::*;
        use rootward_proto::{Question, ResourceRecord};
        use std::net::Ipv4Addr;

        struct CannedFetcher {
            response: Option<Message>,
        }

        impl KeyFetcher for CannedFetcher {
            async fn fetch_dnskey(&self, _zone: &Name, _server: IpAddr) -> Option<Message> {
                self.response.clone()
            }
        }

        fn server() -> IpAddr {
            IpAddr::V4(Ipv4Addr::new(198, 41, 0, 4))
        }

        fn root_dnskey_response() -> Message {
            let zsk = dnskey(&format!("256 3 8 {ROOT_ZSK}"));
            let ksk = dnskey(&format!("257 3 8 {ROOT_KSK}"));
            let sig = rrsig(
                "DNSKEY 8 0 172800 20221211000000 20221120000000 20326 . \
                 Y8Or1olHbjYMKfZxcKA8mP9+GWhl66Cu6Mrjh9NzLuBZ+14JZodwSJ5JaXzJxRzgHxTd/TWvnI4b\
                 AM/DQ8NYyRX/QezQdGU4ZE5RcrZLanxuX/FQR/qIMlLttCsoPtlM677HA3CecqLljbrcayIDSKMg\
                 hh5iKV1iOoW1BP1KZwgH4Y87fiWbevk+AmN5xbJCPk1iCis+kMulacxTFC+g0jyLv1V0C2hneqZ5\
                 8os/QvW7XNBWLd9OC1LbMVVkfgUsVYqfwLjcieQ5YVRshfy2Iazv2sLo87sGvBnLmSUx8F4hiotE\
                 K6UjTNNun1tKe0VTBVkXQyaIzfUOkPgoMoWojg==",
            );

            let request = Message::request(
                Question::in_class(Name::root(), RecordType::DNSKEY),
                false,
                true,
                true,
            );
            let owner = Name::root();
            Message::response(
                &request,
                vec![
                    ResourceRecord::new(
                        owner.clone(),
                        RecordClass::IN,
                        172800,
                        RData::DNSKEY(zsk),
                    ),
                    ResourceRecord::new(
                        owner.clone(),
                        RecordClass::IN,
                        172800,
                        RData::DNSKEY(ksk),
                    ),
                    ResourceRecord::new(owner, RecordClass::IN, 172800, RData::RRSIG(sig)),
                ],
                Vec::new(),
                Vec::new(),
            )
        }

        fn root_anchor_ds() -> DS {
            let ksk = dnskey(&format!("257 3 8 {ROOT_KSK}"));
            DS {
                key_tag: 20326,
                algorithm: 8,
                digest_type: 2,
                digest: dnskey_digest(&Name::root(), &ksk),
            }
        }

        #[tokio::test]
        async fn returns_zsk_when_chain_holds() {
            let fetcher = CannedFetcher {
                response: Some(root_dnskey_response()),
            };
            let zsk = zone_signing_key(&fetcher, &Name::root(), server(), &[root_anchor_ds()])
                .await
                .unwrap();
            assert_eq!(zsk, BASE64.decode(ROOT_ZSK.as_bytes()).unwrap());
        }

        #[tokio::test]
        async fn mismatched_anchor_is_rejected() {
            let fetcher = CannedFetcher {
                response: Some(root_dnskey_response()),
            };
            let bogus = DS {
                key_tag: 20326,
                algorithm: 8,
                digest_type: 2,
                digest: vec![0; 32],
            };
            let err = zone_signing_key(&fetcher, &Name::root(), server(), &[bogus])
                .await
                .unwrap_err();
            assert!(matches!(err, DnssecError::KskDigestMismatch { .. }));
        }

        #[tokio::test]
        async fn fetch_failure_surfaces() {
            let fetcher = CannedFetcher { response: None };
            let err = zone_signing_key(&fetcher, &Name::root(), server(), &[root_anchor_ds()])
                .await
                .unwrap_err();
            assert!(matches!(err, DnssecError::KeyFetchFailed { .. }));
        }

        #[tokio::test]
        async fn missing_rrsig_surfaces() {
            let mut response = root_dnskey_response();
            response.answers.retain(|r| r.rtype != RecordType::RRSIG);
            let fetcher = CannedFetcher {
                response: Some(response),
            };
            let err = zone_signing_key(&fetcher, &Name::root(), server(), &[root_anchor_ds()])
                .await
                .unwrap_err();
            assert!(matches!(err, DnssecError::MissingRrsig { .. }));
        }
    }
}
