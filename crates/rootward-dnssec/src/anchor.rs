//! Root trust anchor loading.
//!
//! The anchor is the last `KeyDigest` element of the IANA root-anchors
//! XML, turned into a DS record. The file is small and its schema fixed,
//! so a tag scanner is used rather than a full XML dependency.

use crate::{DnssecError, Result};
use data_encoding::HEXUPPER_PERMISSIVE;
use rootward_proto::rdata::DS;
use std::path::Path;
use tracing::debug;

/// Loads the root trust anchor DS from a root-anchors XML file.
pub fn root_trust_anchor(path: impl AsRef<Path>) -> Result<DS> {
    let text = std::fs::read_to_string(path)?;
    root_trust_anchor_from_str(&text)
}

/// Parses the root trust anchor DS out of root-anchors XML text.
///
/// The last `KeyDigest` element wins; IANA appends new KSKs at the end.
pub fn root_trust_anchor_from_str(text: &str) -> Result<DS> {
    let blocks = element_blocks(text, "KeyDigest");
    let block = blocks
        .last()
        .ok_or_else(|| DnssecError::AnchorParse("no KeyDigest element".to_string()))?;

    let field = |tag: &str| {
        element_text(block, tag)
            .ok_or_else(|| DnssecError::AnchorParse(format!("missing <{tag}> element")))
    };

    let key_tag = field("KeyTag")?
        .parse()
        .map_err(|_| DnssecError::AnchorParse("bad KeyTag".to_string()))?;
    let algorithm = field("Algorithm")?
        .parse()
        .map_err(|_| DnssecError::AnchorParse("bad Algorithm".to_string()))?;
    let digest_type = field("DigestType")?
        .parse()
        .map_err(|_| DnssecError::AnchorParse("bad DigestType".to_string()))?;
    let digest = HEXUPPER_PERMISSIVE
        .decode(field("Digest")?.to_ascii_uppercase().as_bytes())
        .map_err(|e| DnssecError::AnchorParse(format!("bad Digest: {e}")))?;

    debug!(key_tag, algorithm, digest_type, "root trust anchor loaded");
    Ok(DS {
        key_tag,
        algorithm,
        digest_type,
        digest,
    })
}

/// The inner text of every `<tag ...>...</tag>` element, in order.
fn element_blocks<'a>(text: &'a str, tag: &str) -> Vec<&'a str> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(&open) {
        let Some(body_start) = rest[start..].find('>').map(|i| start + i + 1) else {
            break;
        };
        let Some(end) = rest[body_start..].find(&close).map(|i| body_start + i) else {
            break;
        };
        blocks.push(&rest[body_start..end]);
        rest = &rest[end + close.len()..];
    }
    blocks
}

/// The trimmed inner text of the first `<tag>...</tag>` element.
fn element_text<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    element_blocks(text, tag).first().map(|block| block.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_encoding::HEXUPPER;

    const ROOT_ANCHORS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TrustAnchor id="380DC50D-484E-40D0-A3AE-68F2B18F61C7" source="http://data.iana.org/root-anchors/root-anchors.xml">
<Zone>.</Zone>
<KeyDigest id="Kjqmt7v" validFrom="2010-07-15T00:00:00+00:00" validUntil="2019-01-11T00:00:00+00:00">
<KeyTag>19036</KeyTag>
<Algorithm>8</Algorithm>
<DigestType>2</DigestType>
<Digest>49AAC11D7B6F6446702E54A1607371607A1A41855200FD2CE1CDDE32F24E8FB5</Digest>
</KeyDigest>
<KeyDigest id="Klajeyz" validFrom="2017-02-02T00:00:00+00:00">
<KeyTag>20326</KeyTag>
<Algorithm>8</Algorithm>
<DigestType>2</DigestType>
<Digest>E06D44B80B8F1D39A95C0B0D7C65D08458E880409BBC683457104237C7F8EC8D</Digest>
</KeyDigest>
</TrustAnchor>
"#;

    #[test]
    fn last_key_digest_wins() {
        let ds = root_trust_anchor_from_str(ROOT_ANCHORS_XML).unwrap();
        assert_eq!(ds.key_tag, 20326);
        assert_eq!(ds.algorithm, 8);
        assert_eq!(ds.digest_type, 2);
        assert_eq!(
            HEXUPPER.encode(&ds.digest),
            "E06D44B80B8F1D39A95C0B0D7C65D08458E880409BBC683457104237C7F8EC8D"
        );
    }

    #[test]
    fn missing_digest_element_rejected() {
        assert!(matches!(
            root_trust_anchor_from_str("<TrustAnchor></TrustAnchor>"),
            Err(DnssecError::AnchorParse(_))
        ));
    }

    #[test]
    fn truncated_element_rejected() {
        let text = "<KeyDigest><KeyTag>20326</KeyTag>";
        assert!(root_trust_anchor_from_str(text).is_err());
    }
}
