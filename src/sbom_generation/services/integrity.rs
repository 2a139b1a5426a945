use crate::sbom_generation::domain::{BomHash, HashAlgorithm};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Decodes the hash notations found in lockfiles into hex [`BomHash`]es
pub struct Integrity;

impl Integrity {
    /// Parses a Subresource Integrity string (`sha512-<base64>`).
    ///
    /// When several hashes are listed the first supported one wins.
    pub fn from_sri(text: &str) -> Option<BomHash> {
        text.split_whitespace().find_map(|entry| {
            let (algorithm, digest) = entry.split_once('-')?;
            let algorithm = Self::algorithm(algorithm)?;
            Self::from_base64(algorithm, digest)
        })
    }

    /// Decodes a base64 digest (e.g. the `sha512` field of a NuGet assets file).
    pub fn from_base64(algorithm: HashAlgorithm, digest: &str) -> Option<BomHash> {
        let bytes = STANDARD.decode(digest.trim()).ok()?;
        if bytes.is_empty() {
            return None;
        }
        Some(BomHash::new(algorithm, hex::encode_upper(bytes)))
    }

    /// Parses the `<algorithm>:<hex>` notation used by Poetry.
    pub fn from_prefixed_hex(text: &str) -> Option<BomHash> {
        let (algorithm, digest) = text.trim().split_once(':')?;
        let algorithm = Self::algorithm(algorithm)?;
        if digest.is_empty() || hex::decode(digest).is_err() {
            return None;
        }
        Some(BomHash::new(algorithm, digest.to_ascii_uppercase()))
    }

    fn algorithm(name: &str) -> Option<HashAlgorithm> {
        match name.to_ascii_lowercase().as_str() {
            "md5" => Some(HashAlgorithm::Md5),
            "sha1" => Some(HashAlgorithm::Sha1),
            "sha256" => Some(HashAlgorithm::Sha256),
            "sha384" => Some(HashAlgorithm::Sha384),
            "sha512" => Some(HashAlgorithm::Sha512),
            _ => None,
        }
    }
}
