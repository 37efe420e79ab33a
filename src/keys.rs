use ripemd::{Digest, Ripemd160};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::PluginError;

/// Compressed secp256k1 / secp256r1 point length
pub const PUBLIC_KEY_DATA_SIZE: usize = 33;
const CHECKSUM_SIZE: usize = 4;

const LEGACY_PREFIX: &str = "EOS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    K1,
    R1,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::K1 => "K1",
            KeyType::R1 => "R1",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "K1" => Some(KeyType::K1),
            "R1" => Some(KeyType::R1),
            _ => None,
        }
    }
}

/// Antelope public key as returned by the snap
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    key_type: KeyType,
    data: [u8; PUBLIC_KEY_DATA_SIZE],
}

impl PublicKey {
    pub fn new(key_type: KeyType, data: [u8; PUBLIC_KEY_DATA_SIZE]) -> Self {
        Self { key_type, data }
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn data(&self) -> &[u8; PUBLIC_KEY_DATA_SIZE] {
        &self.data
    }

    /// `EOS...` form; only K1 keys have one
    pub fn to_legacy_string(&self) -> Option<String> {
        match self.key_type {
            KeyType::K1 => Some(format!(
                "{}{}",
                LEGACY_PREFIX,
                encode_with_checksum(&self.data, b"")
            )),
            KeyType::R1 => None,
        }
    }
}

fn checksum(data: &[u8], suffix: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.update(suffix);
    let digest = hasher.finalize();
    let mut out = [0u8; CHECKSUM_SIZE];
    out.copy_from_slice(&digest[..CHECKSUM_SIZE]);
    out
}

fn encode_with_checksum(data: &[u8], suffix: &[u8]) -> String {
    let mut buf = Vec::with_capacity(data.len() + CHECKSUM_SIZE);
    buf.extend_from_slice(data);
    buf.extend_from_slice(&checksum(data, suffix));
    bs58::encode(buf).into_string()
}

fn decode_with_checksum(
    encoded: &str,
    suffix: &[u8],
) -> Result<[u8; PUBLIC_KEY_DATA_SIZE], PluginError> {
    let raw = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| PluginError::InvalidPublicKey(format!("base58 decode error: {}", e)))?;
    if raw.len() != PUBLIC_KEY_DATA_SIZE + CHECKSUM_SIZE {
        return Err(PluginError::InvalidPublicKey(format!(
            "expected {} bytes, got {}",
            PUBLIC_KEY_DATA_SIZE + CHECKSUM_SIZE,
            raw.len()
        )));
    }
    let (data, check) = raw.split_at(PUBLIC_KEY_DATA_SIZE);
    if checksum(data, suffix) != check {
        return Err(PluginError::InvalidPublicKey("checksum mismatch".to_string()));
    }
    let mut out = [0u8; PUBLIC_KEY_DATA_SIZE];
    out.copy_from_slice(data);
    Ok(out)
}

impl FromStr for PublicKey {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("PUB_") {
            let (type_str, encoded) = rest
                .split_once('_')
                .ok_or_else(|| PluginError::InvalidPublicKey(s.to_string()))?;
            let key_type = KeyType::from_prefix(type_str).ok_or_else(|| {
                PluginError::InvalidPublicKey(format!("unsupported key type {}", type_str))
            })?;
            let data = decode_with_checksum(encoded, key_type.as_str().as_bytes())?;
            return Ok(Self::new(key_type, data));
        }
        if let Some(encoded) = s.strip_prefix(LEGACY_PREFIX) {
            let data = decode_with_checksum(encoded, b"")?;
            return Ok(Self::new(KeyType::K1, data));
        }
        Err(PluginError::InvalidPublicKey(format!("unrecognized format: {}", s)))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = self.key_type.as_str();
        write!(
            f,
            "PUB_{}_{}",
            suffix,
            encode_with_checksum(&self.data, suffix.as_bytes())
        )
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Owner and active keys for a new account
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyPair {
    pub owner_public_key: PublicKey,
    pub active_public_key: PublicKey,
}

impl PublicKeyPair {
    /// Single-key accounts use the same key for both permissions
    pub fn from_single(key: PublicKey) -> Self {
        Self {
            owner_public_key: key.clone(),
            active_public_key: key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Generator point of secp256k1, compressed
    const LEGACY: &str = "EOS5p78kHbL33Rn3JWkTWRE2B9uz6gy4r1KbfAKLNQGE3ovMBS5bu";
    const K1: &str = "PUB_K1_5p78kHbL33Rn3JWkTWRE2B9uz6gy4r1KbfAKLNQGE3ovLY8E9M";
    const R1: &str = "PUB_R1_5p78kHbL33Rn3JWkTWRE2B9uz6gy4r1KbfAKLNQGE3ovHPZT42";

    #[test]
    fn legacy_and_k1_forms_are_the_same_key() {
        let legacy: PublicKey = LEGACY.parse().expect("legacy key should parse");
        let k1: PublicKey = K1.parse().expect("K1 key should parse");
        assert_eq!(legacy, k1);
        assert_eq!(legacy.to_string(), K1);
        assert_eq!(k1.to_legacy_string().as_deref(), Some(LEGACY));
        assert_eq!(k1.data()[0], 0x02);
    }

    #[test]
    fn parses_r1_keys() {
        let r1: PublicKey = R1.parse().expect("R1 key should parse");
        assert_eq!(r1.key_type(), KeyType::R1);
        assert_eq!(r1.to_string(), R1);
        assert_eq!(r1.to_legacy_string(), None);
    }

    #[test]
    fn rejects_bad_checksums_and_prefixes() {
        // K1 payload presented as R1 fails the suffixed checksum
        let swapped = K1.replace("PUB_K1_", "PUB_R1_");
        assert!(matches!(
            swapped.parse::<PublicKey>(),
            Err(PluginError::InvalidPublicKey(_))
        ));
        assert!("PUB_WA_abc".parse::<PublicKey>().is_err());
        assert!("not-a-key".parse::<PublicKey>().is_err());
        assert!("EOS0OIl".parse::<PublicKey>().is_err());
        assert!("EOS1111".parse::<PublicKey>().is_err());
    }

    #[test]
    fn single_key_pair_duplicates_key() {
        let key: PublicKey = K1.parse().unwrap();
        let pair = PublicKeyPair::from_single(key.clone());
        assert_eq!(pair.owner_public_key, key);
        assert_eq!(pair.active_public_key, key);

        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["ownerPublicKey"], K1);
        assert_eq!(json["activePublicKey"], K1);
    }
}
