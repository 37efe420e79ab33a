use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::PluginError;

/// 32-byte chain identifier, hex encoded on the wire
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checksum256([u8; 32]);

impl Checksum256 {
    pub const LENGTH: usize = 32;

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Checksum256 {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| PluginError::InvalidChainId(format!("{}: {}", s, e)))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            PluginError::InvalidChainId(format!(
                "expected {} bytes, got {}",
                Self::LENGTH,
                b.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Checksum256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Checksum256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum256({})", self.to_hex())
    }
}

impl Serialize for Checksum256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Checksum256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A chain the plugin can create accounts on
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChainDefinition {
    pub id: Checksum256,
    pub url: String,
    pub name: String,
}

impl ChainDefinition {
    pub fn new(id: Checksum256, url: &str, name: &str) -> Self {
        Self {
            id,
            url: url.to_string(),
            name: name.to_string(),
        }
    }
}

// === KNOWN CHAINS ===

const EOS_CHAIN_ID: [u8; 32] = [
    0xac, 0xa3, 0x76, 0xf2, 0x06, 0xb8, 0xfc, 0x25, 0xa6, 0xed, 0x44, 0xdb, 0xdc, 0x66, 0x54, 0x7c,
    0x36, 0xc6, 0xc3, 0x3e, 0x3a, 0x11, 0x9f, 0xfb, 0xea, 0xef, 0x94, 0x36, 0x42, 0xf0, 0xe9, 0x06,
];

const JUNGLE4_CHAIN_ID: [u8; 32] = [
    0x73, 0xe4, 0x38, 0x5a, 0x27, 0x08, 0xe6, 0xd7, 0x04, 0x88, 0x34, 0xfb, 0xc1, 0x07, 0x9f, 0x2f,
    0xab, 0xb1, 0x7b, 0x3c, 0x12, 0x5b, 0x14, 0x6a, 0xf4, 0x38, 0x97, 0x1e, 0x90, 0x71, 0x6c, 0x4d,
];

pub struct Chains;

impl Chains {
    pub fn eos() -> ChainDefinition {
        ChainDefinition::new(
            Checksum256::from_bytes(EOS_CHAIN_ID),
            "https://eos.greymass.com",
            "EOS",
        )
    }

    pub fn jungle4() -> ChainDefinition {
        ChainDefinition::new(
            Checksum256::from_bytes(JUNGLE4_CHAIN_ID),
            "https://jungle4.greymass.com",
            "Jungle 4",
        )
    }

    pub fn all() -> Vec<ChainDefinition> {
        vec![Self::eos(), Self::jungle4()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_chain_ids_match_hex() {
        assert_eq!(
            Chains::eos().id.to_hex(),
            "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906"
        );
        assert_eq!(
            Chains::jungle4().id.to_hex(),
            "73e4385a2708e6d7048834fbc1079f2fabb17b3c125b146af438971e90716c4d"
        );
    }

    #[test]
    fn parses_and_rejects_chain_ids() {
        let parsed: Checksum256 = "ACA376F206B8FC25A6ED44DBDC66547C36C6C33E3A119FFBEAEF943642F0E906"
            .parse()
            .expect("uppercase hex should parse");
        assert_eq!(parsed, Chains::eos().id);

        assert!(matches!(
            "abcd".parse::<Checksum256>(),
            Err(PluginError::InvalidChainId(_))
        ));
        assert!(matches!(
            "zz".repeat(32).parse::<Checksum256>(),
            Err(PluginError::InvalidChainId(_))
        ));
    }

    #[test]
    fn chain_definition_serializes_id_as_hex() {
        let json = serde_json::to_value(Chains::jungle4()).unwrap();
        assert_eq!(
            json["id"],
            "73e4385a2708e6d7048834fbc1079f2fabb17b3c125b146af438971e90716c4d"
        );
        let back: ChainDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(back, Chains::jungle4());
    }
}
