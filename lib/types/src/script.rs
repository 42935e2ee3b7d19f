// ============ Scripts ============
// Lock/type script model and its CKB identity hash

use blake2b_simd::Params;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::molecule;

/// CKB uses blake2b with personalization "ckb-default-hash" and 32-byte output
const CKB_HASH_PERSONALIZATION: &[u8] = b"ckb-default-hash";

pub fn ckb_blake2b(data: &[u8]) -> [u8; 32] {
    let result = Params::new()
        .hash_length(32)
        .personal(CKB_HASH_PERSONALIZATION)
        .hash(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(result.as_bytes());
    hash
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashType {
    Data,
    Type,
    Data1,
    Data2,
}

impl HashType {
    pub fn as_byte(self) -> u8 {
        match self {
            HashType::Data => 0,
            HashType::Type => 1,
            HashType::Data1 => 2,
            HashType::Data2 => 4,
        }
    }
}

impl std::str::FromStr for HashType {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data" => Ok(HashType::Data),
            "type" => Ok(HashType::Type),
            "data1" => Ok(HashType::Data1),
            "data2" => Ok(HashType::Data2),
            other => Err(DecodeError::UnknownHashType(other.to_string())),
        }
    }
}

/// Equality is byte equality of all three fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    #[serde(with = "crate::hexstr::fixed")]
    pub code_hash: [u8; 32],
    pub hash_type: HashType,
    #[serde(with = "crate::hexstr::bytes")]
    pub args: Vec<u8>,
}

impl Script {
    pub fn new(code_hash: [u8; 32], hash_type: HashType, args: Vec<u8>) -> Self {
        Self { code_hash, hash_type, args }
    }

    /// Molecule `Script` table: header, code_hash, hash_type, args as `Bytes`.
    pub fn serialize(&self) -> Vec<u8> {
        let args = molecule::fixvec(&self.args);
        molecule::table(&[&self.code_hash, &[self.hash_type.as_byte()], &args])
    }

    pub fn serialized_size(&self) -> usize {
        molecule::table_header_size(3) + 32 + 1 + 4 + self.args.len()
    }

    pub fn to_hash(&self) -> [u8; 32] {
        ckb_blake2b(&self.serialize())
    }

    /// Same code and hash type; args are ignored.
    pub fn same_code(&self, code_hash: &[u8; 32], hash_type: HashType) -> bool {
        &self.code_hash == code_hash && self.hash_type == hash_type
    }
}

/// A deployed script without args: the template an order or type script is built from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRef {
    #[serde(with = "crate::hexstr::fixed")]
    pub code_hash: [u8; 32],
    pub hash_type: HashType,
}

impl ScriptRef {
    pub fn with_args(&self, args: Vec<u8>) -> Script {
        Script::new(self.code_hash, self.hash_type, args)
    }

    pub fn matches(&self, script: &Script) -> bool {
        script.same_code(&self.code_hash, self.hash_type)
    }
}

// ============ Tests ============
