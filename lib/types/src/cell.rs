// ============ Cells & Transactions ============
// Ledger-level values. Cells are immutable once created and identified by
// their out-point (transaction hash, output index).

use serde::{Deserialize, Serialize};

use crate::molecule::{self, table_header_size, NUMBER_SIZE};
use crate::script::Script;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutPoint {
    #[serde(with = "crate::hexstr::fixed")]
    pub tx_hash: [u8; 32],
    pub index: u32,
}

impl OutPoint {
    pub const SERIALIZED_SIZE: usize = 32 + 4;

    pub fn new(tx_hash: [u8; 32], index: u32) -> Self {
        Self { tx_hash, index }
    }
}

/// A cell: capacity in shannons, ownership lock, optional asset type, opaque data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellOutput {
    pub capacity: u64,
    #[serde(rename = "lock")]
    pub lock_script: Script,
    #[serde(rename = "type")]
    pub type_script: Option<Script>,
    #[serde(with = "crate::hexstr::bytes")]
    pub data: Vec<u8>,
}

impl CellOutput {
    /// Size of the molecule `CellOutput` table (data travels separately).
    pub fn serialized_size(&self) -> usize {
        table_header_size(3)
            + 8
            + self.lock_script.serialized_size()
            + self.type_script.as_ref().map_or(0, Script::serialized_size)
    }

    /// Bytes this cell occupies on chain: capacity field, scripts and data.
    pub fn occupied_capacity(&self) -> u64 {
        let script_bytes = |s: &Script| 32 + 1 + s.args.len() as u64;
        let bytes = 8
            + script_bytes(&self.lock_script)
            + self.type_script.as_ref().map_or(0, script_bytes)
            + self.data.len() as u64;
        bytes * SHANNONS_PER_BYTE
    }

    pub fn has_type(&self, type_script: Option<&Script>) -> bool {
        self.type_script.as_ref() == type_script
    }
}

pub const SHANNONS_PER_BYTE: u64 = 100_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepType {
    Code,
    DepGroup,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellDep {
    pub out_point: OutPoint,
    pub dep_type: DepType,
}

impl CellDep {
    pub const SERIALIZED_SIZE: usize = OutPoint::SERIALIZED_SIZE + 1;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellInput {
    pub previous_output: OutPoint,
    pub since: u64,
}

impl CellInput {
    pub const SERIALIZED_SIZE: usize = 8 + OutPoint::SERIALIZED_SIZE;

    pub fn new(previous_output: OutPoint) -> Self {
        Self { previous_output, since: 0 }
    }
}

// ============ Indexed Transactions ============

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Committed,
}

/// A transaction as returned by the indexer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(with = "crate::hexstr::fixed")]
    pub hash: [u8; 32],
    pub inputs: Vec<CellInput>,
    pub outputs: Vec<CellOutput>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionWithStatus {
    pub transaction: Transaction,
    pub status: TxStatus,
    /// Milliseconds since the epoch.
    pub timestamp: u64,
}

impl TransactionWithStatus {
    pub fn hash(&self) -> [u8; 32] {
        self.transaction.hash
    }

    pub fn is_pending(&self) -> bool {
        self.status == TxStatus::Pending
    }

    pub fn out_point(&self, index: u32) -> OutPoint {
        OutPoint::new(self.transaction.hash, index)
    }
}

// ============ Unsigned Transactions ============

/// Unsigned CKB transaction handed to a wallet for signing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub cell_deps: Vec<CellDep>,
    pub inputs: Vec<CellInput>,
    pub outputs: Vec<CellOutput>,
    #[serde(serialize_with = "serialize_witnesses")]
    pub witnesses: Vec<Vec<u8>>,
}

fn serialize_witnesses<S: serde::Serializer>(witnesses: &[Vec<u8>], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(witnesses.iter().map(|w| crate::hexstr::encode_prefixed(w)))
}

impl UnsignedTransaction {
    /// Molecule size of the full `Transaction` plus the 4-byte offset it takes in a block.
    pub fn serialized_size_in_block(&self) -> usize {
        let raw = table_header_size(6)
            + 4 // version
            + NUMBER_SIZE + CellDep::SERIALIZED_SIZE * self.cell_deps.len()
            + NUMBER_SIZE // header_deps
            + NUMBER_SIZE + CellInput::SERIALIZED_SIZE * self.inputs.len()
            + molecule::dynvec_size(self.outputs.iter().map(CellOutput::serialized_size))
            + molecule::dynvec_size(self.outputs.iter().map(|o| NUMBER_SIZE + o.data.len()));
        let witnesses = molecule::dynvec_size(self.witnesses.iter().map(|w| NUMBER_SIZE + w.len()));

        table_header_size(2) + raw + witnesses + 4
    }

    pub fn total_output_capacity(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.capacity))
    }
}
