//! Transaction types and their legacy serialization.

use coinstash_consensus::{Hash256, HashAlgorithm};

use crate::encoding::{write_vec, Encodable, Encoder};
use crate::hash::{digest_with, sha256d};
use crate::outpoint::OutPoint;

/// Sequence number of an input that does not opt into replacement or
/// relative lock time.
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxIn {
    pub prevout: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

impl TxIn {
    pub fn new(prevout: OutPoint, script_sig: Vec<u8>) -> Self {
        Self {
            prevout,
            script_sig,
            sequence: SEQUENCE_FINAL,
        }
    }

    pub fn has_sequence(&self) -> bool {
        self.sequence != SEQUENCE_FINAL
    }
}

impl Encodable for TxIn {
    fn consensus_encode(&self, encoder: &mut Encoder) {
        self.prevout.consensus_encode(encoder);
        encoder.write_var_bytes(&self.script_sig);
        encoder.write_u32_le(self.sequence);
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxOut {
    pub value: i64,
    pub script_pubkey: Vec<u8>,
}

impl Encodable for TxOut {
    fn consensus_encode(&self, encoder: &mut Encoder) {
        encoder.write_i64_le(self.value);
        encoder.write_var_bytes(&self.script_pubkey);
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    pub version: i32,
    pub vin: Vec<TxIn>,
    pub vout: Vec<TxOut>,
    pub lock_time: u32,
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            version: 1,
            vin: Vec::new(),
            vout: Vec::new(),
            lock_time: 0,
        }
    }
}

impl Transaction {
    pub fn consensus_encode(&self) -> Vec<u8> {
        let mut encoder = Encoder::new();
        encoder.write_u32_le(self.version as u32);
        write_vec(&mut encoder, &self.vin);
        write_vec(&mut encoder, &self.vout);
        encoder.write_u32_le(self.lock_time);
        encoder.into_inner()
    }

    /// Transaction id in internal byte order.
    pub fn txid(&self) -> Hash256 {
        sha256d(&self.consensus_encode())
    }

    pub fn txid_with(&self, algorithm: HashAlgorithm) -> Result<Hash256, TransactionEncodeError> {
        digest_with(algorithm, &self.consensus_encode())
            .ok_or(TransactionEncodeError::UnsupportedHashAlgorithm(algorithm))
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TransactionEncodeError {
    UnsupportedHashAlgorithm(HashAlgorithm),
}

impl std::fmt::Display for TransactionEncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionEncodeError::UnsupportedHashAlgorithm(algorithm) => {
                write!(f, "{algorithm:?} cannot hash transactions")
            }
        }
    }
}

impl std::error::Error for TransactionEncodeError {}
