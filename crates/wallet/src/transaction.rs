use std::fmt;
use std::sync::Arc;

use coinstash_consensus::Hash256;
use coinstash_primitives::{OutPoint, Transaction};

use crate::confidence::TransactionConfidence;

/// Wallet bucket a transaction lives in. Each variant has a stable numeric tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pool {
    Unspent,
    Spent,
    Inactive,
    Dead,
    Pending,
    PendingInactive,
    Unknown(i32),
}

impl Pool {
    pub const ALL: [Pool; 6] = [
        Pool::Unspent,
        Pool::Spent,
        Pool::Inactive,
        Pool::Dead,
        Pool::Pending,
        Pool::PendingInactive,
    ];

    pub fn value(self) -> i32 {
        match self {
            Pool::Unspent => 4,
            Pool::Spent => 5,
            Pool::Inactive => 2,
            Pool::Dead => 10,
            Pool::Pending => 16,
            Pool::PendingInactive => 18,
            Pool::Unknown(raw) => raw,
        }
    }

    pub fn from_value(value: i32) -> Self {
        match value {
            4 => Pool::Unspent,
            5 => Pool::Spent,
            2 => Pool::Inactive,
            10 => Pool::Dead,
            16 => Pool::Pending,
            18 => Pool::PendingInactive,
            other => Pool::Unknown(other),
        }
    }
}

/// Reference to a specific input of a specific transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InPoint {
    pub hash: Hash256,
    pub index: u32,
}

/// A transaction as tracked by a wallet: pool membership, the blocks it was
/// seen in, and links from its outputs to the inputs spending them.
pub struct WalletTransaction {
    pool: Pool,
    tx: Transaction,
    hash: Hash256,
    update_time_ms: Option<i64>,
    appears_in: Vec<Hash256>,
    spent_by: Vec<Option<InPoint>>,
    connected: Vec<Option<OutPoint>>,
    confidence: Option<Arc<TransactionConfidence>>,
}

impl WalletTransaction {
    pub fn new(pool: Pool, tx: Transaction) -> Self {
        let hash = tx.txid();
        Self::with_hash(pool, tx, hash)
    }

    /// Wraps `tx` under a hash the caller has already computed.
    pub fn with_hash(pool: Pool, tx: Transaction, hash: Hash256) -> Self {
        let spent_by = vec![None; tx.vout.len()];
        let connected = vec![None; tx.vin.len()];
        Self {
            pool,
            tx,
            hash,
            update_time_ms: None,
            appears_in: Vec::new(),
            spent_by,
            connected,
            confidence: None,
        }
    }

    pub fn pool(&self) -> Pool {
        self.pool
    }

    pub fn set_pool(&mut self, pool: Pool) {
        self.pool = pool;
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    pub fn hash(&self) -> Hash256 {
        self.hash
    }

    pub fn update_time_ms(&self) -> Option<i64> {
        self.update_time_ms
    }

    pub fn set_update_time_ms(&mut self, update_time_ms: Option<i64>) {
        self.update_time_ms = update_time_ms;
    }

    pub fn appears_in(&self) -> &[Hash256] {
        &self.appears_in
    }

    /// Returns false if the block was already recorded.
    pub fn add_block_appearance(&mut self, block_hash: Hash256) -> bool {
        if self.appears_in.contains(&block_hash) {
            return false;
        }
        self.appears_in.push(block_hash);
        true
    }

    pub fn confidence(&self) -> Option<&Arc<TransactionConfidence>> {
        self.confidence.as_ref()
    }

    pub fn confidence_or_init(&mut self) -> &Arc<TransactionConfidence> {
        self.confidence.get_or_insert_with(Default::default)
    }

    pub fn set_confidence(&mut self, confidence: Option<Arc<TransactionConfidence>>) {
        self.confidence = confidence;
    }

    pub fn spent_by(&self, output_index: u32) -> Option<InPoint> {
        self.spent_by.get(output_index as usize).copied().flatten()
    }

    pub fn is_output_spent(&self, output_index: u32) -> bool {
        self.spent_by(output_index).is_some()
    }

    pub fn unspent_outputs(&self) -> impl Iterator<Item = u32> + '_ {
        self.spent_by
            .iter()
            .enumerate()
            .filter(|(_, spender)| spender.is_none())
            .map(|(index, _)| index as u32)
    }

    /// Returns false if `output_index` is out of range.
    pub fn mark_output_spent(&mut self, output_index: u32, spender: InPoint) -> bool {
        match self.spent_by.get_mut(output_index as usize) {
            Some(slot) => {
                *slot = Some(spender);
                true
            }
            None => false,
        }
    }

    pub fn connected_output(&self, input_index: u32) -> Option<OutPoint> {
        self.connected.get(input_index as usize).copied().flatten()
    }

    pub fn has_input(&self, input_index: u32) -> bool {
        (input_index as usize) < self.tx.vin.len()
    }

    /// Connects an input to the output it spends. Fails if the input does not
    /// exist or names a different outpoint.
    pub fn connect_input(
        &mut self,
        input_index: u32,
        funding: OutPoint,
    ) -> Result<(), ConnectError> {
        let input = self
            .tx
            .vin
            .get(input_index as usize)
            .ok_or(ConnectError::NoSuchInput(input_index))?;
        if input.prevout != funding {
            return Err(ConnectError::OutPointMismatch {
                expected: input.prevout,
                found: funding,
            });
        }
        self.connected[input_index as usize] = Some(funding);
        Ok(())
    }
}

impl PartialEq for WalletTransaction {
    fn eq(&self, other: &Self) -> bool {
        let confidence = |wtx: &WalletTransaction| wtx.confidence.as_ref().map(|c| c.snapshot());
        self.pool == other.pool
            && self.hash == other.hash
            && self.tx == other.tx
            && self.update_time_ms == other.update_time_ms
            && self.appears_in == other.appears_in
            && self.spent_by == other.spent_by
            && self.connected == other.connected
            && confidence(self) == confidence(other)
    }
}

impl fmt::Debug for WalletTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletTransaction")
            .field("hash", &coinstash_consensus::hash256_to_hex(&self.hash))
            .field("pool", &self.pool)
            .field("update_time_ms", &self.update_time_ms)
            .field("appears_in", &self.appears_in.len())
            .field("spent_by", &self.spent_by)
            .field("confidence", &self.confidence.as_ref().map(|c| c.snapshot()))
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectError {
    NoSuchInput(u32),
    OutPointMismatch { expected: OutPoint, found: OutPoint },
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::NoSuchInput(index) => write!(f, "no input at index {index}"),
            ConnectError::OutPointMismatch { expected, found } => write!(
                f,
                "input spends {}:{}, not {}:{}",
                coinstash_consensus::hash256_to_hex(&expected.hash),
                expected.index,
                coinstash_consensus::hash256_to_hex(&found.hash),
                found.index
            ),
        }
    }
}

impl std::error::Error for ConnectError {}
