use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};

use coinstash_consensus::Hash256;

/// Largest amount of work a confidence record can hold; the stored field is a
/// signed 64-bit integer.
pub const MAX_WORK_DONE: u64 = i64::MAX as u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfidenceType {
    Unknown,
    /// Included in the best chain.
    Building,
    /// Broadcast or relayed but not yet in a block.
    NotSeenInChain,
    /// Conflicts with a transaction that made it into the best chain.
    Dead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    Unknown,
    Network,
    SelfIssued,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PeerAddress {
    pub ip: IpAddr,
    pub port: u16,
    pub services: u64,
}

/// Point-in-time view of a transaction's confidence.
///
/// `appeared_at_height`, `depth` and `work_done` only carry meaning while the
/// type is `Building`; `overriding_transaction` only while it is `Dead`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfidenceState {
    pub confidence_type: ConfidenceType,
    pub appeared_at_height: i32,
    pub depth: i32,
    pub work_done: Option<u64>,
    pub overriding_transaction: Option<Hash256>,
    pub source: Source,
    pub broadcast_by: Vec<PeerAddress>,
}

impl Default for ConfidenceState {
    fn default() -> Self {
        Self {
            confidence_type: ConfidenceType::Unknown,
            appeared_at_height: -1,
            depth: 0,
            work_done: None,
            overriding_transaction: None,
            source: Source::Unknown,
            broadcast_by: Vec::new(),
        }
    }
}

impl ConfidenceState {
    /// Switches the type, clearing fields that belong to the state being left.
    pub fn set_confidence_type(&mut self, confidence_type: ConfidenceType) {
        if confidence_type == self.confidence_type {
            return;
        }
        if confidence_type != ConfidenceType::Building {
            self.appeared_at_height = -1;
            self.depth = 0;
            self.work_done = None;
        }
        if confidence_type != ConfidenceType::Dead {
            self.overriding_transaction = None;
        }
        self.confidence_type = confidence_type;
    }
}

/// Confidence shared between the chain-following side and whoever persists
/// the wallet. All access goes through one lock per transaction.
#[derive(Debug, Default)]
pub struct TransactionConfidence {
    state: Mutex<ConfidenceState>,
}

impl TransactionConfidence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: ConfidenceState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Consistent copy of every field taken under a single lock acquisition.
    pub fn snapshot(&self) -> ConfidenceState {
        self.lock().clone()
    }

    /// Applies several changes atomically with respect to `snapshot`.
    pub fn update<R>(&self, apply: impl FnOnce(&mut ConfidenceState) -> R) -> R {
        let mut state = self.lock();
        apply(&mut *state)
    }

    pub fn confidence_type(&self) -> ConfidenceType {
        self.lock().confidence_type
    }

    pub fn set_building(&self, appeared_at_height: i32) {
        self.update(|state| {
            state.set_confidence_type(ConfidenceType::Building);
            state.appeared_at_height = appeared_at_height;
        });
    }

    pub fn set_depth(&self, depth: i32) {
        self.update(|state| state.depth = depth);
    }

    /// Values above `MAX_WORK_DONE` are clamped.
    pub fn set_work_done(&self, work_done: u64) {
        self.update(|state| state.work_done = Some(work_done.min(MAX_WORK_DONE)));
    }

    /// Records one more block on top of the one containing the transaction.
    pub fn notify_block(&self, work: u64) {
        self.update(|state| {
            if state.confidence_type != ConfidenceType::Building {
                return;
            }
            state.depth = state.depth.saturating_add(1);
            let total = state.work_done.unwrap_or(0).saturating_add(work);
            state.work_done = Some(total.min(MAX_WORK_DONE));
        });
    }

    pub fn set_pending(&self) {
        self.update(|state| state.set_confidence_type(ConfidenceType::NotSeenInChain));
    }

    pub fn set_dead(&self, overriding_transaction: Option<Hash256>) {
        self.update(|state| {
            state.set_confidence_type(ConfidenceType::Dead);
            state.overriding_transaction = overriding_transaction;
        });
    }

    pub fn set_source(&self, source: Source) {
        self.update(|state| state.source = source);
    }

    /// Returns false if the peer was already recorded.
    pub fn mark_broadcast_by(&self, peer: PeerAddress) -> bool {
        self.update(|state| {
            if state.broadcast_by.contains(&peer) {
                return false;
            }
            state.broadcast_by.push(peer);
            true
        })
    }

    pub fn num_broadcast_peers(&self) -> usize {
        self.lock().broadcast_by.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ConfidenceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
