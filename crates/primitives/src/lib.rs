//! Transaction types and their consensus serialization, as hashed for ids.

pub mod encoding;
pub mod hash;
pub mod outpoint;
pub mod transaction;

pub use hash::sha256d;
pub use outpoint::OutPoint;
pub use transaction::{Transaction, TransactionEncodeError, TxIn, TxOut, SEQUENCE_FINAL};
