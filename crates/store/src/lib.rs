//! Protobuf persistence for wallets.
//!
//! [`WalletProtobufSerializer`] turns a [`coinstash_wallet::Wallet`] into the
//! `wallet.proto` document format and back. Reading runs in two passes: every
//! transaction is decoded and integrity-checked first, then spends and
//! confidence references between transactions are resolved.

mod confidence;
pub mod error;
mod extension;
mod hashes;
mod keys;
pub mod proto;
mod serializer;
mod transaction;

pub use error::WalletStoreError;
pub use serializer::{resolve_version, WalletProtobufSerializer};
