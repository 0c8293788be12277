use coinstash_consensus::{hash256_to_hex, Hash256};
use coinstash_primitives::TransactionEncodeError;
use coinstash_wallet::{EncryptionType, KeyCrypterError, WalletError};
use thiserror::Error;

/// Failures that stop a wallet from being written or read. Recoverable
/// inconsistencies in a document are logged instead.
#[derive(Debug, Error)]
pub enum WalletStoreError {
    #[error("malformed wallet document: {0}")]
    Protobuf(#[from] prost::DecodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(
        "transaction hash mismatch: document says {}, contents hash to {}",
        hash256_to_hex(.expected),
        hash256_to_hex(.actual)
    )]
    HashMismatch { expected: Hash256, actual: Hash256 },

    #[error("{field} must be 32 bytes, found {len}")]
    InvalidHashLength { field: &'static str, len: usize },

    #[error("missing required field {0}")]
    MissingField(&'static str),

    #[error("unknown network identifier {0:?}")]
    UnknownNetwork(String),

    #[error("unknown key type {0}")]
    UnknownKeyKind(i32),

    #[error("unsupported encryption type {0}")]
    UnsupportedEncryptionKind(EncryptionType),

    #[error("no key crypter factory configured for {0} wallets")]
    MissingKeyCrypterFactory(EncryptionType),

    #[error("key carries an encrypted private key but the wallet has no encryption parameters")]
    MissingEncryptionParameters,

    #[error("wallet holds encrypted keys but has no scrypt cipher to describe them")]
    EncryptedKeysWithoutParameters,

    #[error("unrecognized wallet version {version} (encryption {encryption})")]
    UnrecognizedVersion {
        version: i32,
        encryption: EncryptionType,
    },

    #[error("unknown mandatory extension {0}")]
    UnknownMandatoryExtension(String),

    #[error(
        "output {output} of {} is spent by input {input} of {}, which does not exist",
        hash256_to_hex(.funding),
        hash256_to_hex(.spender)
    )]
    SpentByIndexOutOfRange {
        funding: Hash256,
        output: u32,
        spender: Hash256,
        input: i64,
    },

    #[error("invalid peer address: {0}")]
    InvalidPeerAddress(String),

    #[error(transparent)]
    Transaction(#[from] TransactionEncodeError),

    #[error(transparent)]
    KeyCrypter(#[from] KeyCrypterError),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}
