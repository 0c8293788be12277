//! In-memory wallet state: keys, wallet transactions with their spend wiring,
//! per-transaction confidence, and registered extensions.

pub mod confidence;
pub mod extension;
pub mod keys;
pub mod transaction;
pub mod wallet;

pub use confidence::{
    ConfidenceState, ConfidenceType, PeerAddress, Source, TransactionConfidence, MAX_WORK_DONE,
};
pub use extension::{
    ExtensionError, WalletExtension, WalletProtectExtension, LEGACY_WALLET_PROTECT_IDS,
    WALLET_PROTECT_ID, WALLET_PROTECT_V1_ID,
};
pub use keys::{
    EcKey, EncryptedPrivateKey, EncryptionType, KeyCrypter, KeyCrypterError, KeyCrypterFactory,
    PrivateKeyMaterial, ScryptParameters, SecretBytes,
};
pub use transaction::{ConnectError, InPoint, Pool, WalletTransaction};
pub use wallet::{Wallet, WalletError, WalletVersion};
