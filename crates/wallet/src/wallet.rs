use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use coinstash_consensus::{hash256_to_hex, Hash256, NetworkParams};
use coinstash_primitives::OutPoint;

use crate::extension::WalletExtension;
use crate::keys::{EcKey, EncryptionType, KeyCrypter, KeyCrypterError};
use crate::transaction::{ConnectError, InPoint, Pool, WalletTransaction};

/// Document format generation a wallet was read from or should be written as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WalletVersion {
    Protobuf = 2,
    ProtobufEncrypted = 3,
}

impl WalletVersion {
    pub fn value(self) -> i32 {
        self as i32
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            2 => Some(WalletVersion::Protobuf),
            3 => Some(WalletVersion::ProtobufEncrypted),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("invalid secret key")]
    InvalidSecretKey,
    #[error("key has no private material")]
    MissingPrivateKey,
    #[error("key is already encrypted")]
    KeyAlreadyEncrypted,
    #[error("key is not encrypted")]
    KeyNotEncrypted,
    #[error("decrypted private key does not match the public key")]
    IncorrectKeyMaterial,
    #[error("key encryption state does not match the wallet")]
    KeyEncryptionMismatch,
    #[error("wallet is already encrypted")]
    WalletAlreadyEncrypted,
    #[error("wallet is not encrypted")]
    WalletNotEncrypted,
    #[error("wallet holds encrypted keys; decrypt it before replacing the cipher")]
    EncryptedKeysHeld,
    #[error("unknown transaction {}", hash256_to_hex(.0))]
    UnknownTransaction(Hash256),
    #[error("transaction {} has no output {index}", hash256_to_hex(.hash))]
    NoSuchOutput { hash: Hash256, index: u32 },
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    KeyCrypter(#[from] KeyCrypterError),
}

/// The live wallet: keys, transactions keyed by hash, the chain position it
/// was last synced to, and any application extensions.
pub struct Wallet {
    params: &'static NetworkParams,
    description: Option<String>,
    keys: Vec<EcKey>,
    transactions: BTreeMap<Hash256, WalletTransaction>,
    last_block_seen_hash: Option<Hash256>,
    last_block_seen_height: i32,
    key_crypter: Option<Arc<dyn KeyCrypter>>,
    extensions: BTreeMap<String, Box<dyn WalletExtension>>,
    version: Option<WalletVersion>,
}

impl Wallet {
    pub fn new(params: &'static NetworkParams) -> Self {
        Self {
            params,
            description: None,
            keys: Vec::new(),
            transactions: BTreeMap::new(),
            last_block_seen_hash: None,
            last_block_seen_height: -1,
            key_crypter: None,
            extensions: BTreeMap::new(),
            version: None,
        }
    }

    pub fn with_key_crypter(params: &'static NetworkParams, crypter: Arc<dyn KeyCrypter>) -> Self {
        let mut wallet = Self::new(params);
        wallet.key_crypter = Some(crypter);
        wallet
    }

    pub fn params(&self) -> &'static NetworkParams {
        self.params
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn version(&self) -> Option<WalletVersion> {
        self.version
    }

    pub fn set_version(&mut self, version: Option<WalletVersion>) {
        self.version = version;
    }

    pub fn key_crypter(&self) -> Option<&Arc<dyn KeyCrypter>> {
        self.key_crypter.as_ref()
    }

    /// Installs the cipher without touching existing keys. Used when loading,
    /// before any key is added. Refused while encrypted keys are held.
    pub fn set_key_crypter(
        &mut self,
        crypter: Option<Arc<dyn KeyCrypter>>,
    ) -> Result<(), WalletError> {
        if self.keys.iter().any(EcKey::is_encrypted) {
            return Err(WalletError::EncryptedKeysHeld);
        }
        self.key_crypter = crypter;
        Ok(())
    }

    pub fn encryption_type(&self) -> EncryptionType {
        self.key_crypter
            .as_ref()
            .map(|crypter| crypter.understood_encryption_type())
            .unwrap_or(EncryptionType::Unencrypted)
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryption_type() != EncryptionType::Unencrypted
    }

    pub fn keys(&self) -> &[EcKey] {
        &self.keys
    }

    /// Adds a key whose private material agrees with the wallet's encryption
    /// state. Watch-only keys fit either.
    pub fn add_key(&mut self, key: EcKey) -> Result<(), WalletError> {
        let fits = key.is_watch_only() || key.is_encrypted() == self.is_encrypted();
        if !fits {
            return Err(WalletError::KeyEncryptionMismatch);
        }
        self.keys.push(key);
        Ok(())
    }

    pub fn encrypt(&mut self, crypter: Arc<dyn KeyCrypter>) -> Result<(), WalletError> {
        if self.is_encrypted() {
            return Err(WalletError::WalletAlreadyEncrypted);
        }
        let keys = self
            .keys
            .iter()
            .map(|key| {
                if key.is_watch_only() {
                    Ok(key.clone())
                } else {
                    key.encrypt(Arc::clone(&crypter))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.keys = keys;
        self.key_crypter = Some(crypter);
        Ok(())
    }

    pub fn decrypt(&mut self) -> Result<(), WalletError> {
        if !self.is_encrypted() {
            return Err(WalletError::WalletNotEncrypted);
        }
        let keys = self
            .keys
            .iter()
            .map(|key| {
                if key.is_watch_only() {
                    Ok(key.clone())
                } else {
                    key.decrypt()
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.keys = keys;
        self.key_crypter = None;
        Ok(())
    }

    pub fn transactions(&self) -> impl Iterator<Item = &WalletTransaction> {
        self.transactions.values()
    }

    pub fn transaction(&self, hash: &Hash256) -> Option<&WalletTransaction> {
        self.transactions.get(hash)
    }

    pub fn transaction_mut(&mut self, hash: &Hash256) -> Option<&mut WalletTransaction> {
        self.transactions.get_mut(hash)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn transactions_in(&self, pool: Pool) -> impl Iterator<Item = &WalletTransaction> {
        self.transactions.values().filter(move |wtx| wtx.pool() == pool)
    }

    pub fn pool_size(&self, pool: Pool) -> usize {
        self.transactions_in(pool).count()
    }

    /// Inserts or replaces the transaction with the same hash.
    pub fn add_wallet_transaction(&mut self, wtx: WalletTransaction) -> Option<WalletTransaction> {
        self.transactions.insert(wtx.hash(), wtx)
    }

    /// Wires input `spender.index` of `spender.hash` to `funding`, and marks
    /// the funding output as spent. Both transactions must be held.
    pub fn connect(&mut self, funding: OutPoint, spender: InPoint) -> Result<(), WalletError> {
        let funding_tx = self
            .transactions
            .get(&funding.hash)
            .ok_or(WalletError::UnknownTransaction(funding.hash))?;
        if funding.index as usize >= funding_tx.transaction().vout.len() {
            return Err(WalletError::NoSuchOutput {
                hash: funding.hash,
                index: funding.index,
            });
        }
        self.transactions
            .get_mut(&spender.hash)
            .ok_or(WalletError::UnknownTransaction(spender.hash))?
            .connect_input(spender.index, funding)?;
        if let Some(funding_tx) = self.transactions.get_mut(&funding.hash) {
            funding_tx.mark_output_spent(funding.index, spender);
        }
        Ok(())
    }

    pub fn last_block_seen_hash(&self) -> Option<Hash256> {
        self.last_block_seen_hash
    }

    pub fn set_last_block_seen_hash(&mut self, hash: Option<Hash256>) {
        self.last_block_seen_hash = hash;
    }

    pub fn last_block_seen_height(&self) -> i32 {
        self.last_block_seen_height
    }

    pub fn set_last_block_seen_height(&mut self, height: i32) {
        self.last_block_seen_height = height;
    }

    /// Registers an extension, returning any previous one with the same id.
    pub fn add_extension(
        &mut self,
        extension: Box<dyn WalletExtension>,
    ) -> Option<Box<dyn WalletExtension>> {
        self.extensions.insert(extension.id().to_string(), extension)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &dyn WalletExtension> {
        self.extensions.values().map(|extension| extension.as_ref())
    }

    pub fn extension(&self, id: &str) -> Option<&dyn WalletExtension> {
        self.extensions.get(id).map(|extension| extension.as_ref())
    }

    pub fn extension_mut(&mut self, id: &str) -> Option<&mut (dyn WalletExtension + 'static)> {
        self.extensions.get_mut(id).map(|extension| extension.as_mut())
    }
}

impl PartialEq for Wallet {
    fn eq(&self, other: &Self) -> bool {
        let extensions = |wallet: &Wallet| {
            wallet
                .extensions()
                .map(|ext| (ext.id().to_string(), ext.is_mandatory(), ext.serialize()))
                .collect::<Vec<_>>()
        };
        self.params.network == other.params.network
            && self.description == other.description
            && self.keys == other.keys
            && self.transactions == other.transactions
            && self.last_block_seen_hash == other.last_block_seen_hash
            && self.last_block_seen_height == other.last_block_seen_height
            && self.encryption_type() == other.encryption_type()
            && self.version == other.version
            && extensions(self) == extensions(other)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("network", &self.params.network)
            .field("description", &self.description)
            .field("keys", &self.keys)
            .field("transactions", &self.transactions.values().collect::<Vec<_>>())
            .field(
                "last_block_seen_hash",
                &self.last_block_seen_hash.as_ref().map(hash256_to_hex),
            )
            .field("last_block_seen_height", &self.last_block_seen_height)
            .field("encryption_type", &self.encryption_type())
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .field("version", &self.version)
            .finish()
    }
}
