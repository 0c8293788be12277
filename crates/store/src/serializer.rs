//! Wallet document assembly and the two-pass wallet loader.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use coinstash_consensus::{hash256_to_hex, params_from_id, Hash256};
use coinstash_log::{log_debug, log_warn};
use coinstash_primitives::OutPoint;
use coinstash_wallet::{
    EcKey, EncryptionType, InPoint, KeyCrypter, KeyCrypterFactory, ScryptParameters,
    TransactionConfidence, Wallet, WalletExtension, WalletTransaction, WalletVersion,
};
use prost::Message;

use crate::confidence::read_confidence;
use crate::error::WalletStoreError;
use crate::extension::{read_extensions, write_extensions};
use crate::hashes::{hash_from_bytes, hash_to_bytes};
use crate::keys::{read_key, write_key};
use crate::proto;
use crate::transaction::{read_transaction, record_hash, write_transaction};

/// A decoded transaction waiting for its references to be resolved, with
/// the position of the record it came from.
struct PendingTransaction {
    record: usize,
    wtx: WalletTransaction,
}

/// Converts wallets to and from protobuf documents.
///
/// An instance may be reused for any number of reads and writes, one at a
/// time. Decoding builds a hash-keyed index of the document's transactions
/// which is emptied before every read returns, successful or not.
pub struct WalletProtobufSerializer {
    key_crypter_factory: Option<Arc<dyn KeyCrypterFactory>>,
    tx_map: HashMap<Hash256, PendingTransaction>,
}

impl Default for WalletProtobufSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletProtobufSerializer {
    pub fn new() -> Self {
        Self {
            key_crypter_factory: None,
            tx_map: HashMap::new(),
        }
    }

    /// Factory used to rebuild the cipher of encrypted wallets.
    pub fn with_key_crypter_factory(mut self, factory: Arc<dyn KeyCrypterFactory>) -> Self {
        self.key_crypter_factory = Some(factory);
        self
    }

    /// Number of transactions held in the decode index. Zero between calls.
    pub fn pending_transactions(&self) -> usize {
        self.tx_map.len()
    }

    pub fn wallet_to_proto(&self, wallet: &Wallet) -> Result<proto::Wallet, WalletStoreError> {
        let (encryption_type, encryption_parameters) = write_encryption(wallet)?;
        let key = wallet
            .keys()
            .iter()
            .map(write_key)
            .collect::<Result<Vec<_>, _>>()?;
        let transaction = wallet.transactions().map(write_transaction).collect();

        Ok(proto::Wallet {
            network_identifier: wallet.params().id.to_string(),
            last_seen_block_hash: wallet.last_block_seen_hash().as_ref().map(hash_to_bytes),
            key,
            transaction,
            encryption_type: Some(encryption_type as i32),
            encryption_parameters,
            version: wallet.version().map(WalletVersion::value),
            extension: write_extensions(wallet),
            description: wallet.description().map(str::to_string),
            last_seen_block_height: Some(wallet.last_block_seen_height() as u32),
        })
    }

    pub fn write_wallet(&self, wallet: &Wallet) -> Result<Vec<u8>, WalletStoreError> {
        Ok(self.wallet_to_proto(wallet)?.encode_to_vec())
    }

    pub fn write_wallet_to<W: Write>(
        &self,
        wallet: &Wallet,
        output: &mut W,
    ) -> Result<(), WalletStoreError> {
        let bytes = self.write_wallet(wallet)?;
        output.write_all(&bytes)?;
        output.flush()?;
        Ok(())
    }

    /// Human-readable rendering of the document, for debugging.
    pub fn wallet_to_text(&self, wallet: &Wallet) -> Result<String, WalletStoreError> {
        Ok(format!("{:#?}", self.wallet_to_proto(wallet)?))
    }

    pub fn parse_to_proto(bytes: &[u8]) -> Result<proto::Wallet, WalletStoreError> {
        Ok(proto::Wallet::decode(bytes)?)
    }

    pub fn read_wallet(&mut self, bytes: &[u8]) -> Result<Wallet, WalletStoreError> {
        self.read_wallet_with_extensions(bytes, Vec::new())
    }

    pub fn read_wallet_with_extensions(
        &mut self,
        bytes: &[u8],
        extensions: Vec<Box<dyn WalletExtension>>,
    ) -> Result<Wallet, WalletStoreError> {
        let document = Self::parse_to_proto(bytes)?;
        self.load_wallet(&document, extensions)
    }

    /// Builds a wallet from a parsed document. `extensions` are registered on
    /// the wallet before the stored extension payloads are applied.
    pub fn load_wallet(
        &mut self,
        document: &proto::Wallet,
        extensions: Vec<Box<dyn WalletExtension>>,
    ) -> Result<Wallet, WalletStoreError> {
        let result = self.load_wallet_inner(document, extensions);
        self.tx_map.clear();
        result
    }

    fn load_wallet_inner(
        &mut self,
        document: &proto::Wallet,
        extensions: Vec<Box<dyn WalletExtension>>,
    ) -> Result<Wallet, WalletStoreError> {
        self.tx_map.clear();

        let params = params_from_id(&document.network_identifier)
            .ok_or_else(|| WalletStoreError::UnknownNetwork(document.network_identifier.clone()))?;
        let encryption_type = document
            .encryption_type
            .map(EncryptionType::from_value)
            .unwrap_or(EncryptionType::Unencrypted);
        let version = resolve_version(document.version, encryption_type)?;
        let crypter = self.key_crypter(encryption_type, document.encryption_parameters.as_ref())?;

        let mut wallet = Wallet::new(params);
        wallet.set_description(document.description.clone());
        wallet.set_key_crypter(crypter.clone())?;
        for record in &document.key {
            wallet.add_key(read_key(record, crypter.as_ref())?)?;
        }

        for (index, record) in document.transaction.iter().enumerate() {
            let wtx = read_transaction(record, params)?;
            self.index_transaction(index, wtx);
        }
        for (index, record) in document.transaction.iter().enumerate() {
            self.resolve_transaction(index, record)?;
        }
        for (_, pending) in self.tx_map.drain() {
            wallet.add_wallet_transaction(pending.wtx);
        }

        let last_seen = document
            .last_seen_block_hash
            .as_deref()
            .map(|bytes| hash_from_bytes("wallet.last_seen_block_hash", bytes))
            .transpose()?;
        wallet.set_last_block_seen_hash(last_seen);
        wallet.set_last_block_seen_height(
            document
                .last_seen_block_height
                .map(|height| height as i32)
                .unwrap_or(-1),
        );

        for extension in extensions {
            wallet.add_extension(extension);
        }
        read_extensions(&mut wallet, &document.extension)?;

        wallet.set_version(Some(version));
        Ok(wallet)
    }

    fn key_crypter(
        &self,
        encryption_type: EncryptionType,
        parameters: Option<&proto::ScryptParameters>,
    ) -> Result<Option<Arc<dyn KeyCrypter>>, WalletStoreError> {
        match encryption_type {
            EncryptionType::Unencrypted => Ok(None),
            EncryptionType::EncryptedScryptAes => {
                let Some(parameters) = parameters else {
                    return Ok(None);
                };
                let factory = self
                    .key_crypter_factory
                    .as_ref()
                    .ok_or(WalletStoreError::MissingKeyCrypterFactory(encryption_type))?;
                Ok(Some(factory.scrypt_aes(&read_scrypt_parameters(parameters)?)?))
            }
            other => Err(WalletStoreError::UnsupportedEncryptionKind(other)),
        }
    }

    /// Adds a shallowly decoded transaction to the index. When a hash repeats,
    /// the copy with the later update time wins; ties and missing times keep
    /// the copy seen first.
    fn index_transaction(&mut self, record: usize, wtx: WalletTransaction) {
        match self.tx_map.entry(wtx.hash()) {
            Entry::Vacant(slot) => {
                slot.insert(PendingTransaction { record, wtx });
            }
            Entry::Occupied(mut slot) => {
                let hash = hash256_to_hex(&wtx.hash());
                let replace = matches!(
                    (slot.get().wtx.update_time_ms(), wtx.update_time_ms()),
                    (Some(kept), Some(candidate)) if candidate > kept
                );
                if replace {
                    log_debug!("duplicate transaction {hash}: record {record} is newer, using it");
                    slot.insert(PendingTransaction { record, wtx });
                } else {
                    let kept = slot.get().record;
                    log_debug!("duplicate transaction {hash}: keeping record {kept}");
                }
            }
        }
    }

    /// Second pass for one record: wires spent outputs to the inputs spending
    /// them and attaches confidence. Records that lost a duplicate contest are
    /// skipped.
    fn resolve_transaction(
        &mut self,
        index: usize,
        record: &proto::Transaction,
    ) -> Result<(), WalletStoreError> {
        let hash = record_hash(record)?;
        if self.tx_map.get(&hash).map(|pending| pending.record) != Some(index) {
            return Ok(());
        }

        for (output_index, output) in record.transaction_output.iter().enumerate() {
            let Some(spender_bytes) = &output.spent_by_transaction_hash else {
                continue;
            };
            let spender_hash = hash_from_bytes("output.spent_by_transaction_hash", spender_bytes)?;
            let input_index = output.spent_by_transaction_index.unwrap_or(0);
            self.connect_spend(
                OutPoint::new(hash, output_index as u32),
                spender_hash,
                input_index,
            )?;
        }

        if let Some(confidence) = &record.confidence {
            let tx_map = &self.tx_map;
            let state = read_confidence(confidence, &hash, |other| tx_map.contains_key(other))?;
            if let Some(pending) = self.tx_map.get_mut(&hash) {
                pending
                    .wtx
                    .set_confidence(Some(Arc::new(TransactionConfidence::from_state(state))));
            }
        }
        Ok(())
    }

    fn connect_spend(
        &mut self,
        funding: OutPoint,
        spender_hash: Hash256,
        input_index: i32,
    ) -> Result<(), WalletStoreError> {
        let Some(spending) = self.tx_map.get_mut(&spender_hash) else {
            log_debug!(
                "output {}:{} is spent by {} which is not in the wallet",
                hash256_to_hex(&funding.hash),
                funding.index,
                hash256_to_hex(&spender_hash)
            );
            return Ok(());
        };
        let out_of_range = || WalletStoreError::SpentByIndexOutOfRange {
            funding: funding.hash,
            output: funding.index,
            spender: spender_hash,
            input: i64::from(input_index),
        };
        let input = u32::try_from(input_index).map_err(|_| out_of_range())?;
        if !spending.wtx.has_input(input) {
            return Err(out_of_range());
        }
        if let Err(err) = spending.wtx.connect_input(input, funding) {
            log_warn!(
                "not wiring output {}:{} to input {input} of {}: {err}",
                hash256_to_hex(&funding.hash),
                funding.index,
                hash256_to_hex(&spender_hash)
            );
            return Ok(());
        }
        let spender = InPoint {
            hash: spender_hash,
            index: input,
        };
        if let Some(funding_tx) = self.tx_map.get_mut(&funding.hash) {
            funding_tx.wtx.mark_output_spent(funding.index, spender);
        }
        Ok(())
    }
}

/// Picks the format version of a document. Documents written before the
/// version field existed are classified by their encryption type.
pub fn resolve_version(
    version: Option<i32>,
    encryption_type: EncryptionType,
) -> Result<WalletVersion, WalletStoreError> {
    let unrecognized = |version: i32| WalletStoreError::UnrecognizedVersion {
        version,
        encryption: encryption_type,
    };
    match version.unwrap_or(0) {
        0 => match encryption_type {
            EncryptionType::Unencrypted => Ok(WalletVersion::Protobuf),
            EncryptionType::EncryptedScryptAes => Ok(WalletVersion::ProtobufEncrypted),
            EncryptionType::Unrecognized(_) => Err(unrecognized(0)),
        },
        value => WalletVersion::from_value(value).ok_or_else(|| unrecognized(value)),
    }
}

/// Encrypted keys can only be written next to the scrypt parameters needed
/// to read them back.
fn write_encryption(
    wallet: &Wallet,
) -> Result<(proto::wallet::EncryptionType, Option<proto::ScryptParameters>), WalletStoreError> {
    let holds_encrypted = wallet.keys().iter().any(EcKey::is_encrypted);
    let Some(crypter) = wallet.key_crypter() else {
        if holds_encrypted {
            return Err(WalletStoreError::EncryptedKeysWithoutParameters);
        }
        return Ok((proto::wallet::EncryptionType::Unencrypted, None));
    };
    match crypter.understood_encryption_type() {
        EncryptionType::Unencrypted if holds_encrypted => {
            Err(WalletStoreError::EncryptedKeysWithoutParameters)
        }
        EncryptionType::Unencrypted => Ok((proto::wallet::EncryptionType::Unencrypted, None)),
        EncryptionType::EncryptedScryptAes => {
            let parameters = crypter.scrypt_parameters().ok_or(
                WalletStoreError::UnsupportedEncryptionKind(EncryptionType::EncryptedScryptAes),
            )?;
            Ok((
                proto::wallet::EncryptionType::EncryptedScryptAes,
                Some(write_scrypt_parameters(parameters)),
            ))
        }
        other => Err(WalletStoreError::UnsupportedEncryptionKind(other)),
    }
}

fn write_scrypt_parameters(parameters: &ScryptParameters) -> proto::ScryptParameters {
    proto::ScryptParameters {
        salt: parameters.salt.clone(),
        n: Some(parameters.n as i64),
        r: Some(parameters.r as i32),
        p: Some(parameters.p as i32),
    }
}

fn read_scrypt_parameters(
    record: &proto::ScryptParameters,
) -> Result<ScryptParameters, WalletStoreError> {
    let invalid = |field: &str, value: i64| {
        WalletStoreError::KeyCrypter(coinstash_wallet::KeyCrypterError::InvalidParameters(
            format!("scrypt {field} = {value}"),
        ))
    };
    let n = u64::try_from(record.n()).map_err(|_| invalid("n", record.n()))?;
    let r = u32::try_from(record.r()).map_err(|_| invalid("r", i64::from(record.r())))?;
    let p = u32::try_from(record.p()).map_err(|_| invalid("p", i64::from(record.p())))?;
    Ok(ScryptParameters {
        salt: record.salt.clone(),
        n,
        r,
        p,
    })
}
