//! Key records.

use std::sync::Arc;

use coinstash_log::log_warn;
use coinstash_wallet::{EcKey, EncryptedPrivateKey, EncryptionType, KeyCrypter, PrivateKeyMaterial};

use crate::error::WalletStoreError;
use crate::proto;

pub(crate) fn write_key(key: &EcKey) -> Result<proto::Key, WalletStoreError> {
    let mut record = proto::Key {
        r#type: proto::key::Type::Original as i32,
        private_key: None,
        public_key: Some(key.pub_key().to_vec()),
        label: None,
        creation_timestamp: Some(key.creation_time_seconds().saturating_mul(1000)),
        encrypted_private_key: None,
    };
    match key.private_material() {
        PrivateKeyMaterial::Plain(bytes) => {
            record.private_key = Some(bytes.as_bytes().to_vec());
        }
        PrivateKeyMaterial::Encrypted(encrypted) => {
            match key.encryption_type() {
                EncryptionType::EncryptedScryptAes => {}
                other => return Err(WalletStoreError::UnsupportedEncryptionKind(other)),
            }
            record.r#type = proto::key::Type::EncryptedScryptAes as i32;
            record.encrypted_private_key = Some(proto::EncryptedPrivateKey {
                initialisation_vector: encrypted.initialisation_vector.clone(),
                encrypted_private_key: encrypted.encrypted_private_key.clone(),
            });
        }
        PrivateKeyMaterial::Absent => {}
    }
    Ok(record)
}

/// Rebuilds a key. Encrypted material is only honoured when `crypter`
/// understands an encryption type other than `Unencrypted`.
pub(crate) fn read_key(
    record: &proto::Key,
    crypter: Option<&Arc<dyn KeyCrypter>>,
) -> Result<EcKey, WalletStoreError> {
    if proto::key::Type::try_from(record.r#type).is_err() {
        return Err(WalletStoreError::UnknownKeyKind(record.r#type));
    }

    let mut key = match crypter {
        Some(crypter) if crypter.understood_encryption_type() != EncryptionType::Unencrypted => {
            read_encrypted_key(record, crypter)?
        }
        _ => read_plain_key(record)?,
    };
    key.set_creation_time_seconds(millis_to_seconds(record.creation_timestamp.unwrap_or(0)));
    Ok(key)
}

fn read_encrypted_key(
    record: &proto::Key,
    crypter: &Arc<dyn KeyCrypter>,
) -> Result<EcKey, WalletStoreError> {
    let pub_key = record
        .public_key
        .clone()
        .ok_or(WalletStoreError::MissingField("key.public_key"))?;
    if record.private_key.is_some() {
        log_warn!("ignoring plaintext private key stored in an encrypted wallet");
    }
    Ok(match &record.encrypted_private_key {
        Some(encrypted) => EcKey::from_encrypted(
            EncryptedPrivateKey {
                initialisation_vector: encrypted.initialisation_vector.clone(),
                encrypted_private_key: encrypted.encrypted_private_key.clone(),
            },
            pub_key,
            Arc::clone(crypter),
        ),
        None => EcKey::watch_only(pub_key),
    })
}

fn read_plain_key(record: &proto::Key) -> Result<EcKey, WalletStoreError> {
    if record.encrypted_private_key.is_some() {
        return Err(WalletStoreError::MissingEncryptionParameters);
    }
    match (&record.private_key, &record.public_key) {
        (Some(private_key), public_key) => {
            Ok(EcKey::from_private(private_key, public_key.clone())?)
        }
        (None, Some(public_key)) => Ok(EcKey::watch_only(public_key.clone())),
        (None, None) => Err(WalletStoreError::MissingField("key.public_key")),
    }
}

/// Creation times are stored in milliseconds. Adds half a second, then
/// truncates toward zero.
fn millis_to_seconds(millis: i64) -> i64 {
    millis.saturating_add(500) / 1000
}
