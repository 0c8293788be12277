use std::fmt;
use std::sync::{Arc, OnceLock};

use secp256k1::{PublicKey, Secp256k1, SecretKey};
use zeroize::Zeroize;

use crate::wallet::WalletError;

pub const DEFAULT_SCRYPT_N: u64 = 16384;
pub const DEFAULT_SCRYPT_R: u32 = 8;
pub const DEFAULT_SCRYPT_P: u32 = 1;

/// Private key bytes that are wiped when dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretBytes(Vec<u8>);

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for SecretBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Drop for SecretBytes {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes({} bytes)", self.0.len())
    }
}

/// Cipher families a wallet can be protected with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncryptionType {
    Unencrypted,
    EncryptedScryptAes,
    Unrecognized(i32),
}

impl EncryptionType {
    pub fn value(self) -> i32 {
        match self {
            EncryptionType::Unencrypted => 1,
            EncryptionType::EncryptedScryptAes => 2,
            EncryptionType::Unrecognized(raw) => raw,
        }
    }

    pub fn from_value(value: i32) -> Self {
        match value {
            1 => EncryptionType::Unencrypted,
            2 => EncryptionType::EncryptedScryptAes,
            other => EncryptionType::Unrecognized(other),
        }
    }
}

impl fmt::Display for EncryptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionType::Unencrypted => write!(f, "unencrypted"),
            EncryptionType::EncryptedScryptAes => write!(f, "scrypt+aes"),
            EncryptionType::Unrecognized(raw) => write!(f, "unrecognized({raw})"),
        }
    }
}

/// Key-derivation parameters persisted alongside an encrypted wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScryptParameters {
    pub salt: Vec<u8>,
    pub n: u64,
    pub r: u32,
    pub p: u32,
}

impl ScryptParameters {
    pub fn with_salt(salt: Vec<u8>) -> Self {
        Self {
            salt,
            n: DEFAULT_SCRYPT_N,
            r: DEFAULT_SCRYPT_R,
            p: DEFAULT_SCRYPT_P,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedPrivateKey {
    pub initialisation_vector: Vec<u8>,
    pub encrypted_private_key: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum KeyCrypterError {
    #[error("invalid crypter parameters: {0}")]
    InvalidParameters(String),
    #[error("encryption failed: {0}")]
    Encrypt(String),
    #[error("decryption failed: {0}")]
    Decrypt(String),
}

/// Symmetric cipher that protects private keys. Implementations hold whatever
/// derived key material they need; the wallet only moves ciphertext around.
pub trait KeyCrypter: Send + Sync + fmt::Debug {
    fn understood_encryption_type(&self) -> EncryptionType;

    /// Derivation parameters for ciphers that have them.
    fn scrypt_parameters(&self) -> Option<&ScryptParameters>;

    fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedPrivateKey, KeyCrypterError>;

    fn decrypt(&self, encrypted: &EncryptedPrivateKey) -> Result<SecretBytes, KeyCrypterError>;
}

/// Builds crypters from persisted parameters when a wallet is loaded.
pub trait KeyCrypterFactory: Send + Sync {
    fn scrypt_aes(&self, parameters: &ScryptParameters)
        -> Result<Arc<dyn KeyCrypter>, KeyCrypterError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrivateKeyMaterial {
    Plain(SecretBytes),
    Encrypted(EncryptedPrivateKey),
    Absent,
}

/// An elliptic-curve key held by a wallet. Encrypted keys always carry the
/// crypter that produced them.
#[derive(Clone)]
pub struct EcKey {
    pub_key: Vec<u8>,
    private: PrivateKeyMaterial,
    creation_time_seconds: i64,
    crypter: Option<Arc<dyn KeyCrypter>>,
}

impl EcKey {
    /// Builds a key from raw private key bytes. When `pub_key` is missing it is
    /// derived as an uncompressed secp256k1 point.
    pub fn from_private(private_key: &[u8], pub_key: Option<Vec<u8>>) -> Result<Self, WalletError> {
        let pub_key = match pub_key {
            Some(pub_key) => pub_key,
            None => derive_public_key(private_key)?,
        };
        Ok(Self {
            pub_key,
            private: PrivateKeyMaterial::Plain(SecretBytes::from(private_key)),
            creation_time_seconds: 0,
            crypter: None,
        })
    }

    pub fn watch_only(pub_key: Vec<u8>) -> Self {
        Self {
            pub_key,
            private: PrivateKeyMaterial::Absent,
            creation_time_seconds: 0,
            crypter: None,
        }
    }

    pub fn from_encrypted(
        encrypted: EncryptedPrivateKey,
        pub_key: Vec<u8>,
        crypter: Arc<dyn KeyCrypter>,
    ) -> Self {
        Self {
            pub_key,
            private: PrivateKeyMaterial::Encrypted(encrypted),
            creation_time_seconds: 0,
            crypter: Some(crypter),
        }
    }

    pub fn pub_key(&self) -> &[u8] {
        &self.pub_key
    }

    pub fn private_material(&self) -> &PrivateKeyMaterial {
        &self.private
    }

    pub fn private_key_bytes(&self) -> Option<&[u8]> {
        match &self.private {
            PrivateKeyMaterial::Plain(bytes) => Some(bytes.as_bytes()),
            _ => None,
        }
    }

    pub fn encrypted_private_key(&self) -> Option<&EncryptedPrivateKey> {
        match &self.private {
            PrivateKeyMaterial::Encrypted(encrypted) => Some(encrypted),
            _ => None,
        }
    }

    pub fn key_crypter(&self) -> Option<&Arc<dyn KeyCrypter>> {
        self.crypter.as_ref()
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self.private, PrivateKeyMaterial::Encrypted(_))
    }

    pub fn is_watch_only(&self) -> bool {
        matches!(self.private, PrivateKeyMaterial::Absent)
    }

    /// Cipher protecting this key, `Unencrypted` for plain and watch-only keys.
    pub fn encryption_type(&self) -> EncryptionType {
        match (&self.private, &self.crypter) {
            (PrivateKeyMaterial::Encrypted(_), Some(crypter)) => {
                crypter.understood_encryption_type()
            }
            _ => EncryptionType::Unencrypted,
        }
    }

    pub fn creation_time_seconds(&self) -> i64 {
        self.creation_time_seconds
    }

    pub fn set_creation_time_seconds(&mut self, seconds: i64) {
        self.creation_time_seconds = seconds;
    }

    pub fn encrypt(&self, crypter: Arc<dyn KeyCrypter>) -> Result<EcKey, WalletError> {
        let plaintext = match &self.private {
            PrivateKeyMaterial::Plain(bytes) => bytes,
            PrivateKeyMaterial::Encrypted(_) => return Err(WalletError::KeyAlreadyEncrypted),
            PrivateKeyMaterial::Absent => return Err(WalletError::MissingPrivateKey),
        };
        let encrypted = crypter.encrypt(plaintext.as_bytes())?;
        let mut key = EcKey::from_encrypted(encrypted, self.pub_key.clone(), crypter);
        key.creation_time_seconds = self.creation_time_seconds;
        Ok(key)
    }

    pub fn decrypt(&self) -> Result<EcKey, WalletError> {
        let (encrypted, crypter) = match (&self.private, &self.crypter) {
            (PrivateKeyMaterial::Encrypted(encrypted), Some(crypter)) => (encrypted, crypter),
            _ => return Err(WalletError::KeyNotEncrypted),
        };
        let plaintext = crypter.decrypt(encrypted)?;
        if derive_public_key(plaintext.as_bytes())? != self.pub_key {
            return Err(WalletError::IncorrectKeyMaterial);
        }
        Ok(Self {
            pub_key: self.pub_key.clone(),
            private: PrivateKeyMaterial::Plain(plaintext),
            creation_time_seconds: self.creation_time_seconds,
            crypter: None,
        })
    }
}

impl PartialEq for EcKey {
    fn eq(&self, other: &Self) -> bool {
        self.pub_key == other.pub_key
            && self.private == other.private
            && self.creation_time_seconds == other.creation_time_seconds
            && self.encryption_type() == other.encryption_type()
    }
}

impl Eq for EcKey {}

impl fmt::Debug for EcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcKey")
            .field("pub_key", &hex(&self.pub_key))
            .field("private", &self.private)
            .field("creation_time_seconds", &self.creation_time_seconds)
            .field("encryption_type", &self.encryption_type())
            .finish()
    }
}

fn derive_public_key(private_key: &[u8]) -> Result<Vec<u8>, WalletError> {
    let secret_key = SecretKey::from_slice(private_key).map_err(|_| WalletError::InvalidSecretKey)?;
    let pubkey = PublicKey::from_secret_key(secp(), &secret_key);
    Ok(pubkey.serialize_uncompressed().to_vec())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn secp() -> &'static Secp256k1<secp256k1::All> {
    static SECP: OnceLock<Secp256k1<secp256k1::All>> = OnceLock::new();
    SECP.get_or_init(Secp256k1::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [
        0x0c, 0x28, 0xfc, 0xa3, 0x86, 0xc7, 0xa2, 0x27, 0x60, 0x0b, 0x2f, 0xe5, 0x0b, 0x7c, 0xae,
        0x11, 0xec, 0x86, 0xd3, 0xbf, 0x1f, 0xbe, 0x47, 0x1b, 0xe8, 0x98, 0x27, 0xe1, 0x9d, 0x72,
        0xaa, 0x1d,
    ];

    #[derive(Debug)]
    struct FlipCrypter;

    impl KeyCrypter for FlipCrypter {
        fn understood_encryption_type(&self) -> EncryptionType {
            EncryptionType::EncryptedScryptAes
        }

        fn scrypt_parameters(&self) -> Option<&ScryptParameters> {
            None
        }

        fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedPrivateKey, KeyCrypterError> {
            Ok(EncryptedPrivateKey {
                initialisation_vector: vec![0u8; 16],
                encrypted_private_key: plaintext.iter().map(|byte| !byte).collect(),
            })
        }

        fn decrypt(&self, encrypted: &EncryptedPrivateKey) -> Result<SecretBytes, KeyCrypterError> {
            Ok(SecretBytes::new(
                encrypted.encrypted_private_key.iter().map(|byte| !byte).collect(),
            ))
        }
    }

    #[test]
    fn derives_uncompressed_public_key() {
        let key = EcKey::from_private(&SECRET, None).expect("key");
        assert_eq!(key.pub_key().len(), 65);
        assert_eq!(key.pub_key()[0], 0x04);
        assert_eq!(
            hex(&key.pub_key()[1..33]),
            "d0de0aaeaefad02b8bdc8a01a1b8b11c696bd3d66a2c5f10780d95b7df42645c"
        );
    }

    #[test]
    fn invalid_secret_is_rejected_only_when_deriving() {
        assert!(matches!(
            EcKey::from_private(&[0u8; 32], None),
            Err(WalletError::InvalidSecretKey)
        ));
        let key = EcKey::from_private(&[0u8; 32], Some(vec![2u8; 33])).expect("key");
        assert_eq!(key.pub_key(), &[2u8; 33][..]);
    }

    #[test]
    fn encrypt_then_decrypt_restores_plain_key() {
        let mut key = EcKey::from_private(&SECRET, None).expect("key");
        key.set_creation_time_seconds(1_400_000_000);
        let encrypted = key.encrypt(Arc::new(FlipCrypter)).expect("encrypt");
        assert!(encrypted.is_encrypted());
        assert_eq!(encrypted.encryption_type(), EncryptionType::EncryptedScryptAes);
        assert_eq!(encrypted.creation_time_seconds(), 1_400_000_000);
        assert!(encrypted.private_key_bytes().is_none());

        let decrypted = encrypted.decrypt().expect("decrypt");
        assert_eq!(decrypted, key);
    }

    #[test]
    fn watch_only_key_cannot_be_encrypted() {
        let key = EcKey::watch_only(vec![3u8; 33]);
        assert!(key.is_watch_only());
        assert!(matches!(
            key.encrypt(Arc::new(FlipCrypter)),
            Err(WalletError::MissingPrivateKey)
        ));
    }

    #[test]
    fn debug_output_hides_secret() {
        let key = EcKey::from_private(&SECRET, None).expect("key");
        let rendered = format!("{key:?}");
        assert!(rendered.contains("SecretBytes(32 bytes)"));
        assert!(!rendered.contains("0c28fca3"));
    }
}
