#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use coinstash_consensus::{network_params, Network, NetworkParams};
use coinstash_primitives::{OutPoint, Transaction, TxIn, TxOut};
use coinstash_store::WalletProtobufSerializer;
use coinstash_wallet::{
    EcKey, EncryptedPrivateKey, EncryptionType, ExtensionError, InPoint, KeyCrypter,
    KeyCrypterError, KeyCrypterFactory, PeerAddress, Pool, ScryptParameters, SecretBytes, Source,
    Wallet, WalletExtension, WalletTransaction, WalletVersion,
};

/// Stand-in cipher: XOR with a pad derived from the salt.
#[derive(Debug)]
pub struct XorCrypter {
    parameters: ScryptParameters,
    pad: u8,
}

impl XorCrypter {
    pub fn new(parameters: ScryptParameters) -> Self {
        let pad = parameters.salt.iter().fold(0x5a, |acc, byte| acc ^ byte);
        Self { parameters, pad }
    }
}

impl KeyCrypter for XorCrypter {
    fn understood_encryption_type(&self) -> EncryptionType {
        EncryptionType::EncryptedScryptAes
    }

    fn scrypt_parameters(&self) -> Option<&ScryptParameters> {
        Some(&self.parameters)
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedPrivateKey, KeyCrypterError> {
        Ok(EncryptedPrivateKey {
            initialisation_vector: vec![self.pad; 16],
            encrypted_private_key: plaintext.iter().map(|byte| byte ^ self.pad).collect(),
        })
    }

    fn decrypt(&self, encrypted: &EncryptedPrivateKey) -> Result<SecretBytes, KeyCrypterError> {
        Ok(SecretBytes::new(
            encrypted
                .encrypted_private_key
                .iter()
                .map(|byte| byte ^ self.pad)
                .collect(),
        ))
    }
}

pub struct XorCrypterFactory;

impl KeyCrypterFactory for XorCrypterFactory {
    fn scrypt_aes(
        &self,
        parameters: &ScryptParameters,
    ) -> Result<Arc<dyn KeyCrypter>, KeyCrypterError> {
        if parameters.salt.is_empty() {
            return Err(KeyCrypterError::InvalidParameters("empty salt".to_string()));
        }
        Ok(Arc::new(XorCrypter::new(parameters.clone())))
    }
}

/// Cipher of a kind the store does not know how to persist.
#[derive(Debug)]
pub struct OpaqueCrypter;

impl KeyCrypter for OpaqueCrypter {
    fn understood_encryption_type(&self) -> EncryptionType {
        EncryptionType::Unrecognized(9)
    }

    fn scrypt_parameters(&self) -> Option<&ScryptParameters> {
        None
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedPrivateKey, KeyCrypterError> {
        Ok(EncryptedPrivateKey {
            initialisation_vector: Vec::new(),
            encrypted_private_key: plaintext.to_vec(),
        })
    }

    fn decrypt(&self, encrypted: &EncryptedPrivateKey) -> Result<SecretBytes, KeyCrypterError> {
        Ok(SecretBytes::new(encrypted.encrypted_private_key.clone()))
    }
}

/// Cipher that claims to leave keys unencrypted while still producing
/// ciphertext.
#[derive(Debug)]
pub struct UnlabelledCrypter;

impl KeyCrypter for UnlabelledCrypter {
    fn understood_encryption_type(&self) -> EncryptionType {
        EncryptionType::Unencrypted
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

/// Extension holding a little-endian counter.
#[derive(Debug)]
pub struct CounterExtension {
    pub id: String,
    pub mandatory: bool,
    pub value: u32,
}

impl CounterExtension {
    pub fn new(id: &str, mandatory: bool, value: u32) -> Self {
        Self {
            id: id.to_string(),
            mandatory,
            value,
        }
    }
}

impl WalletExtension for CounterExtension {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    fn serialize(&self) -> Vec<u8> {
        self.value.to_le_bytes().to_vec()
    }

    fn deserialize(&mut self, data: &[u8]) -> Result<(), ExtensionError> {
        let bytes: [u8; 4] = data.try_into().map_err(|_| ExtensionError::Malformed {
            id: self.id.clone(),
            reason: format!("expected 4 bytes, found {}", data.len()),
        })?;
        self.value = u32::from_le_bytes(bytes);
        Ok(())
    }
}

pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 16
    }

    pub fn gen_range(&mut self, upper: u64) -> u64 {
        self.next_u64() % upper
    }
}

pub fn unittest() -> &'static NetworkParams {
    network_params(Network::Unittest)
}

pub fn serializer() -> WalletProtobufSerializer {
    WalletProtobufSerializer::new().with_key_crypter_factory(Arc::new(XorCrypterFactory))
}

pub fn salt() -> ScryptParameters {
    ScryptParameters::with_salt(vec![0x13, 0x37, 0xc0, 0xde, 0x01, 0x02, 0x03, 0x04])
}

/// Transaction spending `prevouts`, paying `values` to trivial scripts.
pub fn spend(prevouts: &[OutPoint], values: &[i64]) -> Transaction {
    Transaction {
        version: 1,
        vin: prevouts
            .iter()
            .enumerate()
            .map(|(index, prevout)| TxIn::new(*prevout, vec![0x47, index as u8]))
            .collect(),
        vout: values
            .iter()
            .map(|value| TxOut {
                value: *value,
                script_pubkey: vec![0x76, 0xa9, 0x14, (*value % 251) as u8, 0x88, 0xac],
            })
            .collect(),
        lock_time: 0,
    }
}

pub fn peer(last_octet: u8) -> PeerAddress {
    PeerAddress {
        ip: IpAddr::V4(Ipv4Addr::new(192, 168, 1, last_octet)),
        port: 11081,
        services: 1,
    }
}

/// Chain of two transactions: `funding` pays two outputs, `spending` spends
/// output 1. Returns (funding, spending) before wiring.
pub fn funding_and_spend() -> (WalletTransaction, WalletTransaction) {
    let funding = WalletTransaction::new(
        Pool::Spent,
        spend(&[OutPoint::new([0xf0; 32], 0)], &[40_000, 60_000]),
    );
    let spending = WalletTransaction::new(
        Pool::Unspent,
        spend(&[OutPoint::new(funding.hash(), 1)], &[59_000]),
    );
    (funding, spending)
}

/// Unencrypted wallet touching every part of the document.
pub fn sample_wallet() -> Wallet {
    let mut wallet = Wallet::new(unittest());
    wallet.set_description(Some("savings".to_string()));
    wallet.set_version(Some(WalletVersion::Protobuf));
    wallet.set_last_block_seen_hash(Some([0xbe; 32]));
    wallet.set_last_block_seen_height(1_234);

    let mut key = EcKey::from_private(&[0x21; 32], None).expect("key");
    key.set_creation_time_seconds(1_400_000_000);
    wallet.add_key(key).expect("add key");
    let watch = EcKey::from_private(&[0x22; 32], None).expect("key");
    wallet
        .add_key(EcKey::watch_only(watch.pub_key().to_vec()))
        .expect("add watch-only");

    let (mut funding, mut spending) = funding_and_spend();
    funding.set_update_time_ms(Some(1_400_000_100_000));
    funding.add_block_appearance([0xb1; 32]);
    {
        let confidence = funding.confidence_or_init();
        confidence.set_building(1_200);
        confidence.set_depth(35);
        confidence.set_work_done(1_000_000);
        confidence.set_source(Source::Network);
        confidence.mark_broadcast_by(peer(7));
    }
    spending.set_update_time_ms(Some(1_400_000_200_000));
    {
        let confidence = spending.confidence_or_init();
        confidence.set_pending();
        confidence.set_source(Source::SelfIssued);
        confidence.mark_broadcast_by(peer(8));
        confidence.mark_broadcast_by(peer(9));
    }
    let funding_point = OutPoint::new(funding.hash(), 1);
    let spender = InPoint {
        hash: spending.hash(),
        index: 0,
    };
    wallet.add_wallet_transaction(funding);
    wallet.add_wallet_transaction(spending);
    wallet.connect(funding_point, spender).expect("connect");
    wallet
}
