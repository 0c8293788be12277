use std::fmt;

/// Marker written by wallets that refuse to be opened by clients unaware of
/// their protection scheme.
pub const WALLET_PROTECT_ID: &str = "org.multibit.walletProtect.2";
pub const WALLET_PROTECT_V1_ID: &str = "org.multibit.walletProtect";

/// Mandatory extension ids that load even without a registered handler.
pub const LEGACY_WALLET_PROTECT_IDS: [&str; 2] = [WALLET_PROTECT_V1_ID, WALLET_PROTECT_ID];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtensionError {
    #[error("malformed payload for extension {id}: {reason}")]
    Malformed { id: String, reason: String },
}

/// Application data carried inside a wallet under a unique id.
pub trait WalletExtension: Send + fmt::Debug {
    fn id(&self) -> &str;

    /// Clients that do not understand a mandatory extension must refuse the wallet.
    fn is_mandatory(&self) -> bool;

    fn serialize(&self) -> Vec<u8>;

    fn deserialize(&mut self, data: &[u8]) -> Result<(), ExtensionError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletProtectExtension {
    id: &'static str,
    mandatory: bool,
}

impl WalletProtectExtension {
    pub fn new() -> Self {
        Self {
            id: WALLET_PROTECT_ID,
            mandatory: true,
        }
    }

    /// Protection marker under one of the legacy ids.
    pub fn with_legacy_id(id: &str) -> Option<Self> {
        LEGACY_WALLET_PROTECT_IDS
            .iter()
            .find(|legacy| **legacy == id)
            .map(|legacy| Self {
                id: legacy,
                mandatory: true,
            })
    }

    /// Keeps the flag a stored marker was written with.
    pub fn with_mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }
}

impl Default for WalletProtectExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletExtension for WalletProtectExtension {
    fn id(&self) -> &str {
        self.id
    }

    fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    fn serialize(&self) -> Vec<u8> {
        vec![0u8]
    }

    fn deserialize(&mut self, _data: &[u8]) -> Result<(), ExtensionError> {
        Ok(())
    }
}
