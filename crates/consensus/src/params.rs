//! Network parameter definitions.

use crate::Hash256;

pub const ID_MAINNET: &str = "org.fastcoin.production";
pub const ID_UNITTESTNET: &str = "com.google.fastcoin.unittest";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Network {
    Mainnet,
    Unittest,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Unittest];

    pub fn id(self) -> &'static str {
        match self {
            Network::Mainnet => ID_MAINNET,
            Network::Unittest => ID_UNITTESTNET,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|network| network.id() == id)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HashAlgorithm {
    /// SHA-256 applied twice; used for transaction ids.
    DoubleSha256,
    /// scrypt(1024, 1, 1); used for block proof of work.
    Scrypt,
}

#[derive(Clone, Debug)]
pub struct NetworkParams {
    pub network: Network,
    pub id: &'static str,
    pub address_header: u8,
    pub dumped_private_key_header: u8,
    pub packet_magic: u32,
    pub default_port: u16,
    pub spendable_coinbase_depth: u32,
    pub subsidy_decrease_block_count: u32,
    pub tx_hash: HashAlgorithm,
    pub pow_hash: HashAlgorithm,
}

static MAINNET: NetworkParams = NetworkParams {
    network: Network::Mainnet,
    id: ID_MAINNET,
    address_header: 96,
    dumped_private_key_header: 128,
    packet_magic: 0xfbc0_b6db,
    default_port: 9526,
    spendable_coinbase_depth: 60,
    subsidy_decrease_block_count: 2_592_000,
    tx_hash: HashAlgorithm::DoubleSha256,
    pow_hash: HashAlgorithm::Scrypt,
};

static UNITTEST: NetworkParams = NetworkParams {
    network: Network::Unittest,
    id: ID_UNITTESTNET,
    address_header: 73,
    dumped_private_key_header: 73 + 128,
    packet_magic: 0xfbc0_b6db,
    default_port: 11081,
    spendable_coinbase_depth: 5,
    subsidy_decrease_block_count: 100,
    tx_hash: HashAlgorithm::DoubleSha256,
    pow_hash: HashAlgorithm::Scrypt,
};

pub fn network_params(network: Network) -> &'static NetworkParams {
    match network {
        Network::Mainnet => &MAINNET,
        Network::Unittest => &UNITTEST,
    }
}

pub fn params_from_id(id: &str) -> Option<&'static NetworkParams> {
    Network::from_id(id).map(network_params)
}

/// Renders an internal-order hash as display-order hex.
pub fn hash256_to_hex(hash: &Hash256) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(64);
    for byte in hash.iter().rev() {
        out.push(DIGITS[(byte >> 4) as usize] as char);
        out.push(DIGITS[(byte & 0x0f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_identifier() {
        let params = params_from_id(ID_MAINNET).expect("mainnet params");
        assert_eq!(params.network, Network::Mainnet);
        assert_eq!(params.address_header, 96);

        let params = params_from_id(ID_UNITTESTNET).expect("unittest params");
        assert_eq!(params.dumped_private_key_header, 201);
        assert!(params_from_id("org.bitcoin.production").is_none());
    }

    #[test]
    fn transactions_hash_with_double_sha() {
        for network in Network::ALL {
            assert_eq!(network_params(network).tx_hash, HashAlgorithm::DoubleSha256);
        }
    }

    #[test]
    fn hex_is_display_order() {
        let mut hash = [0u8; 32];
        hash[0] = 0x01;
        hash[31] = 0xec;
        let hex = hash256_to_hex(&hash);
        assert!(hex.starts_with("ec"));
        assert!(hex.ends_with("01"));
        assert_eq!(hex.len(), 64);
    }
}
