//! Network parameter sets and the hash types shared across the workspace.

pub mod params;

pub use params::{
    hash256_to_hex, network_params, params_from_id, HashAlgorithm, Network, NetworkParams,
};

/// A 32-byte digest kept in internal (digest output) byte order.
pub type Hash256 = [u8; 32];
