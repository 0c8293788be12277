use coinstash_consensus::{Hash256, HashAlgorithm};
use sha2::{Digest, Sha256};

pub fn sha256d(data: &[u8]) -> Hash256 {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    out
}

/// Hashes `data` with `algorithm`, or returns `None` when the algorithm is
/// only defined for block headers.
pub fn digest_with(algorithm: HashAlgorithm, data: &[u8]) -> Option<Hash256> {
    match algorithm {
        HashAlgorithm::DoubleSha256 => Some(sha256d(data)),
        HashAlgorithm::Scrypt => None,
    }
}
