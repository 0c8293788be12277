//! Hashes are held in digest order and stored reversed.

use coinstash_consensus::Hash256;

use crate::error::WalletStoreError;

pub(crate) fn hash_to_bytes(hash: &Hash256) -> Vec<u8> {
    hash.iter().rev().copied().collect()
}

pub(crate) fn hash_from_bytes(
    field: &'static str,
    bytes: &[u8],
) -> Result<Hash256, WalletStoreError> {
    let mut hash: Hash256 = bytes.try_into().map_err(|_| WalletStoreError::InvalidHashLength {
        field,
        len: bytes.len(),
    })?;
    hash.reverse();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_order_is_reversed() {
        let mut hash = [0u8; 32];
        hash[0] = 0xaa;
        hash[31] = 0x01;
        let bytes = hash_to_bytes(&hash);
        assert_eq!(bytes[0], 0x01);
        assert_eq!(bytes[31], 0xaa);
        assert_eq!(hash_from_bytes("hash", &bytes).expect("hash"), hash);
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(matches!(
            hash_from_bytes("transaction.hash", &[0u8; 31]),
            Err(WalletStoreError::InvalidHashLength {
                field: "transaction.hash",
                len: 31
            })
        ));
    }
}
