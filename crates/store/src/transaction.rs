//! Transaction records.

use coinstash_consensus::{hash256_to_hex, Hash256, NetworkParams};
use coinstash_log::log_warn;
use coinstash_primitives::{OutPoint, Transaction, TxIn, TxOut, SEQUENCE_FINAL};
use coinstash_wallet::{Pool, WalletTransaction};

use crate::confidence::write_confidence;
use crate::error::WalletStoreError;
use crate::hashes::{hash_from_bytes, hash_to_bytes};
use crate::proto;

pub(crate) fn write_transaction(wtx: &WalletTransaction) -> proto::Transaction {
    let tx = wtx.transaction();
    let transaction_input = tx
        .vin
        .iter()
        .map(|input| proto::TransactionInput {
            transaction_out_point_hash: hash_to_bytes(&input.prevout.hash),
            transaction_out_point_index: input.prevout.index,
            script_bytes: input.script_sig.clone(),
            sequence: input.has_sequence().then_some(input.sequence),
        })
        .collect();
    let transaction_output = tx
        .vout
        .iter()
        .enumerate()
        .map(|(index, output)| {
            let spent_by = wtx.spent_by(index as u32);
            proto::TransactionOutput {
                value: output.value,
                script_bytes: output.script_pubkey.clone(),
                spent_by_transaction_hash: spent_by.map(|spender| hash_to_bytes(&spender.hash)),
                spent_by_transaction_index: spent_by.map(|spender| spender.index as i32),
            }
        })
        .collect();

    proto::Transaction {
        version: tx.version,
        hash: hash_to_bytes(&wtx.hash()),
        pool: wtx.pool().value(),
        lock_time: (tx.lock_time > 0).then_some(tx.lock_time),
        updated_at: wtx.update_time_ms(),
        transaction_input,
        transaction_output,
        block_hash: wtx.appears_in().iter().map(hash_to_bytes).collect(),
        confidence: wtx.confidence().map(|confidence| write_confidence(confidence)),
    }
}

/// Rebuilds a transaction without resolving references to other
/// transactions. The stored hash must match the hash of the contents.
pub(crate) fn read_transaction(
    record: &proto::Transaction,
    params: &NetworkParams,
) -> Result<WalletTransaction, WalletStoreError> {
    let vin = record
        .transaction_input
        .iter()
        .map(|input| {
            let hash = hash_from_bytes(
                "input.transaction_out_point_hash",
                &input.transaction_out_point_hash,
            )?;
            Ok(TxIn {
                prevout: OutPoint::new(hash, input.transaction_out_point_index),
                script_sig: input.script_bytes.clone(),
                sequence: input.sequence.unwrap_or(SEQUENCE_FINAL),
            })
        })
        .collect::<Result<Vec<_>, WalletStoreError>>()?;
    let vout = record
        .transaction_output
        .iter()
        .map(|output| TxOut {
            value: output.value,
            script_pubkey: output.script_bytes.clone(),
        })
        .collect();
    let tx = Transaction {
        version: record.version,
        vin,
        vout,
        lock_time: record.lock_time.unwrap_or(0),
    };

    let expected = hash_from_bytes("transaction.hash", &record.hash)?;
    let actual = tx.txid_with(params.tx_hash)?;
    if actual != expected {
        return Err(WalletStoreError::HashMismatch { expected, actual });
    }

    let pool = Pool::from_value(record.pool);
    if let Pool::Unknown(raw) = pool {
        log_warn!(
            "transaction {} has unknown pool {raw}, keeping it unclassified",
            hash256_to_hex(&actual)
        );
    }

    let mut wtx = WalletTransaction::with_hash(pool, tx, actual);
    wtx.set_update_time_ms(record.updated_at);
    for block_hash in &record.block_hash {
        wtx.add_block_appearance(hash_from_bytes("transaction.block_hash", block_hash)?);
    }
    Ok(wtx)
}

/// Hash of a record as stored, without checking it against the contents.
pub(crate) fn record_hash(record: &proto::Transaction) -> Result<Hash256, WalletStoreError> {
    hash_from_bytes("transaction.hash", &record.hash)
}
