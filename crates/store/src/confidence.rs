//! Confidence records.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use coinstash_consensus::{hash256_to_hex, Hash256};
use coinstash_log::log_warn;
use coinstash_wallet::{ConfidenceState, ConfidenceType, PeerAddress, Source, TransactionConfidence};

use crate::error::WalletStoreError;
use crate::hashes::{hash_from_bytes, hash_to_bytes};
use crate::proto;
use crate::proto::transaction_confidence::{Source as SourceTag, Type as TypeTag};

/// Encodes from a single snapshot so concurrent updates never produce a
/// record mixing two states.
pub(crate) fn write_confidence(confidence: &TransactionConfidence) -> proto::TransactionConfidence {
    let state = confidence.snapshot();
    let mut record = proto::TransactionConfidence {
        r#type: Some(type_tag(state.confidence_type) as i32),
        source: Some(source_tag(state.source) as i32),
        broadcast_by: state.broadcast_by.iter().map(write_peer).collect(),
        ..Default::default()
    };
    match state.confidence_type {
        ConfidenceType::Building => {
            record.appeared_at_height = Some(state.appeared_at_height);
            record.depth = Some(state.depth);
            // State written through `update` may exceed what the field holds.
            record.work_done = state
                .work_done
                .map(|work| i64::try_from(work).unwrap_or(i64::MAX));
        }
        ConfidenceType::Dead => {
            record.overriding_transaction =
                state.overriding_transaction.as_ref().map(hash_to_bytes);
        }
        ConfidenceType::Unknown | ConfidenceType::NotSeenInChain => {}
    }
    record
}

/// Decodes the record for transaction `tx_hash`. Fields that do not belong to
/// the decoded type are skipped with a warning; `is_known` tells whether an
/// overriding transaction is held by the wallet being loaded.
pub(crate) fn read_confidence(
    record: &proto::TransactionConfidence,
    tx_hash: &Hash256,
    is_known: impl Fn(&Hash256) -> bool,
) -> Result<ConfidenceState, WalletStoreError> {
    let tx = hash256_to_hex(tx_hash);
    let mut state = ConfidenceState::default();
    state.set_confidence_type(read_type(record.r#type, &tx));
    let building = state.confidence_type == ConfidenceType::Building;

    if let Some(height) = record.appeared_at_height {
        if building {
            state.appeared_at_height = height;
        } else {
            log_warn!("confidence of {tx} has appeared_at_height but is not BUILDING, ignoring");
        }
    }
    if let Some(depth) = record.depth {
        if building {
            state.depth = depth;
        } else {
            log_warn!("confidence of {tx} has depth but is not BUILDING, ignoring");
        }
    }
    if let Some(work_done) = record.work_done {
        if !building {
            log_warn!("confidence of {tx} has work_done but is not BUILDING, ignoring");
        } else if let Ok(work_done) = u64::try_from(work_done) {
            state.work_done = Some(work_done);
        } else {
            log_warn!("confidence of {tx} has negative work_done {work_done}, ignoring");
        }
    }
    if let Some(bytes) = &record.overriding_transaction {
        if state.confidence_type != ConfidenceType::Dead {
            log_warn!("confidence of {tx} has overriding_transaction but is not DEAD, ignoring");
        } else {
            let overriding = hash_from_bytes("confidence.overriding_transaction", bytes)?;
            if is_known(&overriding) {
                state.overriding_transaction = Some(overriding);
            } else {
                log_warn!(
                    "confidence of {tx} names overriding transaction {} which is not in the wallet",
                    hash256_to_hex(&overriding)
                );
            }
        }
    }
    for peer in &record.broadcast_by {
        let peer = read_peer(peer)?;
        if !state.broadcast_by.contains(&peer) {
            state.broadcast_by.push(peer);
        }
    }
    state.source = read_source(record.source, &tx);
    Ok(state)
}

fn type_tag(confidence_type: ConfidenceType) -> TypeTag {
    match confidence_type {
        ConfidenceType::Unknown => TypeTag::Unknown,
        ConfidenceType::Building => TypeTag::Building,
        ConfidenceType::NotSeenInChain => TypeTag::NotSeenInChain,
        ConfidenceType::Dead => TypeTag::Dead,
    }
}

fn read_type(raw: Option<i32>, tx: &str) -> ConfidenceType {
    let Some(raw) = raw else {
        return ConfidenceType::Unknown;
    };
    match TypeTag::try_from(raw) {
        Ok(TypeTag::Unknown) => ConfidenceType::Unknown,
        Ok(TypeTag::Building) => ConfidenceType::Building,
        Ok(TypeTag::NotSeenInChain | TypeTag::NotInBestChain) => ConfidenceType::NotSeenInChain,
        Ok(TypeTag::Dead) => ConfidenceType::Dead,
        Err(_) => {
            log_warn!("confidence of {tx} has unknown type {raw}, treating as UNKNOWN");
            ConfidenceType::Unknown
        }
    }
}

fn source_tag(source: Source) -> SourceTag {
    match source {
        Source::Unknown => SourceTag::SourceUnknown,
        Source::Network => SourceTag::SourceNetwork,
        Source::SelfIssued => SourceTag::SourceSelf,
    }
}

fn read_source(raw: Option<i32>, tx: &str) -> Source {
    let Some(raw) = raw else {
        return Source::Unknown;
    };
    match SourceTag::try_from(raw) {
        Ok(SourceTag::SourceUnknown) => Source::Unknown,
        Ok(SourceTag::SourceNetwork) => Source::Network,
        Ok(SourceTag::SourceSelf) => Source::SelfIssued,
        Err(_) => {
            log_warn!("confidence of {tx} has unknown source {raw}, treating as SOURCE_UNKNOWN");
            Source::Unknown
        }
    }
}

fn write_peer(peer: &PeerAddress) -> proto::PeerAddress {
    let ip_address = match peer.ip {
        IpAddr::V4(ip) => ip.octets().to_vec(),
        IpAddr::V6(ip) => ip.octets().to_vec(),
    };
    proto::PeerAddress {
        ip_address,
        port: u32::from(peer.port),
        services: peer.services,
    }
}

fn read_peer(record: &proto::PeerAddress) -> Result<PeerAddress, WalletStoreError> {
    let ip = if let Ok(octets) = <[u8; 4]>::try_from(record.ip_address.as_slice()) {
        IpAddr::V4(Ipv4Addr::from(octets))
    } else if let Ok(octets) = <[u8; 16]>::try_from(record.ip_address.as_slice()) {
        IpAddr::V6(Ipv6Addr::from(octets))
    } else {
        return Err(WalletStoreError::InvalidPeerAddress(format!(
            "ip address of {} bytes",
            record.ip_address.len()
        )));
    };
    let port = u16::try_from(record.port)
        .map_err(|_| WalletStoreError::InvalidPeerAddress(format!("port {}", record.port)))?;
    Ok(PeerAddress {
        ip,
        port,
        services: record.services,
    })
}
