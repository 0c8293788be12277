mod common;

use coinstash_consensus::{network_params, Network};
use coinstash_store::{WalletProtobufSerializer, WalletStoreError};
use coinstash_wallet::{ConfidenceType, Pool, Source, Wallet, WalletVersion};

use common::{sample_wallet, serializer, unittest};

#[test]
fn wallet_round_trips() {
    let wallet = sample_wallet();
    let bytes = serializer().write_wallet(&wallet).expect("write");
    let decoded = serializer().read_wallet(&bytes).expect("read");
    assert_eq!(decoded, wallet);

    assert_eq!(decoded.description(), Some("savings"));
    assert_eq!(decoded.last_block_seen_hash(), Some([0xbe; 32]));
    assert_eq!(decoded.last_block_seen_height(), 1_234);
    assert_eq!(decoded.keys().len(), 2);
    assert_eq!(decoded.keys()[0].creation_time_seconds(), 1_400_000_000);
    assert!(decoded.keys()[1].is_watch_only());
    assert_eq!(decoded.pool_size(Pool::Spent), 1);
    assert_eq!(decoded.pool_size(Pool::Unspent), 1);
}

#[test]
fn reencoding_is_byte_identical() {
    let wallet = sample_wallet();
    let bytes = serializer().write_wallet(&wallet).expect("write");
    let decoded = serializer().read_wallet(&bytes).expect("read");
    let again = serializer().write_wallet(&decoded).expect("rewrite");
    assert_eq!(again, bytes);
}

#[test]
fn decoding_twice_gives_equal_wallets() {
    let bytes = serializer().write_wallet(&sample_wallet()).expect("write");
    let mut reader = serializer();
    let first = reader.read_wallet(&bytes).expect("first");
    let second = reader.read_wallet(&bytes).expect("second");
    assert_eq!(first, second);
    assert_eq!(reader.pending_transactions(), 0);
}

#[test]
fn confidence_survives_round_trip() {
    let wallet = sample_wallet();
    let bytes = serializer().write_wallet(&wallet).expect("write");
    let decoded = serializer().read_wallet(&bytes).expect("read");

    let funding = decoded
        .transactions_in(Pool::Spent)
        .next()
        .expect("funding");
    let state = funding.confidence().expect("confidence").snapshot();
    assert_eq!(state.confidence_type, ConfidenceType::Building);
    assert_eq!(state.appeared_at_height, 1_200);
    assert_eq!(state.depth, 35);
    assert_eq!(state.work_done, Some(1_000_000));
    assert_eq!(state.source, Source::Network);
    assert_eq!(state.broadcast_by, vec![common::peer(7)]);

    let spending = decoded
        .transactions_in(Pool::Unspent)
        .next()
        .expect("spending");
    let state = spending.confidence().expect("confidence").snapshot();
    assert_eq!(state.confidence_type, ConfidenceType::NotSeenInChain);
    assert_eq!(state.appeared_at_height, -1);
    assert_eq!(state.source, Source::SelfIssued);
    assert_eq!(state.broadcast_by.len(), 2);
}

#[test]
fn empty_wallet_round_trips() {
    let mut wallet = Wallet::new(network_params(Network::Mainnet));
    wallet.set_version(Some(WalletVersion::Protobuf));
    let bytes = serializer().write_wallet(&wallet).expect("write");
    let decoded = serializer().read_wallet(&bytes).expect("read");
    assert_eq!(decoded, wallet);
    assert_eq!(decoded.params().network, Network::Mainnet);
    assert_eq!(decoded.last_block_seen_height(), -1);
    assert_eq!(decoded.last_block_seen_hash(), None);
}

#[test]
fn height_is_always_written() {
    let wallet = Wallet::new(unittest());
    let document = serializer().wallet_to_proto(&wallet).expect("proto");
    assert_eq!(document.last_seen_block_height, Some(u32::MAX));
    assert_eq!(document.encryption_type, Some(1));
    assert_eq!(document.version, None);
}

#[test]
fn absent_height_reads_as_minus_one() {
    let mut document = serializer()
        .wallet_to_proto(&sample_wallet())
        .expect("proto");
    document.last_seen_block_height = None;
    let wallet = serializer().load_wallet(&document, Vec::new()).expect("load");
    assert_eq!(wallet.last_block_seen_height(), -1);
}

#[test]
fn write_to_matches_write() {
    let wallet = sample_wallet();
    let mut out = Vec::new();
    serializer()
        .write_wallet_to(&wallet, &mut out)
        .expect("write to");
    assert_eq!(out, serializer().write_wallet(&wallet).expect("write"));
}

#[test]
fn text_rendering_names_network() {
    let text = serializer()
        .wallet_to_text(&sample_wallet())
        .expect("text");
    assert!(text.contains("com.google.fastcoin.unittest"));
    assert!(text.contains("savings"));
}

#[test]
fn unknown_network_is_rejected() {
    let mut document = serializer()
        .wallet_to_proto(&sample_wallet())
        .expect("proto");
    document.network_identifier = "org.example.elsewhere".to_string();
    match serializer().load_wallet(&document, Vec::new()) {
        Err(WalletStoreError::UnknownNetwork(id)) => assert_eq!(id, "org.example.elsewhere"),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn truncated_field_fails_to_parse() {
    let mut bytes = serializer().write_wallet(&sample_wallet()).expect("write");
    bytes.extend_from_slice(&[0x0a, 0x05, 0x01]);
    assert!(matches!(
        WalletProtobufSerializer::parse_to_proto(&bytes),
        Err(WalletStoreError::Protobuf(_))
    ));
}

#[test]
fn legacy_documents_infer_version() {
    let mut document = serializer()
        .wallet_to_proto(&sample_wallet())
        .expect("proto");
    document.version = None;
    let wallet = serializer().load_wallet(&document, Vec::new()).expect("load");
    assert_eq!(wallet.version(), Some(WalletVersion::Protobuf));

    document.version = Some(0);
    let wallet = serializer().load_wallet(&document, Vec::new()).expect("load");
    assert_eq!(wallet.version(), Some(WalletVersion::Protobuf));

    document.version = Some(7);
    assert!(matches!(
        serializer().load_wallet(&document, Vec::new()),
        Err(WalletStoreError::UnrecognizedVersion { version: 7, .. })
    ));
}
