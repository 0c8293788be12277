//! Protobuf messages of the wallet document.
//!
//! Field numbers and types are fixed by documents already on disk; new fields
//! must take fresh tags.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PeerAddress {
    #[prost(bytes = "vec", required, tag = "1")]
    pub ip_address: Vec<u8>,
    #[prost(uint32, required, tag = "2")]
    pub port: u32,
    #[prost(uint64, required, tag = "3")]
    pub services: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EncryptedPrivateKey {
    #[prost(bytes = "vec", required, tag = "1")]
    pub initialisation_vector: Vec<u8>,
    #[prost(bytes = "vec", required, tag = "2")]
    pub encrypted_private_key: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Key {
    #[prost(enumeration = "key::Type", required, tag = "1")]
    pub r#type: i32,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub private_key: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub public_key: Option<Vec<u8>>,
    #[prost(string, optional, tag = "4")]
    pub label: Option<String>,
    /// Milliseconds since the epoch.
    #[prost(int64, optional, tag = "5")]
    pub creation_timestamp: Option<i64>,
    #[prost(message, optional, tag = "6")]
    pub encrypted_private_key: Option<EncryptedPrivateKey>,
}

pub mod key {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        Original = 1,
        EncryptedScryptAes = 2,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionInput {
    #[prost(bytes = "vec", required, tag = "1")]
    pub transaction_out_point_hash: Vec<u8>,
    #[prost(uint32, required, tag = "2")]
    pub transaction_out_point_index: u32,
    #[prost(bytes = "vec", required, tag = "3")]
    pub script_bytes: Vec<u8>,
    #[prost(uint32, optional, tag = "4")]
    pub sequence: Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionOutput {
    #[prost(int64, required, tag = "1")]
    pub value: i64,
    #[prost(bytes = "vec", required, tag = "2")]
    pub script_bytes: Vec<u8>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub spent_by_transaction_hash: Option<Vec<u8>>,
    #[prost(int32, optional, tag = "4")]
    pub spent_by_transaction_index: Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionConfidence {
    #[prost(enumeration = "transaction_confidence::Type", optional, tag = "1")]
    pub r#type: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub appeared_at_height: Option<i32>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub overriding_transaction: Option<Vec<u8>>,
    #[prost(int32, optional, tag = "4")]
    pub depth: Option<i32>,
    #[prost(int64, optional, tag = "5")]
    pub work_done: Option<i64>,
    #[prost(message, repeated, tag = "6")]
    pub broadcast_by: Vec<PeerAddress>,
    #[prost(enumeration = "transaction_confidence::Source", optional, tag = "7")]
    pub source: Option<i32>,
}

pub mod transaction_confidence {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        Unknown = 0,
        Building = 1,
        NotSeenInChain = 2,
        /// Written by old clients; read as `NotSeenInChain`.
        NotInBestChain = 3,
        Dead = 4,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Source {
        SourceUnknown = 0,
        SourceNetwork = 1,
        SourceSelf = 2,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transaction {
    #[prost(int32, required, tag = "1")]
    pub version: i32,
    #[prost(bytes = "vec", required, tag = "2")]
    pub hash: Vec<u8>,
    #[prost(enumeration = "transaction::Pool", required, tag = "3")]
    pub pool: i32,
    #[prost(uint32, optional, tag = "4")]
    pub lock_time: Option<u32>,
    /// Milliseconds since the epoch.
    #[prost(int64, optional, tag = "5")]
    pub updated_at: Option<i64>,
    #[prost(message, repeated, tag = "6")]
    pub transaction_input: Vec<TransactionInput>,
    #[prost(message, repeated, tag = "7")]
    pub transaction_output: Vec<TransactionOutput>,
    #[prost(bytes = "vec", repeated, tag = "8")]
    pub block_hash: Vec<Vec<u8>>,
    #[prost(message, optional, tag = "9")]
    pub confidence: Option<TransactionConfidence>,
}

pub mod transaction {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Pool {
        Inactive = 2,
        Unspent = 4,
        Spent = 5,
        Dead = 10,
        Pending = 16,
        PendingInactive = 18,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ScryptParameters {
    #[prost(bytes = "vec", required, tag = "1")]
    pub salt: Vec<u8>,
    #[prost(int64, optional, tag = "2", default = "16384")]
    pub n: Option<i64>,
    #[prost(int32, optional, tag = "3", default = "8")]
    pub r: Option<i32>,
    #[prost(int32, optional, tag = "4", default = "1")]
    pub p: Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Extension {
    #[prost(string, required, tag = "1")]
    pub id: String,
    #[prost(bytes = "vec", required, tag = "2")]
    pub data: Vec<u8>,
    #[prost(bool, required, tag = "3")]
    pub mandatory: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Wallet {
    #[prost(string, required, tag = "1")]
    pub network_identifier: String,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub last_seen_block_hash: Option<Vec<u8>>,
    #[prost(message, repeated, tag = "3")]
    pub key: Vec<Key>,
    #[prost(message, repeated, tag = "4")]
    pub transaction: Vec<Transaction>,
    #[prost(enumeration = "wallet::EncryptionType", optional, tag = "5", default = "Unencrypted")]
    pub encryption_type: Option<i32>,
    #[prost(message, optional, tag = "6")]
    pub encryption_parameters: Option<ScryptParameters>,
    #[prost(int32, optional, tag = "7")]
    pub version: Option<i32>,
    #[prost(message, repeated, tag = "10")]
    pub extension: Vec<Extension>,
    #[prost(string, optional, tag = "11")]
    pub description: Option<String>,
    #[prost(uint32, optional, tag = "12")]
    pub last_seen_block_height: Option<u32>,
}

pub mod wallet {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum EncryptionType {
        Unencrypted = 1,
        EncryptedScryptAes = 2,
    }
}
