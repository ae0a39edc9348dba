use crate::proto::ProtoServerErrorCode;
use std::fmt;

/// ServerErrorCode is the closed set of outcomes a data node reports for a single request.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ServerErrorCode {
    NoError,
    IoError,
    BlobNotFound,
    BlobDeleted,
    BlobExpired,
    DataCorrupt,
    DiskUnavailable,
    PartitionUnknown,
    PartitionReadOnly,
    ReplicaUnavailable,
    BlobAlreadyExists,
    UnknownError,
}

impl ServerErrorCode {
    /// `from_wire()` never fails. A code this client doesn't know about is mapped to `UnknownError`,
    /// which every operation type treats as unexpected.
    pub(crate) fn from_wire(raw: i32) -> Self {
        match ProtoServerErrorCode::from_i32(raw) {
            Some(proto_code) => ServerErrorCode::from(proto_code),
            None => ServerErrorCode::UnknownError,
        }
    }

    pub(crate) fn to_wire(self) -> i32 {
        ProtoServerErrorCode::from(self) as i32
    }
}

impl fmt::Display for ServerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ------- Conversions --------

impl From<ProtoServerErrorCode> for ServerErrorCode {
    fn from(proto_code: ProtoServerErrorCode) -> Self {
        match proto_code {
            ProtoServerErrorCode::NoError => ServerErrorCode::NoError,
            ProtoServerErrorCode::IoError => ServerErrorCode::IoError,
            ProtoServerErrorCode::BlobNotFound => ServerErrorCode::BlobNotFound,
            ProtoServerErrorCode::BlobDeleted => ServerErrorCode::BlobDeleted,
            ProtoServerErrorCode::BlobExpired => ServerErrorCode::BlobExpired,
            ProtoServerErrorCode::DataCorrupt => ServerErrorCode::DataCorrupt,
            ProtoServerErrorCode::DiskUnavailable => ServerErrorCode::DiskUnavailable,
            ProtoServerErrorCode::PartitionUnknown => ServerErrorCode::PartitionUnknown,
            ProtoServerErrorCode::PartitionReadOnly => ServerErrorCode::PartitionReadOnly,
            ProtoServerErrorCode::ReplicaUnavailable => ServerErrorCode::ReplicaUnavailable,
            ProtoServerErrorCode::BlobAlreadyExists => ServerErrorCode::BlobAlreadyExists,
            ProtoServerErrorCode::UnknownError => ServerErrorCode::UnknownError,
        }
    }
}

impl From<ServerErrorCode> for ProtoServerErrorCode {
    fn from(code: ServerErrorCode) -> Self {
        match code {
            ServerErrorCode::NoError => ProtoServerErrorCode::NoError,
            ServerErrorCode::IoError => ProtoServerErrorCode::IoError,
            ServerErrorCode::BlobNotFound => ProtoServerErrorCode::BlobNotFound,
            ServerErrorCode::BlobDeleted => ProtoServerErrorCode::BlobDeleted,
            ServerErrorCode::BlobExpired => ProtoServerErrorCode::BlobExpired,
            ServerErrorCode::DataCorrupt => ProtoServerErrorCode::DataCorrupt,
            ServerErrorCode::DiskUnavailable => ProtoServerErrorCode::DiskUnavailable,
            ServerErrorCode::PartitionUnknown => ProtoServerErrorCode::PartitionUnknown,
            ServerErrorCode::PartitionReadOnly => ProtoServerErrorCode::PartitionReadOnly,
            ServerErrorCode::ReplicaUnavailable => ProtoServerErrorCode::ReplicaUnavailable,
            ServerErrorCode::BlobAlreadyExists => ProtoServerErrorCode::BlobAlreadyExists,
            ServerErrorCode::UnknownError => ProtoServerErrorCode::UnknownError,
        }
    }
}
