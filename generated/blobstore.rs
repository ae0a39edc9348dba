/// Every frame a coordinator sends to a data node is one ProtoRequest. The data node replies with the
/// response message matching the request type.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRequest {
    #[prost(oneof="proto_request::Request", tags="1, 2, 3")]
    pub request: ::core::option::Option<proto_request::Request>,
}
/// Nested message and enum types in `ProtoRequest`.
pub mod proto_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Request {
        #[prost(message, tag="1")]
        Delete(super::ProtoDeleteReq),
        #[prost(message, tag="2")]
        Get(super::ProtoGetReq),
        #[prost(message, tag="3")]
        Put(super::ProtoPutReq),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoBlobProperties {
    #[prost(uint64, tag="1")]
    pub blob_size: u64,
    #[prost(string, tag="2")]
    pub service_id: ::prost::alloc::string::String,
    #[prost(string, tag="3")]
    pub owner_id: ::prost::alloc::string::String,
    #[prost(string, tag="4")]
    pub content_type: ::prost::alloc::string::String,
    /// 0 means the blob never expires.
    #[prost(uint64, tag="5")]
    pub time_to_live_secs: u64,
    #[prost(uint64, tag="6")]
    pub creation_time_ms: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoDeleteReq {
    #[prost(uint64, tag="1")]
    pub correlation_id: u64,
    #[prost(string, tag="2")]
    pub client_id: ::prost::alloc::string::String,
    #[prost(string, tag="3")]
    pub blob_id: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoDeleteResp {
    #[prost(uint64, tag="1")]
    pub correlation_id: u64,
    #[prost(enumeration="ProtoServerErrorCode", tag="2")]
    pub error_code: i32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetReq {
    #[prost(uint64, tag="1")]
    pub correlation_id: u64,
    #[prost(string, tag="2")]
    pub client_id: ::prost::alloc::string::String,
    #[prost(string, tag="3")]
    pub blob_id: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetResp {
    #[prost(uint64, tag="1")]
    pub correlation_id: u64,
    #[prost(enumeration="ProtoServerErrorCode", tag="2")]
    pub error_code: i32,
    #[prost(message, optional, tag="3")]
    pub properties: ::core::option::Option<ProtoBlobProperties>,
    #[prost(bytes="vec", tag="4")]
    pub user_metadata: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes="vec", tag="5")]
    pub data: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoPutReq {
    #[prost(uint64, tag="1")]
    pub correlation_id: u64,
    #[prost(string, tag="2")]
    pub client_id: ::prost::alloc::string::String,
    #[prost(string, tag="3")]
    pub blob_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag="4")]
    pub properties: ::core::option::Option<ProtoBlobProperties>,
    #[prost(bytes="vec", tag="5")]
    pub user_metadata: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes="vec", tag="6")]
    pub data: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoPutResp {
    #[prost(uint64, tag="1")]
    pub correlation_id: u64,
    #[prost(enumeration="ProtoServerErrorCode", tag="2")]
    pub error_code: i32,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ProtoServerErrorCode {
    NoError = 0,
    IoError = 1,
    BlobNotFound = 2,
    BlobDeleted = 3,
    BlobExpired = 4,
    DataCorrupt = 5,
    DiskUnavailable = 6,
    PartitionUnknown = 7,
    PartitionReadOnly = 8,
    ReplicaUnavailable = 9,
    BlobAlreadyExists = 10,
    UnknownError = 11,
}
