use crate::api::BlobProperties;
use crate::clustermap::BlobId;
use crate::operation::OperationType;
use crate::proto::{
    proto_request, ProtoDeleteReq, ProtoDeleteResp, ProtoGetReq, ProtoGetResp, ProtoPutReq, ProtoPutResp,
    ProtoRequest,
};
use crate::wire::ServerErrorCode;
use bytes::{Bytes, BytesMut};
use prost::{DecodeError, EncodeError, Message};

/// StoreRequest is one fully built request, ready to be framed and sent to a single replica.
#[derive(Clone, Debug)]
pub(crate) enum StoreRequest {
    Delete(ProtoDeleteReq),
    Get(ProtoGetReq),
    Put(ProtoPutReq),
}

impl StoreRequest {
    pub(crate) fn delete(correlation_id: u64, client_id: &str, blob_id: &BlobId) -> Self {
        StoreRequest::Delete(ProtoDeleteReq {
            correlation_id,
            client_id: client_id.to_string(),
            blob_id: blob_id.to_string(),
        })
    }

    pub(crate) fn get(correlation_id: u64, client_id: &str, blob_id: &BlobId) -> Self {
        StoreRequest::Get(ProtoGetReq {
            correlation_id,
            client_id: client_id.to_string(),
            blob_id: blob_id.to_string(),
        })
    }

    pub(crate) fn put(
        correlation_id: u64,
        client_id: &str,
        blob_id: &BlobId,
        properties: &BlobProperties,
        user_metadata: &Bytes,
        data: &Bytes,
    ) -> Self {
        StoreRequest::Put(ProtoPutReq {
            correlation_id,
            client_id: client_id.to_string(),
            blob_id: blob_id.to_string(),
            properties: Some(properties.into()),
            user_metadata: user_metadata.to_vec(),
            data: data.to_vec(),
        })
    }

    pub(crate) fn operation_type(&self) -> OperationType {
        match self {
            StoreRequest::Delete(_) => OperationType::Delete,
            StoreRequest::Get(_) => OperationType::Get,
            StoreRequest::Put(_) => OperationType::Put,
        }
    }

    /// `encode()` wraps the request in the envelope that data nodes expect in every frame.
    pub(crate) fn encode(&self) -> Result<Bytes, EncodeError> {
        let request = match self {
            StoreRequest::Delete(r) => proto_request::Request::Delete(r.clone()),
            StoreRequest::Get(r) => proto_request::Request::Get(r.clone()),
            StoreRequest::Put(r) => proto_request::Request::Put(r.clone()),
        };
        let envelope = ProtoRequest { request: Some(request) };

        let mut buf = BytesMut::with_capacity(envelope.encoded_len());
        envelope.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// `read_response()` decodes a response frame as the response type that matches this request.
    pub(crate) fn read_response(&self, frame: Bytes) -> Result<StoreResponse, DecodeError> {
        match self {
            StoreRequest::Delete(_) => {
                let proto = ProtoDeleteResp::decode(frame)?;
                Ok(StoreResponse::Delete(DeleteResponse {
                    correlation_id: proto.correlation_id,
                    error_code: ServerErrorCode::from_wire(proto.error_code),
                }))
            }
            StoreRequest::Get(_) => {
                let proto = ProtoGetResp::decode(frame)?;
                Ok(StoreResponse::Get(GetResponse {
                    correlation_id: proto.correlation_id,
                    error_code: ServerErrorCode::from_wire(proto.error_code),
                    properties: proto.properties.map(BlobProperties::from),
                    user_metadata: Bytes::from(proto.user_metadata),
                    data: Bytes::from(proto.data),
                }))
            }
            StoreRequest::Put(_) => {
                let proto = ProtoPutResp::decode(frame)?;
                Ok(StoreResponse::Put(PutResponse {
                    correlation_id: proto.correlation_id,
                    error_code: ServerErrorCode::from_wire(proto.error_code),
                }))
            }
        }
    }
}

#[derive(Debug)]
pub(crate) enum StoreResponse {
    Delete(DeleteResponse),
    Get(GetResponse),
    Put(PutResponse),
}

impl StoreResponse {
    pub(crate) fn error_code(&self) -> ServerErrorCode {
        match self {
            StoreResponse::Delete(r) => r.error_code,
            StoreResponse::Get(r) => r.error_code,
            StoreResponse::Put(r) => r.error_code,
        }
    }

    pub(crate) fn correlation_id(&self) -> u64 {
        match self {
            StoreResponse::Delete(r) => r.correlation_id,
            StoreResponse::Get(r) => r.correlation_id,
            StoreResponse::Put(r) => r.correlation_id,
        }
    }
}

#[derive(Debug)]
pub(crate) struct DeleteResponse {
    pub(crate) correlation_id: u64,
    pub(crate) error_code: ServerErrorCode,
}

#[derive(Debug)]
pub(crate) struct GetResponse {
    pub(crate) correlation_id: u64,
    pub(crate) error_code: ServerErrorCode,
    pub(crate) properties: Option<BlobProperties>,
    pub(crate) user_metadata: Bytes,
    pub(crate) data: Bytes,
}

#[derive(Debug)]
pub(crate) struct PutResponse {
    pub(crate) correlation_id: u64,
    pub(crate) error_code: ServerErrorCode,
}
