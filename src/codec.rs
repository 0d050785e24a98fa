use crate::error::HubError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Encodes a collection as a pretty-printed JSON array. The formatting is a
/// nicety for operators editing the files by hand; only the round-trip with
/// [`decode_collection`] is contractual.
pub fn encode_collection<R: Serialize>(records: &[R]) -> Result<Vec<u8>, HubError> {
    serde_json::to_vec_pretty(records).map_err(|e| HubError::Encode(e.to_string()))
}

/// Decodes a collection from its durable byte form. Empty or whitespace-only
/// input is an empty collection, so a freshly created or truncated backing
/// file never fails the caller.
pub fn decode_collection<R: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<R>, HubError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(bytes).map_err(|e| HubError::Decode(e.to_string()))
}
