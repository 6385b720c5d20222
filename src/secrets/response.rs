//! Response envelope validation.
//!
//! Checks run strictly in order: HTTP status, JSON syntax, `data`, then the
//! operation-specific members. The read and write envelopes differ and both
//! shapes are kept as Vault sends them:
//!
//! ```text
//! read:  {"data": {"metadata": {"version": N}, "data": {"value": "..."}}}
//! write: {"data": {"version": N}}
//! ```

use serde_json::{Map, Value};

use super::request::Operation;
use super::transport::RawResponse;
use super::types::SecretString;
use crate::errors::{FormatFault, Result, VaultError};

/// Validated read envelope.
#[derive(Debug)]
pub struct ReadEnvelope {
    /// `data.metadata`, carrying the version
    pub metadata: Map<String, Value>,
    /// `data.data.value`
    pub value: SecretString,
}

/// Validated write envelope.
#[derive(Debug)]
pub struct WriteEnvelope {
    /// Top-level `data`, carrying the version directly
    pub data: Map<String, Value>,
}

fn is_success(status: u16) -> bool {
    status / 100 == 2
}

/// Reject non-2xx statuses. A read answered with 404 yields `Ok(false)`.
fn check_status(operation: Operation, status: u16) -> Result<bool> {
    if operation == Operation::Read && status == 404 {
        return Ok(false);
    }
    if !is_success(status) {
        return Err(VaultError::remote(status));
    }
    Ok(true)
}

/// Parse the body and return the top-level `data` object.
fn data_object(body: &[u8]) -> Result<Map<String, Value>> {
    let document: Value =
        serde_json::from_slice(body).map_err(|_| VaultError::format(FormatFault::MalformedBody))?;

    match document {
        Value::Object(mut root) => match root.remove("data") {
            Some(Value::Object(data)) => Ok(data),
            _ => Err(VaultError::format(FormatFault::MissingData)),
        },
        _ => Err(VaultError::format(FormatFault::MissingData)),
    }
}

/// Validate a read response. `Ok(None)` means the secret does not exist.
pub fn validate_read(response: &RawResponse) -> Result<Option<ReadEnvelope>> {
    if !check_status(Operation::Read, response.status)? {
        return Ok(None);
    }

    let mut data = data_object(&response.body)?;

    let metadata = match data.remove("metadata") {
        Some(Value::Object(metadata)) => metadata,
        _ => return Err(VaultError::format(FormatFault::MissingMetadata)),
    };

    let value = match data.remove("data") {
        Some(Value::Object(mut inner)) => match inner.remove("value") {
            Some(Value::String(value)) => SecretString::new(value),
            _ => return Err(VaultError::format(FormatFault::MissingValue)),
        },
        _ => return Err(VaultError::format(FormatFault::MissingValue)),
    };

    Ok(Some(ReadEnvelope { metadata, value }))
}

/// Validate a write response. There is no not-found case for writes.
pub fn validate_write(response: &RawResponse) -> Result<WriteEnvelope> {
    check_status(Operation::Write, response.status)?;
    let data = data_object(&response.body)?;
    Ok(WriteEnvelope { data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use serde_json::json;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse { status, body: Bytes::from(body.to_owned()) }
    }

    fn json_raw(status: u16, body: Value) -> RawResponse {
        raw(status, &body.to_string())
    }

    fn format_fault<T: std::fmt::Debug>(result: Result<T>) -> FormatFault {
        match result {
            Err(VaultError::ResponseFormat { reason }) => reason,
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_read_envelope() {
        let response = json_raw(
            200,
            json!({ "data": { "metadata": { "version": 3 }, "data": { "value": "k3y" } } }),
        );

        let envelope = validate_read(&response).unwrap().unwrap();
        assert_eq!(envelope.value.expose_secret(), "k3y");
        assert_eq!(envelope.metadata["version"], 3);
    }

    #[test]
    fn test_read_404_is_not_found_regardless_of_body() {
        assert!(validate_read(&raw(404, "")).unwrap().is_none());
        assert!(validate_read(&raw(404, "{\"errors\":[]}")).unwrap().is_none());
        assert!(validate_read(&raw(404, "<html>")).unwrap().is_none());
    }

    #[test]
    fn test_non_success_statuses_are_remote_errors() {
        for status in [301, 400, 403, 429, 500, 503] {
            let err = validate_read(&raw(status, "{}")).unwrap_err();
            assert!(matches!(err, VaultError::Remote { status: s } if s == status));
        }

        for status in [404, 400, 500] {
            let err = validate_write(&raw(status, "{}")).unwrap_err();
            assert!(matches!(err, VaultError::Remote { status: s } if s == status));
        }
    }

    #[test]
    fn test_any_2xx_is_accepted() {
        let response = json_raw(204, json!({ "data": { "version": 1 } }));
        assert!(validate_write(&response).is_ok());
    }

    #[test]
    fn test_malformed_body() {
        assert_eq!(format_fault(validate_read(&raw(200, "not json"))), FormatFault::MalformedBody);
        assert_eq!(format_fault(validate_write(&raw(200, ""))), FormatFault::MalformedBody);
    }

    #[test]
    fn test_missing_or_non_object_data() {
        for body in [json!({}), json!({ "data": "x" }), json!({ "data": null }), json!([1, 2])] {
            let read = validate_read(&json_raw(200, body.clone()));
            assert_eq!(format_fault(read), FormatFault::MissingData);

            let write = validate_write(&json_raw(200, body));
            assert_eq!(format_fault(write), FormatFault::MissingData);
        }
    }

    #[test]
    fn test_missing_metadata_on_read() {
        let response = json_raw(200, json!({ "data": { "data": { "value": "k3y" } } }));
        assert_eq!(format_fault(validate_read(&response)), FormatFault::MissingMetadata);

        let response =
            json_raw(200, json!({ "data": { "metadata": 3, "data": { "value": "k3y" } } }));
        assert_eq!(format_fault(validate_read(&response)), FormatFault::MissingMetadata);
    }

    #[test]
    fn test_missing_or_invalid_value_on_read() {
        for inner in [json!(null), json!("k3y"), json!({}), json!({ "value": 42 })] {
            let response =
                json_raw(200, json!({ "data": { "metadata": { "version": 1 }, "data": inner } }));
            assert_eq!(format_fault(validate_read(&response)), FormatFault::MissingValue);
        }
    }

    #[test]
    fn test_write_envelope_keeps_version_at_top_level_data() {
        let response = json_raw(200, json!({ "data": { "version": 7, "created_time": "now" } }));
        let envelope = validate_write(&response).unwrap();
        assert_eq!(envelope.data["version"], 7);
    }

    #[test]
    fn test_write_envelope_does_not_look_inside_metadata() {
        let response = json_raw(200, json!({ "data": { "metadata": { "version": 7 } } }));
        let envelope = validate_write(&response).unwrap();
        assert!(envelope.data.get("version").is_none());
    }
}
