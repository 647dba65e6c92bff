//! Encoding and decoding of REST bodies.

use serde::{Serialize, de::DeserializeOwned};

use crate::MAX_BODY_SIZE;
use crate::error::{ProtocolError, ProtocolResult};
use crate::types::ApiErrorResponse;

/// Encodes a value as a JSON request body.
///
/// # Errors
///
/// Returns an error if serialization fails or the body exceeds
/// [`MAX_BODY_SIZE`].
pub fn encode_body<T: Serialize + ?Sized>(value: &T) -> ProtocolResult<Vec<u8>> {
    let body = serde_json::to_vec(value)?;
    check_size(body.len())?;
    Ok(body)
}

/// Decodes a JSON response body.
///
/// # Errors
///
/// Returns an error if the body is empty, too large, or not valid JSON for
/// `T`.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> ProtocolResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ProtocolError::EmptyBody);
    }
    check_size(body.len())?;
    Ok(serde_json::from_slice(body)?)
}

/// Reads the backend's error body, if the response carries one.
pub fn decode_error_body(body: &[u8]) -> Option<ApiErrorResponse> {
    serde_json::from_slice::<ApiErrorResponse>(body)
        .ok()
        .filter(|e| !e.message.is_empty())
}

fn check_size(size: usize) -> ProtocolResult<()> {
    if size > MAX_BODY_SIZE {
        return Err(ProtocolError::BodyTooLarge {
            size,
            max: MAX_BODY_SIZE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProgressUpdate, TodoDto};

    #[test]
    fn encode_decode() {
        let body = encode_body(&ProgressUpdate { progress: 30 }).unwrap();
        let decoded: ProgressUpdate = decode_body(&body).unwrap();
        assert_eq!(decoded.progress, 30);
    }

    #[test]
    fn empty_body_is_an_error() {
        let err = decode_body::<Vec<TodoDto>>(b"  \n").unwrap_err();
        assert!(matches!(err, ProtocolError::EmptyBody));
    }

    #[test]
    fn oversized_body_is_rejected() {
        let big = vec![b' '; MAX_BODY_SIZE];
        let mut body = b"[]".to_vec();
        body.extend_from_slice(&big);
        let err = decode_body::<Vec<TodoDto>>(&body).unwrap_err();
        assert!(matches!(err, ProtocolError::BodyTooLarge { .. }));
    }

    #[test]
    fn malformed_json() {
        let err = decode_body::<Vec<TodoDto>>(b"{not json").unwrap_err();
        assert!(matches!(err, ProtocolError::Serialization(_)));
    }

    #[test]
    fn error_body_detection() {
        let body = br#"{"statusCode":404,"message":"Todo not found","path":"/api/todos/9"}"#;
        let parsed = decode_error_body(body).unwrap();
        assert_eq!(parsed.status_code, 404);
        assert_eq!(parsed.message, "Todo not found");

        assert!(decode_error_body(b"<html>Bad Gateway</html>").is_none());
        assert!(decode_error_body(b"{}").is_none());
    }
}
