//! Buffered response extraction

use super::ProtocolVariant;
use crate::{Error, Result};
use serde_json::Value;

fn completion_pointer(variant: ProtocolVariant) -> Option<&'static str> {
    match variant {
        ProtocolVariant::OpenAiCompatible => Some("/choices/0/message/content"),
        ProtocolVariant::GenericV2 => Some("/items/0/value/completion"),
        ProtocolVariant::GenericV1 => Some("/predictions/0/completion"),
        ProtocolVariant::Cloud => None,
    }
}

/// Extract the completion text from a non-streaming response body.
pub fn decode_response(variant: ProtocolVariant, body: &str) -> Result<String> {
    let pointer = completion_pointer(variant).ok_or_else(|| {
        Error::unsupported_endpoint(variant.as_str(), "no buffered response mode")
    })?;

    let json: Value = serde_json::from_str(body)
        .map_err(|e| Error::malformed_response(format!("invalid JSON: {}", e), body))?;

    json.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::malformed_response(format!("missing string at {}", pointer), body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_each_variant_path() {
        let cases = [
            (
                ProtocolVariant::OpenAiCompatible,
                r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#,
            ),
            (
                ProtocolVariant::GenericV2,
                r#"{"items":[{"id":"item0","value":{"completion":"hi"}}]}"#,
            ),
            (
                ProtocolVariant::GenericV1,
                r#"{"predictions":[{"completion":"hi","stop_reason":"end_of_text"}]}"#,
            ),
        ];
        for (variant, body) in cases {
            assert_eq!(decode_response(variant, body).unwrap(), "hi", "{variant}");
        }
    }

    #[test]
    fn missing_path_keeps_raw_body() {
        let body = r#"{"predictions":[]}"#;
        match decode_response(ProtocolVariant::GenericV1, body) {
            Err(Error::MalformedResponse { body: raw, .. }) => assert_eq!(raw, body),
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(
            decode_response(ProtocolVariant::GenericV2, "<html>bad gateway</html>"),
            Err(Error::MalformedResponse { .. })
        ));
    }

    #[test]
    fn cloud_has_no_buffered_mode() {
        assert!(matches!(
            decode_response(ProtocolVariant::Cloud, "{}"),
            Err(Error::UnsupportedEndpoint { .. })
        ));
    }
}
