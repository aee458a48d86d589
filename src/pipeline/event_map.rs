//! Frame -> delta mapping per wire format

use crate::protocol::ProtocolVariant;
use crate::types::{StreamEvent, TextDelta};
use crate::{Error, Result};
use serde_json::Value;
use tracing::debug;

/// End-of-stream sentinel sent by SSE-based endpoints.
pub const DONE_SENTINEL: &str = "[DONE]";

/// What a single frame contributes to the delta sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Delta(TextDelta),
    /// Informational frame (usage stats, finish marker): nothing to emit.
    Skip,
    /// Explicit end of stream.
    Done,
}

/// Map one server-sent event (OpenAI-compatible and cloud variants).
pub fn map_event(variant: ProtocolVariant, event: &StreamEvent, status: u16) -> Result<Step> {
    if event.is_error() {
        return Err(Error::stream_protocol(status, "error event", &event.data));
    }
    if event.data.trim() == DONE_SENTINEL {
        return Ok(Step::Done);
    }

    let data: Value = serde_json::from_str(&event.data).map_err(|e| {
        Error::stream_protocol(status, format!("invalid event payload: {}", e), &event.data)
    })?;

    if data.get("error").map(is_set).unwrap_or(false) {
        return Err(Error::stream_protocol(status, "error payload", &event.data));
    }

    match variant {
        ProtocolVariant::Cloud => {
            // Any non-null usage marks the final statistics event, even an empty one.
            if data.get("usage").map(|u| !u.is_null()).unwrap_or(false) {
                debug!(payload = %event.data, "usage event");
                return Ok(Step::Skip);
            }
            let choice = data.pointer("/choices/0").ok_or_else(|| {
                Error::stream_protocol(status, "event has no choices", &event.data)
            })?;
            if choice.get("finish_reason").map(is_set).unwrap_or(false) {
                return Ok(Step::Skip);
            }
            Ok(Step::Delta(TextDelta::new(delta_content(choice))))
        }
        ProtocolVariant::OpenAiCompatible => {
            let choices = data
                .get("choices")
                .and_then(Value::as_array)
                .ok_or_else(|| Error::stream_protocol(status, "event has no choices", &event.data))?;
            let text = choices.first().map(delta_content).unwrap_or_default();
            Ok(Step::Delta(TextDelta::new(text)))
        }
        ProtocolVariant::GenericV1 | ProtocolVariant::GenericV2 => Err(Error::stream_protocol(
            status,
            format!("{} endpoints do not stream server-sent events", variant),
            &event.data,
        )),
    }
}

/// Map one NDJSON line (generic v1 and v2 variants).
pub fn map_line(variant: ProtocolVariant, line: &str, status: u16) -> Result<Step> {
    let pointer = match variant {
        ProtocolVariant::GenericV2 => "/result/items/0/value/stream_token",
        ProtocolVariant::GenericV1 => "/result/responses/0/stream_token",
        ProtocolVariant::OpenAiCompatible | ProtocolVariant::Cloud => {
            return Err(Error::stream_protocol(
                status,
                format!("{} endpoints do not stream JSON lines", variant),
                line,
            ))
        }
    };

    let data: Value = serde_json::from_str(line)
        .map_err(|e| Error::stream_protocol(status, format!("invalid line: {}", e), line))?;

    data.pointer(pointer)
        .and_then(Value::as_str)
        .map(|token| Step::Delta(TextDelta::new(token)))
        .ok_or_else(|| Error::stream_protocol(status, format!("missing {}", pointer), line))
}

fn delta_content(choice: &Value) -> String {
    choice
        .pointer("/delta/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn is_set(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(payload: &str) -> StreamEvent {
        StreamEvent {
            event: None,
            data: payload.to_string(),
        }
    }

    #[test]
    fn done_sentinel_ends_stream() {
        let step = map_event(ProtocolVariant::Cloud, &data("[DONE]"), 200).unwrap();
        assert_eq!(step, Step::Done);
    }

    #[test]
    fn cloud_skips_usage_and_finish_events() {
        let usage = data(r#"{"choices":[{"delta":{},"finish_reason":"stop"}],"usage":{"total_tokens":9}}"#);
        assert_eq!(map_event(ProtocolVariant::Cloud, &usage, 200).unwrap(), Step::Skip);

        let finish = data(r#"{"choices":[{"delta":{"content":"tail"},"finish_reason":"stop"}]}"#);
        assert_eq!(map_event(ProtocolVariant::Cloud, &finish, 200).unwrap(), Step::Skip);
    }

    #[test]
    fn cloud_empty_usage_event_is_skipped() {
        let event = data(r#"{"choices":[],"usage":{}}"#);
        assert_eq!(map_event(ProtocolVariant::Cloud, &event, 200).unwrap(), Step::Skip);
    }

    #[test]
    fn cloud_null_usage_still_emits() {
        let event = data(r#"{"choices":[{"delta":{"content":"x"},"finish_reason":null}],"usage":null}"#);
        assert_eq!(
            map_event(ProtocolVariant::Cloud, &event, 200).unwrap(),
            Step::Delta(TextDelta::new("x"))
        );
    }

    #[test]
    fn openai_empty_choices_emit_empty_delta() {
        let event = data(r#"{"choices":[],"usage":{"total_tokens":3}}"#);
        assert_eq!(
            map_event(ProtocolVariant::OpenAiCompatible, &event, 200).unwrap(),
            Step::Delta(TextDelta::default())
        );
    }

    #[test]
    fn error_event_kind_fails() {
        let event = StreamEvent {
            event: Some("error".into()),
            data: r#"{"error_event":"rate limited"}"#.into(),
        };
        match map_event(ProtocolVariant::Cloud, &event, 200) {
            Err(Error::StreamProtocol { status, payload, .. }) => {
                assert_eq!(status, 200);
                assert!(payload.contains("rate limited"));
            }
            other => panic!("expected StreamProtocol, got {other:?}"),
        }
    }

    #[test]
    fn top_level_error_field_fails() {
        let event = data(r#"{"error":{"message":"overloaded"}}"#);
        assert!(map_event(ProtocolVariant::OpenAiCompatible, &event, 200).is_err());
    }

    #[test]
    fn generic_lines_use_their_own_paths() {
        let v2 = r#"{"result":{"items":[{"value":{"stream_token":"A"}}]}}"#;
        let v1 = r#"{"result":{"responses":[{"stream_token":"B"}]}}"#;
        assert_eq!(
            map_line(ProtocolVariant::GenericV2, v2, 200).unwrap(),
            Step::Delta(TextDelta::new("A"))
        );
        assert_eq!(
            map_line(ProtocolVariant::GenericV1, v1, 200).unwrap(),
            Step::Delta(TextDelta::new("B"))
        );
        assert!(map_line(ProtocolVariant::GenericV1, v2, 200).is_err());
    }

    #[test]
    fn unparsable_line_carries_the_line() {
        match map_line(ProtocolVariant::GenericV2, "not json", 200) {
            Err(Error::StreamProtocol { payload, .. }) => assert_eq!(payload, "not json"),
            other => panic!("expected StreamProtocol, got {other:?}"),
        }
    }
}
