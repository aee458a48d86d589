//! Request construction per wire format

use super::{EndpointDescriptor, ProtocolVariant};
use serde_json::{json, Map, Value};

/// Fixed conversation id expected by the generic endpoints' prompt processor.
pub const CONVERSATION_ID: &str = "sambaverse-conversation-id";

/// A fully-built HTTP request, ready for the transport. Never reused across calls.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: String,
    /// Header pairs. May contain credentials: do not log.
    pub headers: Vec<(String, String)>,
    pub body: Value,
    pub stream: bool,
}

impl OutboundRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Build the payload and headers for one call.
///
/// `mapped` must come from [`super::map_params`] for the same variant.
pub fn build_request(
    endpoint: &EndpointDescriptor,
    mapped: Map<String, Value>,
    prompt: &str,
    stream: bool,
    api_key: &str,
    include_usage: bool,
) -> crate::Result<OutboundRequest> {
    let mut params = mapped;
    params.retain(|_, v| !v.is_null());

    let (body, headers) = match endpoint.variant {
        ProtocolVariant::OpenAiCompatible => {
            let mut body = Map::new();
            body.insert(
                "messages".into(),
                json!([{ "role": "user", "content": prompt }]),
            );
            body.insert("stream".into(), Value::Bool(stream));
            body.extend(params);
            (Value::Object(body), bearer_headers(api_key))
        }
        ProtocolVariant::GenericV2 => {
            let process = params
                .get("process_prompt")
                .map(is_truthy)
                .unwrap_or(false);
            let prompt = if process {
                conversation_prompt(prompt)?
            } else {
                prompt.to_string()
            };
            let body = json!({
                "items": [{ "id": "item0", "value": prompt }],
                "params": params,
            });
            (body, key_headers(api_key))
        }
        ProtocolVariant::GenericV1 => {
            let process = params
                .get("process_prompt")
                .and_then(|p| p.get("value"))
                .and_then(Value::as_str)
                == Some("True");
            let prompt = if process {
                conversation_prompt(prompt)?
            } else {
                prompt.to_string()
            };
            let body = if stream {
                json!({ "instance": prompt, "params": params })
            } else {
                json!({ "instances": [prompt], "params": params })
            };
            (body, key_headers(api_key))
        }
        ProtocolVariant::Cloud => {
            let messages = match serde_json::from_str::<Value>(prompt) {
                Ok(list @ Value::Array(_)) => list,
                _ => json!([{ "role": "user", "content": prompt }]),
            };
            let mut body = Map::new();
            body.insert("messages".into(), messages);
            body.extend(params);
            body.insert("stream".into(), Value::Bool(true));
            if include_usage {
                body.insert("stream_options".into(), json!({ "include_usage": true }));
            }
            (Value::Object(body), bearer_headers(api_key))
        }
    };

    let stream = stream || endpoint.variant == ProtocolVariant::Cloud;
    Ok(OutboundRequest {
        url: endpoint.url_for(stream).to_string(),
        headers,
        body,
        stream,
    })
}

/// Serialize the prompt as a single-message conversation envelope.
pub fn conversation_prompt(prompt: &str) -> crate::Result<String> {
    let conversation = json!({
        "conversation_id": CONVERSATION_ID,
        "messages": [{ "message_id": null, "role": "user", "content": prompt }],
    });
    Ok(serde_json::to_string(&conversation)?)
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn bearer_headers(api_key: &str) -> Vec<(String, String)> {
    vec![
        ("Authorization".into(), format!("Bearer {}", api_key)),
        ("Content-Type".into(), "application/json".into()),
    ]
}

fn key_headers(api_key: &str) -> Vec<(String, String)> {
    vec![("key".into(), api_key.to_string())]
}
