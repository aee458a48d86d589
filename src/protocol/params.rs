//! Parameter mapping: uniform parameters -> per-variant wire fields

use super::ProtocolVariant;
use crate::types::CompletionParameters;
use crate::{Error, Result};
use serde_json::{Map, Number, Value};

/// Wire names for the fields that are renamed between variants.
struct FieldNames {
    model: &'static str,
    max_tokens: &'static str,
    stop: &'static str,
}

fn field_names(variant: ProtocolVariant) -> FieldNames {
    match variant {
        ProtocolVariant::OpenAiCompatible => FieldNames {
            model: "model",
            max_tokens: "max_tokens",
            stop: "stop_sequences",
        },
        ProtocolVariant::GenericV1 | ProtocolVariant::GenericV2 => FieldNames {
            model: "select_expert",
            max_tokens: "max_tokens_to_generate",
            stop: "stop_sequences",
        },
        ProtocolVariant::Cloud => FieldNames {
            model: "model",
            max_tokens: "max_tokens",
            stop: "stop",
        },
    }
}

/// Translate `params` (plus call-time stop sequences) into the field names and
/// value shapes required by `variant`.
///
/// Null values are never emitted, and an empty stop list is omitted entirely.
pub fn map_params(
    variant: ProtocolVariant,
    params: &CompletionParameters,
    call_stop: &[String],
) -> Result<Map<String, Value>> {
    let names = field_names(variant);
    let mut out = Map::new();

    // Extras go first so typed fields win on collision.
    for (key, value) in &params.extra {
        let key = match key.as_str() {
            "model" | "select_expert" => names.model,
            "max_tokens" | "max_tokens_to_generate" => names.max_tokens,
            other => other,
        };
        out.insert(key.to_string(), value.clone());
    }

    if let Some(model) = &params.model {
        out.insert(names.model.into(), Value::String(model.clone()));
    }
    if let Some(max_tokens) = params.max_tokens {
        out.insert(names.max_tokens.into(), Value::from(max_tokens));
    }
    if let Some(temperature) = params.temperature {
        out.insert("temperature".into(), float_value("temperature", temperature)?);
    }
    if let Some(top_p) = params.top_p {
        out.insert("top_p".into(), float_value("top_p", top_p)?);
    }
    if let Some(top_k) = params.top_k {
        out.insert("top_k".into(), Value::from(top_k));
    }
    if let Some(do_sample) = params.do_sample {
        out.insert("do_sample".into(), Value::Bool(do_sample));
    }
    if let Some(process_prompt) = params.process_prompt {
        out.insert("process_prompt".into(), Value::Bool(process_prompt));
    }

    let stop = params.merged_stop(call_stop);
    if !stop.is_empty() {
        out.insert(
            names.stop.into(),
            Value::Array(stop.into_iter().map(Value::String).collect()),
        );
    }

    if matches!(
        variant,
        ProtocolVariant::OpenAiCompatible | ProtocolVariant::Cloud
    ) {
        out.remove("process_prompt");
    }

    out.retain(|_, v| !v.is_null());

    if variant == ProtocolVariant::GenericV1 {
        return out
            .into_iter()
            .map(|(k, v)| {
                let wrapped = envelope(&k, &v)?;
                Ok((k, wrapped))
            })
            .collect();
    }

    Ok(out)
}

fn float_value(name: &str, value: f64) -> Result<Value> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| Error::unsupported_parameter(name, "value is not a finite number"))
}

/// Wrap a value in the generic v1 `{type, value}` string envelope.
///
/// Type names follow the server's expectations (`bool`, `int`, `float`, `str`).
/// Structured values have no defined string form and are rejected.
pub fn envelope(name: &str, value: &Value) -> Result<Value> {
    let (ty, repr) = match value {
        Value::Bool(b) => ("bool", if *b { "True" } else { "False" }.to_string()),
        Value::Number(n) if n.is_i64() || n.is_u64() => ("int", n.to_string()),
        Value::Number(n) => {
            let f = n
                .as_f64()
                .ok_or_else(|| Error::unsupported_parameter(name, "unrepresentable number"))?;
            ("float", float_repr(f))
        }
        Value::String(s) => ("str", s.clone()),
        Value::Array(_) | Value::Object(_) => {
            return Err(Error::unsupported_parameter(
                name,
                "structured values cannot be sent to generic v1 endpoints",
            ))
        }
        Value::Null => {
            return Err(Error::unsupported_parameter(name, "null value"));
        }
    };
    Ok(serde_json::json!({ "type": ty, "value": repr }))
}

// Floats always carry a decimal point so the server parses them back as floats.
fn float_repr(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_params() -> CompletionParameters {
        CompletionParameters::new()
            .with_model("Meta-Llama-3-8B-Instruct")
            .with_max_tokens(128)
            .with_temperature(0.7)
            .with_top_p(1.0)
            .with_top_k(50)
            .with_process_prompt(true)
            .with_do_sample(false)
    }

    #[test]
    fn openai_uses_model_and_drops_process_prompt() {
        let mapped = map_params(ProtocolVariant::OpenAiCompatible, &full_params(), &[]).unwrap();
        assert_eq!(mapped["model"], "Meta-Llama-3-8B-Instruct");
        assert_eq!(mapped["max_tokens"], 128);
        assert!(!mapped.contains_key("process_prompt"));
        assert!(!mapped.contains_key("select_expert"));
        assert!(!mapped.contains_key("stop_sequences"));
    }

    #[test]
    fn generic_v2_renames_fields() {
        let mapped = map_params(ProtocolVariant::GenericV2, &full_params(), &[]).unwrap();
        assert_eq!(mapped["select_expert"], "Meta-Llama-3-8B-Instruct");
        assert_eq!(mapped["max_tokens_to_generate"], 128);
        assert_eq!(mapped["process_prompt"], true);
        assert!(!mapped.contains_key("model"));
        assert!(!mapped.contains_key("max_tokens"));
    }

    #[test]
    fn generic_v1_envelopes_every_value() {
        let mapped = map_params(ProtocolVariant::GenericV1, &full_params(), &[]).unwrap();
        assert_eq!(mapped["process_prompt"], json!({"type": "bool", "value": "True"}));
        assert_eq!(mapped["do_sample"], json!({"type": "bool", "value": "False"}));
        assert_eq!(mapped["max_tokens_to_generate"], json!({"type": "int", "value": "128"}));
        assert_eq!(mapped["top_p"], json!({"type": "float", "value": "1.0"}));
        assert_eq!(mapped["temperature"], json!({"type": "float", "value": "0.7"}));
        assert_eq!(
            mapped["select_expert"],
            json!({"type": "str", "value": "Meta-Llama-3-8B-Instruct"})
        );
        for (key, value) in &mapped {
            let obj = value.as_object().unwrap_or_else(|| panic!("{key} not enveloped"));
            assert!(obj["type"].is_string());
            assert!(obj["value"].is_string());
        }
    }

    #[test]
    fn generic_v1_values_round_trip_through_declared_type() {
        let mapped = map_params(ProtocolVariant::GenericV1, &full_params(), &[]).unwrap();
        let plain = map_params(ProtocolVariant::GenericV2, &full_params(), &[]).unwrap();
        for (key, wrapped) in &mapped {
            let repr = wrapped["value"].as_str().unwrap();
            let recovered = match wrapped["type"].as_str().unwrap() {
                "bool" => Value::Bool(repr == "True"),
                "int" => Value::from(repr.parse::<i64>().unwrap()),
                "float" => json!(repr.parse::<f64>().unwrap()),
                "str" => Value::String(repr.to_string()),
                other => panic!("unexpected type {other}"),
            };
            assert_eq!(&recovered, &plain[key], "field {key}");
        }
    }

    #[test]
    fn generic_v1_rejects_structured_values() {
        let params = CompletionParameters::new().with_stop_sequences(vec!["<eot>".into()]);
        match map_params(ProtocolVariant::GenericV1, &params, &[]) {
            Err(Error::UnsupportedParameter { name, .. }) => assert_eq!(name, "stop_sequences"),
            other => panic!("expected UnsupportedParameter, got {other:?}"),
        }
    }

    #[test]
    fn stop_sequences_are_appended_in_order() {
        let params = CompletionParameters::new().with_stop_sequences(vec!["<eot>".into()]);
        let mapped =
            map_params(ProtocolVariant::OpenAiCompatible, &params, &["\n".to_string()]).unwrap();
        assert_eq!(mapped["stop_sequences"], json!(["<eot>", "\n"]));
    }

    #[test]
    fn cloud_uses_native_names() {
        let params = CompletionParameters::new()
            .with_model("llama3-8b")
            .with_max_tokens(1024)
            .with_stop_sequences(vec!["<|eot_id|>".into()])
            .with_temperature(0.0)
            .with_top_p(0.0)
            .with_top_k(1);
        let mapped = map_params(ProtocolVariant::Cloud, &params, &[]).unwrap();
        assert_eq!(mapped["model"], "llama3-8b");
        assert_eq!(mapped["max_tokens"], 1024);
        assert_eq!(mapped["stop"], json!(["<|eot_id|>"]));
        assert_eq!(mapped["top_k"], 1);
    }

    #[test]
    fn extra_aliases_follow_the_variant() {
        let params = CompletionParameters::new()
            .with_extra("select_expert", json!("expert-a"))
            .with_extra("max_tokens_to_generate", json!(32))
            .with_extra("repetition_penalty", json!(1.2))
            .with_extra("unset", Value::Null);
        let mapped = map_params(ProtocolVariant::OpenAiCompatible, &params, &[]).unwrap();
        assert_eq!(mapped["model"], "expert-a");
        assert_eq!(mapped["max_tokens"], 32);
        assert_eq!(mapped["repetition_penalty"], 1.2);
        assert!(!mapped.contains_key("unset"));
    }

    #[test]
    fn empty_stop_is_omitted() {
        let mapped = map_params(ProtocolVariant::GenericV2, &CompletionParameters::new(), &[]).unwrap();
        assert!(mapped.is_empty());
    }
}
