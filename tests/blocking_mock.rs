//! Blocking client calls against a local mock server.

use mockito::{Matcher, Server};
use sambanova_client::{
    BlockingTextCompletionClient, CloudClient, CloudConfig, Error, StreamState, StudioClient,
    StudioConfig,
};
use serde_json::json;

const V2_PATH: &str = "/api/v2/predict/generic/proj/ep";
const V2_STREAM_PATH: &str = "/api/v2/predict/generic/stream/proj/ep";
const CLOUD_PATH: &str = "/v1/chat/completions";

#[test]
fn studio_buffered_blocking() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", V2_PATH)
        .match_header("key", "k")
        .with_status(200)
        .with_body(r#"{"items":[{"value":{"completion":"done"}}]}"#)
        .create();

    let client =
        StudioClient::new(StudioConfig::new(format!("{}{}", server.url(), V2_PATH), "k")).unwrap();
    assert_eq!(client.complete_blocking("q", &[]).unwrap(), "done");
    mock.assert();
}

#[test]
fn studio_stream_blocking_yields_in_order() {
    let mut server = Server::new();
    server
        .mock("POST", V2_STREAM_PATH)
        .with_status(200)
        .with_body(concat!(
            r#"{"result":{"items":[{"value":{"stream_token":"A"}}]}}"#,
            "\n\n",
            r#"{"result":{"items":[{"value":{"stream_token":"B"}}]}}"#,
            "\n",
        ))
        .create();

    let client =
        StudioClient::new(StudioConfig::new(format!("{}{}", server.url(), V2_PATH), "k")).unwrap();
    let mut deltas = client.stream_blocking("q", &[]).unwrap();
    let texts: Vec<String> = deltas.by_ref().map(|d| d.unwrap().text).collect();
    assert_eq!(texts, vec!["A", "B"]);
    assert_eq!(deltas.state(), StreamState::Completed);

    let mut seen = 0;
    let text = client
        .complete_blocking_with_observer("q", &[], &mut |_| seen += 1)
        .unwrap();
    assert_eq!(text, "AB");
    assert_eq!(seen, 2);
}

#[test]
fn cloud_blocking_reports_bad_line() {
    let mut server = Server::new();
    server
        .mock("POST", CLOUD_PATH)
        .match_body(Matcher::PartialJson(json!({ "stream": true })))
        .with_status(200)
        .with_body("data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\ndata: {not json\n\n")
        .create();

    let client =
        CloudClient::new(CloudConfig::new("k").with_url(format!("{}{}", server.url(), CLOUD_PATH)));
    let mut deltas = client.stream_blocking("q", &[]).unwrap();
    assert_eq!(deltas.next().unwrap().unwrap().text, "ok");
    assert!(matches!(deltas.next(), Some(Err(Error::StreamProtocol { .. }))));
    assert!(deltas.next().is_none());
    assert_eq!(deltas.state(), StreamState::Failed);
}

#[test]
fn cloud_blocking_non_success_status_fails_stream() {
    let mut server = Server::new();
    server
        .mock("POST", CLOUD_PATH)
        .with_status(503)
        .with_body("busy")
        .create();

    let client =
        CloudClient::new(CloudConfig::new("k").with_url(format!("{}{}", server.url(), CLOUD_PATH)));
    assert!(matches!(
        client.complete_blocking("q", &[]),
        Err(Error::StreamProtocol { status: 503, .. })
    ));
}
