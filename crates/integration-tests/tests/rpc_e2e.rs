//! JSON-RPC round trips against a server on an ephemeral port

mod common;

use coldline_api_rpc::{RpcServer, RpcServerConfig};
use common::{Harness, SAMPLE_CSV};
use jsonrpsee::core::client::{ClientT, Error as ClientError};
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::server::ServerHandle;
use serde_json::{json, Value};

async fn start(h: &Harness) -> (HttpClient, ServerHandle) {
    start_with(
        h,
        RpcServerConfig {
            port: 0,
            ..Default::default()
        },
    )
    .await
}

async fn start_with(h: &Harness, config: RpcServerConfig) -> (HttpClient, ServerHandle) {
    let (addr, handle) = RpcServer::new(config, h.services()).start().await.unwrap();
    let client = HttpClientBuilder::default()
        .build(format!("http://{}", addr))
        .unwrap();
    (client, handle)
}

fn params(value: Value) -> ObjectParams {
    let mut params = ObjectParams::new();
    if let Value::Object(map) = value {
        for (key, value) in map {
            params.insert(&key, value).unwrap();
        }
    }
    params
}

async fn call(client: &HttpClient, method: &str, value: Value) -> Value {
    client.request(method, params(value)).await.unwrap()
}

fn error_code(err: ClientError) -> i32 {
    match err {
        ClientError::Call(obj) => obj.code(),
        other => panic!("expected call error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_import_page_and_navigate_over_rpc() {
    let h = Harness::in_memory().await;
    let (client, handle) = start(&h).await;

    let summary = call(
        &client,
        "lists.import.v1",
        json!({
            "user_id": "user-1",
            "file_name": "prospects.csv",
            "content": SAMPLE_CSV,
        }),
    )
    .await;
    assert_eq!(summary["imported"], 4);
    assert_eq!(summary["skipped"][0]["line"], 4);
    let list_id = summary["list_id"].as_str().unwrap().to_string();

    let lists = call(&client, "lists.list.v1", json!({ "user_id": "user-1" })).await;
    assert_eq!(lists["lists"][0]["name"], "prospects");

    let page = call(
        &client,
        "leads.page.v1",
        json!({
            "user_id": "user-1",
            "list_id": list_id,
            "filter": { "timezones": ["EASTERN"], "call_status": "ALL" },
        }),
    )
    .await;
    assert_eq!(page["total"], 4);
    assert_eq!(page["matching"], 1);
    assert_eq!(page["items"][0]["name"], "Grace Hopper");

    let selected = call(
        &client,
        "session.select_list.v1",
        json!({ "user_id": "user-1", "device_id": "web", "list_id": list_id }),
    )
    .await;
    assert_eq!(selected["index"], 0);
    assert_eq!(selected["matching"], 4);

    let moved = call(
        &client,
        "session.navigate.v1",
        json!({ "user_id": "user-1", "device_id": "web", "direction": { "JUMP": 3 } }),
    )
    .await;
    assert_eq!(moved["lead"]["name"], "Katherine Johnson");
    assert_eq!(moved["at_end"], true);

    let stuck = call(
        &client,
        "session.navigate.v1",
        json!({ "user_id": "user-1", "device_id": "web", "direction": "NEXT" }),
    )
    .await;
    assert_eq!(stuck["moved"], false);

    let session = call(
        &client,
        "session.load.v1",
        json!({ "user_id": "user-1", "device_id": "web" }),
    )
    .await;
    assert_eq!(session["source"], "LOCAL");
    assert_eq!(session["state"]["current_index"], 3);

    handle.stop().unwrap();
}

#[tokio::test]
async fn test_contact_and_templates_over_rpc() {
    let h = Harness::in_memory().await;
    let summary = h.import_sample("user-1").await;
    let (client, handle) = start(&h).await;

    let page = call(
        &client,
        "leads.page.v1",
        json!({ "user_id": "user-1", "list_id": summary.list_id }),
    )
    .await;
    let grace = page["items"][1]["id"].as_str().unwrap().to_string();

    let saved = call(
        &client,
        "templates.save.v1",
        json!({
            "user_id": "user-1",
            "text": { "message": "Hi {{first_name}} from {{my_company}} {{shoe_size}}" },
        }),
    )
    .await;
    assert_eq!(saved["unknown_placeholders"], json!(["{{shoe_size}}"]));

    let rendered = call(
        &client,
        "templates.render.v1",
        json!({
            "user_id": "user-1",
            "lead_id": grace,
            "channel": "SMS",
            "sender": { "company": "Coldline" },
        }),
    )
    .await;
    assert_eq!(rendered["body"], "Hi Grace from Coldline {{shoe_size}}");
    assert_eq!(rendered["subject"], Value::Null);

    let prepared = call(
        &client,
        "contact.prepare.v1",
        json!({ "user_id": "user-1", "lead_id": grace, "channel": "CALL" }),
    )
    .await;
    assert_eq!(prepared["uri"], "tel:+12125550199");
    assert_eq!(prepared["action"]["type"], "CALL");

    let sms = call(
        &client,
        "contact.prepare.v1",
        json!({
            "user_id": "user-1",
            "lead_id": grace,
            "channel": "SMS",
            "sender": { "company": "Coldline" },
        }),
    )
    .await;
    assert_eq!(sms["action"]["type"], "SMS");
    assert_eq!(sms["action"]["phone"], "212-555-0199");
    assert_eq!(sms["action"]["body"], "Hi Grace from Coldline {{shoe_size}}");
    assert_eq!(
        sms["uri"],
        "sms:+12125550199?body=Hi%20Grace%20from%20Coldline%20%7B%7Bshoe_size%7D%7D"
    );

    // Only the call counts
    let stats = call(
        &client,
        "leads.stats.v1",
        json!({ "user_id": "user-1", "list_id": summary.list_id }),
    )
    .await;
    assert_eq!(stats["called"], 1);
    assert_eq!(stats["total_calls"], 1);

    let reset = call(
        &client,
        "leads.reset.v1",
        json!({ "user_id": "user-1", "list_id": summary.list_id }),
    )
    .await;
    assert_eq!(reset["reset"], 1);

    handle.stop().unwrap();
}

#[tokio::test]
async fn test_rpc_error_codes() {
    let h = Harness::in_memory().await;
    let summary = h.import_sample("user-1").await;
    let (client, handle) = start(&h).await;

    let err = client
        .request::<Value, _>(
            "leads.call.v1",
            params(json!({ "user_id": "user-1", "lead_id": "missing" })),
        )
        .await
        .unwrap_err();
    assert_eq!(error_code(err), 4001);

    let err = client
        .request::<Value, _>(
            "leads.reset.v1",
            params(json!({ "user_id": "user-1", "list_id": null })),
        )
        .await
        .unwrap_err();
    assert_eq!(error_code(err), 4000);

    // Another user's list looks missing
    let err = client
        .request::<Value, _>(
            "lists.delete.v1",
            params(json!({ "user_id": "user-2", "list_id": summary.list_id })),
        )
        .await
        .unwrap_err();
    assert_eq!(error_code(err), 4001);

    let err = client
        .request::<Value, _>(
            "session.navigate.v1",
            params(json!({ "user_id": "user-1", "device_id": "web", "direction": "NEXT" })),
        )
        .await
        .unwrap_err();
    assert_eq!(error_code(err), 4000);

    handle.stop().unwrap();
}

#[tokio::test]
async fn test_leads_of_other_users_are_not_reachable() {
    let h = Harness::in_memory().await;
    let summary = h.import_sample("user-1").await;
    let (client, handle) = start(&h).await;

    let page = call(
        &client,
        "leads.page.v1",
        json!({ "user_id": "user-1", "list_id": summary.list_id }),
    )
    .await;
    let grace = page["items"][1]["id"].as_str().unwrap().to_string();

    let attempts = [
        (
            "contact.prepare.v1",
            json!({ "user_id": "user-2", "lead_id": grace, "channel": "CALL" }),
        ),
        (
            "leads.call.v1",
            json!({ "user_id": "user-2", "lead_id": grace }),
        ),
        (
            "leads.reset.v1",
            json!({ "user_id": "user-2", "list_id": summary.list_id }),
        ),
        (
            "leads.page.v1",
            json!({ "user_id": "user-2", "list_id": summary.list_id }),
        ),
        (
            "leads.stats.v1",
            json!({ "user_id": "user-2", "list_id": summary.list_id }),
        ),
        (
            "templates.render.v1",
            json!({ "user_id": "user-2", "lead_id": grace, "channel": "SMS" }),
        ),
    ];
    for (method, body) in attempts {
        let err = client
            .request::<Value, _>(method, params(body))
            .await
            .unwrap_err();
        assert_eq!(error_code(err), 4001, "{} should report not found", method);
    }

    let lead = h.leads.get("user-1", &grace).await.unwrap();
    assert_eq!(lead.call_count, 0);
    assert!(lead.last_called_at.is_none());

    handle.stop().unwrap();
}

#[tokio::test]
async fn test_writes_are_throttled() {
    let h = Harness::in_memory().await;
    let (client, handle) = start_with(
        &h,
        RpcServerConfig {
            port: 0,
            rate_limit_burst: 1,
            rate_limit_rate: 0,
            ..Default::default()
        },
    )
    .await;

    call(&client, "templates.reset.v1", json!({ "user_id": "user-1" })).await;
    let err = client
        .request::<Value, _>("templates.reset.v1", params(json!({ "user_id": "user-1" })))
        .await
        .unwrap_err();
    assert_eq!(error_code(err), 4003);

    // Reads never draw from the bucket
    let lists = call(&client, "lists.list.v1", json!({ "user_id": "user-1" })).await;
    assert_eq!(lists["lists"], json!([]));

    handle.stop().unwrap();
}

#[tokio::test]
async fn test_call_delay_above_limit_is_rejected() {
    let h = Harness::in_memory().await;
    let summary = h.import_sample("user-1").await;
    let (client, handle) = start(&h).await;

    call(
        &client,
        "session.select_list.v1",
        json!({ "user_id": "user-1", "device_id": "web", "list_id": summary.list_id }),
    )
    .await;

    let accepted = call(
        &client,
        "session.settings.v1",
        json!({ "user_id": "user-1", "device_id": "web", "call_delay_secs": 300 }),
    )
    .await;
    assert_eq!(accepted["session"]["call_delay_secs"], 300);

    let err = client
        .request::<Value, _>(
            "session.settings.v1",
            params(json!({ "user_id": "user-1", "device_id": "web", "call_delay_secs": 301 })),
        )
        .await
        .unwrap_err();
    assert_eq!(error_code(err), 4000);

    let session = call(
        &client,
        "session.load.v1",
        json!({ "user_id": "user-1", "device_id": "web" }),
    )
    .await;
    assert_eq!(session["state"]["call_delay_secs"], 300);

    handle.stop().unwrap();
}
