//! Run a serverless event through a guarded handler.
//!
//! ```sh
//! BASE_URL=https://valuya.example.com SITE_TOKEN=... \
//!     cargo run --example guard_event -- event.json
//! ```
//!
//! The event file is an API Gateway style JSON event. Without a path argument a
//! small anonymous `GET /reports` event is used.

use serde_json::{Value, json};
use valuya_kit::{
    client::{RemoteClient, RemoteClientError},
    guard::{
        guard::{Guard, GuardConfig, guard},
        response::GuardResponse,
    },
};

/// The protected business logic.
async fn reports(event: Value, request_id: String) -> Value {
    json!({
        "message": "You have accessed a protected resource!",
        "request_id": request_id,
        "path": event.pointer("/requestContext/http/path").cloned().unwrap_or(Value::Null),
    })
}

/// Gate with the one-call wrapper.
async fn standard_guard(event: Value) -> Result<GuardResponse, RemoteClientError> {
    let protected = guard(
        RemoteClient::from_env(),
        GuardConfig::builder()
            .resource("aws:lambda:demo:reports:v1")
            .success_url("https://example.com/reports?paid=1")
            .cancel_url("https://example.com/pricing")
            .build(),
        reports,
    );

    protected.call(event, "req-standard".to_string()).await
}

/// Gate step by step, deriving the resource from the route.
async fn custom_guard(event: Value) -> Result<GuardResponse, RemoteClientError> {
    let guard = Guard::new(
        RemoteClient::from_env(),
        GuardConfig::builder().plan("team").redirect_browsers().build(),
    );

    let evaluated = guard.resolve(event)?.evaluate().await?;

    if evaluated.is_allowed() {
        return Ok(evaluated
            .run_handler("req-custom".to_string(), reports)
            .await);
    }

    let required = Value::Object(evaluated.required());
    tracing::info!("Denied, required: {required}");
    evaluated.checkout().await?.response()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let event: Value = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str(&tokio::fs::read_to_string(path).await?)?,
        None => json!({
            "headers": {"x-valuya-anon-id": "visitor-1", "accept": "application/json"},
            "requestContext": {"http": {"method": "GET", "path": "/reports"}}
        }),
    };

    for (name, response) in [
        ("standard", standard_guard(event.clone()).await),
        ("custom", custom_guard(event).await),
    ] {
        match response {
            Ok(response) => println!("{name}: {}", serde_json::to_string_pretty(&response)?),
            Err(err) => eprintln!("{name}: guard failed: {err} (status {:?})", err.status()),
        }
    }

    Ok(())
}
