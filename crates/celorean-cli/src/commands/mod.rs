pub mod issue;
pub mod list;
pub mod login;
pub mod session;
pub mod verify;

use serde::Deserialize;

/// Default API endpoint of a local node.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Turn a non-success response into an error carrying the node's message.
pub async fn failure(action: &str, resp: reqwest::Response) -> anyhow::Error {
    let status = resp.status();
    match resp.json::<ErrorResponse>().await {
        Ok(err) => anyhow::anyhow!("{} failed (HTTP {}): {}", action, status, err.error),
        Err(_) => anyhow::anyhow!("{} failed (HTTP {})", action, status),
    }
}

/// Connection failure hint, printed instead of a bare transport error.
pub fn unreachable(endpoint: &str, err: reqwest::Error) {
    println!("Could not reach node at {}", endpoint);
    println!("  Error: {}", err);
    println!();
    println!("Is the node running? Start it with: celorean-node");
}
