//! `celorean session`: Check a session cookie against the node.

use clap::Args;
use serde::Deserialize;

use celorean_auth::SESSION_COOKIE_NAME;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Session cookie, either `name=value` as printed by `login` or the bare value.
    #[arg(short, long)]
    pub cookie: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionInfo {
    subject_address: String,
    chain_id: u64,
    wallet_type: String,
    expires_at_ms: i64,
}

#[derive(Deserialize)]
struct SessionResponse {
    authenticated: bool,
    session: Option<SessionInfo>,
    error: Option<String>,
}

fn cookie_header(cookie: &str) -> String {
    let prefix = format!("{}=", SESSION_COOKIE_NAME);
    if cookie.starts_with(&prefix) {
        cookie.to_string()
    } else {
        format!("{}{}", prefix, cookie)
    }
}

pub async fn run(args: &SessionArgs) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/api/auth/session", args.endpoint))
        .header(reqwest::header::COOKIE, cookie_header(&args.cookie))
        .send()
        .await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: SessionResponse = r.json().await?;
            match (data.authenticated, data.session) {
                (true, Some(session)) => {
                    println!("Session is valid");
                    println!("  Address:     {}", session.subject_address);
                    println!("  Chain ID:    {}", session.chain_id);
                    println!("  Wallet type: {}", session.wallet_type);
                    println!("  Expires at:  {} ms", session.expires_at_ms);
                }
                _ => {
                    println!("Not authenticated");
                    if let Some(reason) = data.error {
                        println!("  Reason: {}", reason);
                    }
                }
            }
        }
        Ok(r) => return Err(super::failure("session check", r).await),
        Err(e) => super::unreachable(&args.endpoint, e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header_accepts_both_forms() {
        assert_eq!(cookie_header("abc.def"), "celorean_session=abc.def");
        assert_eq!(cookie_header("celorean_session=abc.def"), "celorean_session=abc.def");
    }
}
