//! `celorean verify`: Verify a stored credential.

use clap::Args;
use serde::{Deserialize, Serialize};

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Content id of the credential.
    pub cid: String,

    /// Print the full credential document.
    #[arg(long)]
    pub show: bool,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    cid: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    valid: bool,
    data: serde_json::Value,
    reason: Option<String>,
    gateway_url: String,
}

pub async fn run(args: &VerifyArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/credentials/verify", args.endpoint);
    let client = reqwest::Client::new();
    let resp = client
        .post(&url)
        .json(&VerifyRequest { cid: &args.cid })
        .send()
        .await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: VerifyResponse = r.json().await?;
            if data.valid {
                println!("Credential is VALID");
            } else {
                println!("Credential is INVALID");
                if let Some(reason) = &data.reason {
                    println!("  Reason:   {}", reason);
                }
            }
            println!("  Title:    {}", data.data["title"].as_str().unwrap_or("-"));
            println!("  Student:  {}", data.data["studentAddress"].as_str().unwrap_or("-"));
            println!("  Issuer:   {}", data.data["issuer"]["name"].as_str().unwrap_or("-"));
            println!("  Gateway:  {}", data.gateway_url);
            if args.show {
                println!("{}", serde_json::to_string_pretty(&data.data)?);
            }
        }
        Ok(r) => return Err(super::failure("verification", r).await),
        Err(e) => super::unreachable(&args.endpoint, e),
    }

    Ok(())
}
