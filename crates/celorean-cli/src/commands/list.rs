//! `celorean list`: List a student's credentials.

use clap::Args;
use serde::Deserialize;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Student wallet address.
    pub student: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialItem {
    content_id: String,
    title: Option<String>,
    issued_at: Option<String>,
    url: String,
}

#[derive(Deserialize)]
struct ListResponse {
    items: Vec<CredentialItem>,
}

pub async fn run(args: &ListArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/credentials", args.endpoint);
    let client = reqwest::Client::new();
    let resp = client
        .get(&url)
        .query(&[("student", args.student.as_str())])
        .send()
        .await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: ListResponse = r.json().await?;
            if data.items.is_empty() {
                println!("No credentials for {}", args.student);
                return Ok(());
            }
            println!("Credentials for {} ({}):", args.student, data.items.len());
            for item in &data.items {
                println!(
                    "  {}  {}  {}",
                    item.issued_at.as_deref().unwrap_or("-"),
                    item.content_id,
                    item.title.as_deref().unwrap_or("(untitled)")
                );
                println!("      {}", item.url);
            }
        }
        Ok(r) => return Err(super::failure("listing", r).await),
        Err(e) => super::unreachable(&args.endpoint, e),
    }

    Ok(())
}
