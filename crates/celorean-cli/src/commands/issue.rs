//! `celorean issue`: Issue a course credential.

use clap::Args;
use serde::{Deserialize, Serialize};

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Student wallet address to issue the credential to.
    #[arg(short, long)]
    pub student: String,

    /// Course id, if the credential is for a specific course.
    #[arg(long)]
    pub course_id: Option<u64>,

    /// Credential title.
    #[arg(short, long)]
    pub title: Option<String>,

    /// Credential description.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Issuer name shown on the credential.
    #[arg(long)]
    pub issuer_name: Option<String>,

    /// Deployment environment (localhost, testnet, mainnet).
    #[arg(long, default_value = "testnet")]
    pub environment: String,

    /// Session cookie, required when the node restricts issuance to admins.
    #[arg(short, long)]
    pub cookie: Option<String>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueRequest {
    student_address: String,
    course_id: Option<u64>,
    title: Option<String>,
    description: Option<String>,
    issuer_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueResponse {
    cid: String,
    credential: serde_json::Value,
    gateway_url: String,
    ipfs_url: String,
}

pub async fn run(args: &IssueArgs) -> anyhow::Result<()> {
    let url = format!(
        "{}/api/credentials/issue?environment={}",
        args.endpoint, args.environment
    );
    let body = IssueRequest {
        student_address: args.student.clone(),
        course_id: args.course_id,
        title: args.title.clone(),
        description: args.description.clone(),
        issuer_name: args.issuer_name.clone(),
    };

    let client = reqwest::Client::new();
    let mut req = client.post(&url).json(&body);
    if let Some(cookie) = &args.cookie {
        req = req.header(reqwest::header::COOKIE, cookie.as_str());
    }

    match req.send().await {
        Ok(r) if r.status().is_success() => {
            let data: IssueResponse = r.json().await?;
            println!("Credential issued!");
            println!("  CID:      {}", data.cid);
            println!("  ID:       {}", data.credential["id"].as_str().unwrap_or("-"));
            println!("  Title:    {}", data.credential["title"].as_str().unwrap_or("-"));
            println!("  Student:  {}", data.credential["studentAddress"].as_str().unwrap_or("-"));
            println!("  Gateway:  {}", data.gateway_url);
            println!("  IPFS:     {}", data.ipfs_url);
        }
        Ok(r) => return Err(super::failure("issuance", r).await),
        Err(e) => super::unreachable(&args.endpoint, e),
    }

    Ok(())
}
