use cucumber::World;
use std::process::ExitStatus;

#[derive(Debug, Default, World)]
pub struct IssuedumpWorld {
    pub captured_output: Vec<u8>,
    pub command_status: Option<ExitStatus>,
    pub without_token: bool,
    pub first_page_link: Option<String>,
    pub page_records: Vec<serde_json::Value>,
    pub reject_credential: bool,
    pub fetch_result: Option<Result<Vec<serde_json::Value>, String>>,
    pub issues: Vec<serde_json::Value>,
    pub normalized: Vec<issuedump::transform::NormalizedIssue>,
}

#[tokio::main]
async fn main() {
    IssuedumpWorld::run("features").await;
}

mod steps;
