use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;

static EXEC_GATEWAY_CLIENT: OnceCell<Arc<ExecGatewayClient>> = OnceCell::const_new();

/// Any language version the gateway has available.
const ANY_VERSION: &str = "*";

/// Client for the external code-execution service.
///
/// The service runs submitted code and reports its stdout/stderr; its
/// internals are opaque to the hub. Transport failures surface as
/// `reqwest::Error` and are converted to synthetic results by the caller.
#[derive(Debug)]
pub struct ExecGatewayClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecRequest<'a> {
    language: &'a str,
    language_version: &'a str,
    source_files: Vec<SourceFile<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceFile<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ExecResponse {
    pub run: ExecRun,
}

/// stdout/stderr of one completed run.
#[derive(Debug, Deserialize, Default)]
pub struct ExecRun {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

impl ExecGatewayClient {
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Run `code` under `language`, returning the gateway's stdout/stderr.
    pub async fn execute(&self, language: &str, code: &str) -> Result<ExecRun, reqwest::Error> {
        let url = format!("{}/execute", self.base_url);
        let request = ExecRequest {
            language,
            language_version: ANY_VERSION,
            source_files: vec![SourceFile { content: code }],
        };
        let response: ExecResponse = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.run)
    }
}

/// Initialize the global gateway client
pub fn init_exec_gateway_client(base_url: String, timeout_secs: u64) -> Result<(), &'static str> {
    let client = ExecGatewayClient::new(base_url, timeout_secs);
    EXEC_GATEWAY_CLIENT
        .set(Arc::new(client))
        .map_err(|_| "ExecGatewayClient already initialized")
}

/// Get the global gateway client instance
pub fn get_exec_gateway_client() -> Option<Arc<ExecGatewayClient>> {
    EXEC_GATEWAY_CLIENT.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_the_gateway_contract() {
        let request = ExecRequest {
            language: "python",
            language_version: ANY_VERSION,
            source_files: vec![SourceFile { content: "print(42)" }],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""language":"python""#));
        assert!(json.contains(r#""languageVersion":"*""#));
        assert!(json.contains(r#""sourceFiles":[{"content":"print(42)"}]"#));
    }

    #[test]
    fn response_parses_with_missing_streams_defaulted() {
        let response: ExecResponse =
            serde_json::from_str(r#"{"run":{"stdout":"42\n"}}"#).unwrap();
        assert_eq!(response.run.stdout, "42\n");
        assert_eq!(response.run.stderr, "");
    }
}
