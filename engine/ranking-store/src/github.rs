//! Rankings document stored in a GitHub repository via the contents API

use crate::backend::RankingBackend;
use crate::config::GithubConfig;
use crate::error::{Result, StoreError};
use crate::state::RankingState;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

/// Rankings document kept as a file in a GitHub repository
pub struct GithubBackend {
    client: Client,
    config: GithubConfig,
    repo: String,
    token: String,
}

impl GithubBackend {
    pub fn new(config: GithubConfig, token: String) -> Result<Self> {
        config.validate().map_err(StoreError::config)?;
        let repo = config.repo.clone().unwrap_or_default();

        let client =
            Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;

        Ok(Self { client, config, repo, token })
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, "draft-assistant")
    }

    /// Fetch the current file, `None` if it does not exist yet
    async fn fetch(&self) -> Result<Option<ContentsResponse>> {
        let url = self.config.contents_url(&self.repo);
        let response = self
            .request(self.client.get(&url))
            .query(&[("ref", self.config.branch.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("No rankings document at {}", url);
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::remote(status, message));
        }

        Ok(Some(response.json().await?))
    }
}

#[async_trait::async_trait]
impl RankingBackend for GithubBackend {
    async fn read(&self) -> Result<Option<RankingState>> {
        let Some(file) = self.fetch().await? else {
            return Ok(None);
        };

        // The API wraps base64 content at 60 columns
        let encoded: String = file.content.split_whitespace().collect();
        let bytes = STANDARD.decode(encoded)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn write(&self, state: &RankingState) -> Result<()> {
        // Overwrite whatever revision is current; concurrent sessions race
        let sha = self.fetch().await?.map(|file| file.sha);

        let body = UpdateRequest {
            message: &self.config.commit_message,
            content: STANDARD.encode(serde_json::to_string_pretty(state)?),
            branch: &self.config.branch,
            sha,
        };

        let response = self
            .request(self.client.put(self.config.contents_url(&self.repo)))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::remote(status, message));
        }

        info!("Saved rankings to {}", self.describe());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("github:{}/{}@{}", self.repo, self.config.path, self.config.branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const CONTENTS_PATH: &str = "/repos/team/draft/contents/user_rankings.json";

    fn backend_for(server: &mockito::ServerGuard) -> GithubBackend {
        let config = GithubConfig {
            repo: Some("team/draft".to_string()),
            api_url: server.url(),
            ..Default::default()
        };
        GithubBackend::new(config, "secret".to_string()).unwrap()
    }

    fn wrapped_base64(text: &str) -> String {
        let encoded = STANDARD.encode(text);
        let lines: Vec<String> =
            encoded.as_bytes().chunks(60).map(|c| String::from_utf8_lossy(c).into_owned()).collect();
        lines.join("\n")
    }

    #[test]
    fn test_new_requires_repo() {
        assert!(GithubBackend::new(GithubConfig::default(), "t".to_string()).is_err());
    }

    #[test]
    fn test_new_rejects_zero_timeout() {
        let config = GithubConfig {
            repo: Some("team/draft".to_string()),
            timeout_secs: 0,
            ..Default::default()
        };
        let err = GithubBackend::new(config, "t".to_string()).err().unwrap();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[tokio::test]
    async fn test_read_decodes_wrapped_content() {
        let mut server = mockito::Server::new_async().await;
        let document = r#"{"jack": ["Josh Allen", "Bijan Robinson"], "kyle": []}"#;
        let mock = server
            .mock("GET", CONTENTS_PATH)
            .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"sha": "abc123", "content": wrapped_base64(document)}).to_string())
            .create_async()
            .await;

        let state = backend_for(&server).read().await.unwrap().unwrap();

        assert_eq!(
            state.list("jack").unwrap().to_vec(),
            vec!["Josh Allen".to_string(), "Bijan Robinson".to_string()]
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_read_missing_file_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", CONTENTS_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        assert_eq!(backend_for(&server).read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_server_error_is_remote_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", CONTENTS_PATH)
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = backend_for(&server).read().await.unwrap_err();
        assert!(matches!(err, StoreError::Remote { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_write_overwrites_current_revision() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", CONTENTS_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"sha": "abc123", "content": wrapped_base64("{}")}).to_string())
            .create_async()
            .await;
        let put = server
            .mock("PUT", CONTENTS_PATH)
            .match_body(Matcher::PartialJson(json!({"sha": "abc123", "branch": "main"})))
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let state = RankingState::for_users(["jack"]);
        backend_for(&server).write(&state).await.unwrap();

        put.assert_async().await;
    }

    #[tokio::test]
    async fn test_first_write_creates_file_without_sha() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", CONTENTS_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;
        let expected_content = STANDARD.encode(
            serde_json::to_string_pretty(&RankingState::for_users(["kyle"])).unwrap(),
        );
        let put = server
            .mock("PUT", CONTENTS_PATH)
            .match_body(Matcher::Json(json!({
                "message": "Update user rankings",
                "content": expected_content,
                "branch": "main"
            })))
            .with_status(201)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        backend_for(&server).write(&RankingState::for_users(["kyle"])).await.unwrap();

        put.assert_async().await;
    }
}
