//! Robot REST Adapter
//!
//! Thin client for the social robot's remote API. One client implements the
//! voice, attention and listen contracts; every call is a single blocking
//! HTTP request against the robot's local endpoint.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use dilemma_core::services::{AttentionService, ListenService, VoiceService};
use serde::Deserialize;
use tracing::debug;

/// Body returned by the robot for every request.
#[derive(Debug, Deserialize)]
struct RobotResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: String,
}

pub struct RobotClient {
    http_client: reqwest::Client,
    base_url: String,
    voice: String,
}

impl RobotClient {
    /// Creates a client for the robot at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            voice: voice.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/furhat/{}", self.base_url, path)
    }

    async fn post(&self, path: &str, query: &[(&str, &str)]) -> Result<RobotResponse> {
        let response = self
            .http_client
            .post(self.url(path))
            .query(query)
            .send()
            .await
            .with_context(|| format!("Robot request '{path}' failed"))?
            .error_for_status()?;
        Ok(response.json::<RobotResponse>().await?)
    }
}

#[async_trait]
impl VoiceService for RobotClient {
    async fn set_voice(&self) -> Result<()> {
        let response = self.post("voice", &[("name", self.voice.as_str())]).await?;
        if !response.success {
            bail!("Robot rejected voice '{}': {}", self.voice, response.message);
        }
        Ok(())
    }

    async fn speak(&self, text: &str, first_turn: bool) -> Result<()> {
        debug!(first_turn, "Sending speech to robot");
        let response = self
            .post("say", &[("text", text), ("blocking", "true")])
            .await?;
        if !response.success {
            bail!("Robot could not speak: {}", response.message);
        }
        Ok(())
    }
}

#[async_trait]
impl AttentionService for RobotClient {
    async fn attend_nearest(&self) -> Result<()> {
        let response = self.post("attend", &[("user", "CLOSEST")]).await?;
        if !response.success {
            bail!("Robot could not attend: {}", response.message);
        }
        Ok(())
    }
}

#[async_trait]
impl ListenService for RobotClient {
    async fn listen(&self) -> Result<String> {
        let response = self
            .http_client
            .get(self.url("listen"))
            .send()
            .await
            .context("Robot listen request failed")?
            .error_for_status()?
            .json::<RobotResponse>()
            .await?;

        let utterance = response.message.trim();
        if !response.success || utterance.is_empty() {
            bail!("No speech captured");
        }
        Ok(utterance.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ok_body(message: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "success": true, "message": message }))
    }

    #[tokio::test]
    async fn test_speak_sends_blocking_say() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/furhat/say"))
            .and(query_param("text", "Hmmmmm, the pilot?"))
            .and(query_param("blocking", "true"))
            .respond_with(ok_body(""))
            .expect(1)
            .mount(&server)
            .await;

        let robot = RobotClient::new(server.uri(), "Matthew");
        robot.speak("Hmmmmm, the pilot?", false).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_voice_and_attend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/furhat/voice"))
            .and(query_param("name", "Joanna"))
            .respond_with(ok_body(""))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/furhat/attend"))
            .and(query_param("user", "CLOSEST"))
            .respond_with(ok_body(""))
            .expect(1)
            .mount(&server)
            .await;

        let robot = RobotClient::new(server.uri(), "Joanna");
        robot.set_voice().await.unwrap();
        robot.attend_nearest().await.unwrap();
    }

    #[tokio::test]
    async fn test_listen_returns_trimmed_utterance() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/furhat/listen"))
            .respond_with(ok_body("  I want the pilot to jump "))
            .mount(&server)
            .await;

        let robot = RobotClient::new(server.uri(), "Matthew");
        assert_eq!(robot.listen().await.unwrap(), "I want the pilot to jump");
    }

    #[tokio::test]
    async fn test_listen_without_speech_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/furhat/listen"))
            .respond_with(ok_body(""))
            .mount(&server)
            .await;

        let robot = RobotClient::new(server.uri(), "Matthew");
        let err = robot.listen().await.unwrap_err();
        assert!(err.to_string().contains("No speech captured"));
    }

    #[tokio::test]
    async fn test_server_error_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/furhat/say"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let robot = RobotClient::new(server.uri(), "Matthew");
        assert!(robot.speak("Hello", true).await.is_err());
    }

    #[tokio::test]
    async fn test_rejected_voice_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/furhat/voice"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": false, "message": "unknown voice" })),
            )
            .mount(&server)
            .await;

        let robot = RobotClient::new(server.uri(), "Nobody");
        let err = robot.set_voice().await.unwrap_err();
        assert!(err.to_string().contains("unknown voice"));
    }
}
