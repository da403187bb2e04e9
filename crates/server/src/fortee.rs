//! Client for the fortee CFP platform API.

use std::time::Duration;

use async_trait::async_trait;
use cfpbot_core::domain::proposal::{Proposal, ProposalId, ProposalListResponse};
use cfpbot_core::links::ProposalLinks;
use thiserror::Error;
use tracing::debug;

/// Messages are posted to Slack as-is.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ForteeError {
    #[error("APIリクエストに失敗しました（ステータス：{0}）")]
    Status(u16),
    #[error("APIへの接続に失敗しました：{0}")]
    Transport(String),
    #[error("APIレスポンスの解析に失敗しました：{0}")]
    Decode(String),
    #[error("APIレスポンスにプロポーザルが含まれていませんでした")]
    EmptyResponse,
}

#[async_trait]
pub trait ProposalSource: Send + Sync {
    async fn fetch_proposal(&self, id: &ProposalId) -> Result<Proposal, ForteeError>;
    async fn fetch_all(&self) -> Result<Vec<Proposal>, ForteeError>;
}

#[derive(Clone, Debug)]
pub struct ForteeClient {
    http: reqwest::Client,
    api_url: String,
}

impl ForteeClient {
    pub fn new(links: &ProposalLinks, timeout_secs: u64) -> Result<Self, ForteeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|error| ForteeError::Transport(error.to_string()))?;
        Ok(Self { http, api_url: links.api_url() })
    }

    async fn get_proposals(&self, url: &str) -> Result<Vec<Proposal>, ForteeError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|error| ForteeError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForteeError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|error| ForteeError::Transport(error.to_string()))?;
        let decoded: ProposalListResponse =
            serde_json::from_slice(&body).map_err(|error| ForteeError::Decode(error.to_string()))?;
        debug!(
            event_name = "cfp.fortee.fetch.completed",
            url,
            proposals = decoded.proposals.len(),
            "fetched proposals"
        );
        Ok(decoded.proposals)
    }
}

#[async_trait]
impl ProposalSource for ForteeClient {
    async fn fetch_proposal(&self, id: &ProposalId) -> Result<Proposal, ForteeError> {
        let url = format!("{}/proposals/{id}", self.api_url);
        self.get_proposals(&url).await?.into_iter().next().ok_or(ForteeError::EmptyResponse)
    }

    async fn fetch_all(&self) -> Result<Vec<Proposal>, ForteeError> {
        self.get_proposals(&format!("{}/proposals", self.api_url)).await
    }
}

#[cfg(test)]
mod tests {
    use cfpbot_core::domain::proposal::ProposalId;
    use cfpbot_core::links::ProposalLinks;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{ForteeClient, ForteeError, ProposalSource};
    use crate::testing::{proposal_json, VALID_ID};

    fn client(server: &MockServer) -> ForteeClient {
        let links = ProposalLinks::new(&format!("{}/conf", server.uri())).expect("links");
        ForteeClient::new(&links, 5).expect("client")
    }

    #[tokio::test]
    async fn fetches_single_proposal_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/conf/api/proposals/{VALID_ID}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "proposals": [proposal_json(VALID_ID, true)] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let id = ProposalId::parse(VALID_ID).expect("uuid");
        let proposal = client(&server).fetch_proposal(&id).await.expect("fetch");
        assert_eq!(proposal.uuid, id);
        assert_eq!(proposal.speaker.name, "Sato Hanako");
    }

    #[tokio::test]
    async fn empty_list_for_single_proposal_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/conf/api/proposals/{VALID_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "proposals": [] })))
            .mount(&server)
            .await;

        let id = ProposalId::parse(VALID_ID).expect("uuid");
        let error = client(&server).fetch_proposal(&id).await.expect_err("empty list");
        assert_eq!(error, ForteeError::EmptyResponse);
        assert_eq!(error.to_string(), "APIレスポンスにプロポーザルが含まれていませんでした");
    }

    #[tokio::test]
    async fn http_status_failures_are_reported_with_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/conf/api/proposals"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let error = client(&server).fetch_all().await.expect_err("bad gateway");
        assert_eq!(error, ForteeError::Status(502));
        assert_eq!(error.to_string(), "APIリクエストに失敗しました（ステータス：502）");
    }

    #[tokio::test]
    async fn malformed_payload_is_a_decode_error() {
        let server = MockServer::start().await;
        let mut broken = proposal_json(VALID_ID, true);
        broken["uuid"] = json!("not-a-uuid");
        Mock::given(method("GET"))
            .and(path("/conf/api/proposals"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "proposals": [broken] })))
            .mount(&server)
            .await;

        let error = client(&server).fetch_all().await.expect_err("bad uuid");
        assert!(matches!(error, ForteeError::Decode(_)));
    }
}
