//! Reflection prompt sources.
//!
//! A source turns a purchase into rhetorical questions shown during the
//! countdown. Exactly one attempt is made per submission; on any failure the
//! timer falls back to [`FALLBACK_PROMPTS`].

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::PromptError;
use crate::purchase::Purchase;

pub const FALLBACK_PROMPTS: [&str; 5] = [
    "Will this purchase bring long-term value?",
    "Is this a need or a want?",
    "Can I delay this purchase for 30 days?",
    "How will I feel about this purchase next week?",
    "Does this align with my financial goals?",
];

/// Shown while the generator request is outstanding.
pub const GENERATING_PLACEHOLDER: &str = "Generating personalized reflection prompts...";

pub fn fallback_prompts() -> Vec<String> {
    FALLBACK_PROMPTS.iter().map(|p| p.to_string()).collect()
}

#[async_trait]
pub trait PromptSource: Send + Sync {
    /// Produce an ordered, non-empty list of prompts for `purchase`.
    async fn generate(&self, purchase: &Purchase) -> Result<Vec<String>, PromptError>;
}

/// Always answers with the fallback list.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPromptSource;

#[async_trait]
impl PromptSource for StaticPromptSource {
    async fn generate(&self, _purchase: &Purchase) -> Result<Vec<String>, PromptError> {
        Ok(fallback_prompts())
    }
}

#[derive(Deserialize)]
struct PromptResponse {
    prompts: Vec<String>,
}

/// Remote generator: POSTs the purchase as JSON, expects `{"prompts": [...]}`.
pub struct HttpPromptSource {
    client: Client,
    endpoint: String,
}

impl HttpPromptSource {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl PromptSource for HttpPromptSource {
    async fn generate(&self, purchase: &Purchase) -> Result<Vec<String>, PromptError> {
        let resp = self.client.post(&self.endpoint).json(purchase).send().await?;

        if !resp.status().is_success() {
            return Err(PromptError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body: PromptResponse = resp.json().await?;
        let prompts: Vec<String> = body
            .prompts
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if prompts.is_empty() {
            return Err(PromptError::Empty);
        }
        tracing::debug!(count = prompts.len(), "Generated reflection prompts");
        Ok(prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::purchase::PurchaseDraft;

    fn purchase() -> Purchase {
        Purchase::from_draft(PurchaseDraft {
            name: "Headphones".into(),
            price: 129.99,
            category: "Electronics".into(),
            reason: "need for commute".into(),
            need_score: 6,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn http_source_returns_trimmed_prompts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/prompts")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"name":"Headphones","category":"Electronics"}"#.into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"prompts":[" Do you own headphones already? ","","Would renting work?"]}"#)
            .create_async()
            .await;

        let source = HttpPromptSource::new(Client::new(), format!("{}/prompts", server.url()));
        let prompts = source.generate(&purchase()).await.unwrap();
        assert_eq!(
            prompts,
            vec!["Do you own headphones already?", "Would renting work?"]
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_source_maps_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/prompts")
            .with_status(502)
            .create_async()
            .await;

        let source = HttpPromptSource::new(Client::new(), format!("{}/prompts", server.url()));
        let err = source.generate(&purchase()).await.unwrap_err();
        assert!(matches!(err, PromptError::Status { status: 502 }));
    }

    #[tokio::test]
    async fn http_source_rejects_empty_list() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/prompts")
            .with_status(200)
            .with_body(r#"{"prompts":[]}"#)
            .create_async()
            .await;

        let source = HttpPromptSource::new(Client::new(), format!("{}/prompts", server.url()));
        assert!(matches!(
            source.generate(&purchase()).await,
            Err(PromptError::Empty)
        ));
    }

    #[tokio::test]
    async fn static_source_yields_fallback() {
        let prompts = StaticPromptSource.generate(&purchase()).await.unwrap();
        assert_eq!(prompts.len(), 5);
        assert_eq!(prompts[0], "Will this purchase bring long-term value?");
    }
}
