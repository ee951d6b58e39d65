use super::excerpt;
use crate::error::{AppError, Result};
use crate::services::sentiment::analyze_texts;
use crate::types::SentimentAnalysis;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const NEWSDATA_API_URL: &str = "https://newsdata.io/api/1/news";
const REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsResponse {
    #[serde(default)]
    total_results: Option<u64>,
    #[serde(default)]
    results: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
}

impl Article {
    fn text(&self) -> String {
        format!(
            "{} {}",
            self.title.as_deref().unwrap_or_default(),
            self.description.as_deref().unwrap_or_default()
        )
    }
}

/// NewsData.io headline search, scored with the sentiment lexicon.
#[derive(Clone)]
pub struct NewsDataClient {
    client: Client,
    api_key: String,
}

impl NewsDataClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .user_agent("coinscope/0.1")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }

    /// Fetch English-language articles mentioning `keyword` and score them.
    pub async fn analyze(&self, keyword: &str) -> Result<SentimentAnalysis> {
        let response = self
            .client
            .get(NEWSDATA_API_URL)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("q", keyword),
                ("language", "en"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("NewsData rejected the API key");
            return Err(AppError::Config("NewsData API key is invalid or inactive".into()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(
                "NewsData API returned {}: {}",
                status,
                excerpt(&text)
            );
            return Err(AppError::ExternalApi(format!("NewsData API error: {}", status)));
        }

        let body: NewsResponse = response
            .json()
            .await
            .map_err(|e| AppError::MalformedResponse(format!("news search: {}", e)))?;
        Ok(score_response(&body))
    }
}

fn score_response(body: &NewsResponse) -> SentimentAnalysis {
    let texts: Vec<String> = body.results.iter().map(Article::text).collect();
    let analysis = analyze_texts(&texts, body.total_results);
    debug!(
        "NewsData: {} articles, score {:.1}",
        texts.len(),
        analysis.score
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sentiment::NO_NEWS_VERDICT;

    #[test]
    fn test_score_response() {
        let json = r#"{
            "status": "success",
            "totalResults": 57,
            "results": [
                {"title": "Solana rally continues", "description": "Strong gains across DeFi"},
                {"title": "Analysts optimistic", "description": null},
                {"title": null, "description": null}
            ]
        }"#;
        let body: NewsResponse = serde_json::from_str(json).unwrap();
        let analysis = score_response(&body);
        assert_eq!(analysis.score, 8.0);
        assert_eq!(analysis.mentions, 57);
        assert_eq!(analysis.verdict, "BULLISH");
    }

    #[test]
    fn test_score_empty_response() {
        let body: NewsResponse = serde_json::from_str(r#"{"status": "success"}"#).unwrap();
        let analysis = score_response(&body);
        assert_eq!(analysis.mentions, 0);
        assert_eq!(analysis.verdict, NO_NEWS_VERDICT);
    }
}
