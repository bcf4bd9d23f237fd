use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::models::{Envelope, EpisodeListData, SearchData, SeasonInfoData, SubtitleTrack, TimelineData};
use super::{CatalogSource, Endpoint, EpisodeList, EpisodeSubtitles, Search, SeasonInfo, SubtitleSource, Timeline};
use crate::app_config::ApiConfig;
use crate::errors::ApiError;

/// Number of search results requested per query
const SEARCH_PAGE_SIZE: &str = "20";

/// HTTP client for the Bilibili gateway
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client for making requests
    client: Client,
    /// Gateway base URL without trailing slash
    base_url: String,
    /// Value of the `s_locale` query parameter
    locale: String,
}

impl ApiClient {
    /// Create a client from the API configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            locale: config.locale.clone(),
        })
    }

    /// Fetch and decode one endpoint
    pub async fn get<E: Endpoint>(&self, query: &[(&str, &str)]) -> Result<E::Data, ApiError> {
        let url = format!("{}{}", self.base_url, E::PATH);
        debug!("GET {} {:?}", url, query);

        let body = self.request(&url, query).await?;
        decode_envelope::<E::Data>(&body)
    }

    pub async fn timeline(&self) -> Result<TimelineData, ApiError> {
        self.get::<Timeline>(&[]).await
    }

    pub async fn search(&self, keyword: &str) -> Result<SearchData, ApiError> {
        self.get::<Search>(&[
            ("keyword", keyword),
            ("platform", "web"),
            ("pn", "1"),
            ("ps", SEARCH_PAGE_SIZE),
            ("s_locale", self.locale.as_str()),
        ])
        .await
    }

    // @returns: Response body of a successful GET
    async fn request(&self, url: &str, query: &[(&str, &str)]) -> Result<Bytes, ApiError> {
        let response = self.client.get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            error!("Bilibili API error ({}) for {}", status, url);
            return Err(ApiError::HttpStatus { status_code: status.as_u16() });
        }

        response.bytes().await.map_err(ApiError::from)
    }
}

/// Decode a response envelope and unwrap its payload
pub fn decode_envelope<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let envelope: Envelope<T> = serde_json::from_slice(body)
        .map_err(|e| ApiError::ParseError(e.to_string()))?;

    if envelope.code != 0 {
        return Err(ApiError::Api { code: envelope.code, message: envelope.message });
    }

    envelope.data
        .ok_or_else(|| ApiError::ParseError("response has no data field".to_string()))
}

#[async_trait]
impl SubtitleSource for ApiClient {
    async fn episode_subtitles(&self, episode_id: &str) -> Result<Vec<SubtitleTrack>, ApiError> {
        let data = self.get::<EpisodeSubtitles>(&[("s_locale", self.locale.as_str()), ("ep_id", episode_id)])
            .await?;
        Ok(data.subtitles)
    }

    async fn fetch_payload(&self, url: &str) -> Result<Bytes, ApiError> {
        debug!("Downloading subtitle payload {}", url);
        self.request(url, &[]).await
    }
}

#[async_trait]
impl CatalogSource for ApiClient {
    async fn season_info(&self, season_id: &str) -> Result<SeasonInfoData, ApiError> {
        self.get::<SeasonInfo>(&[("s_locale", self.locale.as_str()), ("season_id", season_id)])
            .await
    }

    async fn episode_list(&self, season_id: &str) -> Result<EpisodeListData, ApiError> {
        self.get::<EpisodeList>(&[("s_locale", self.locale.as_str()), ("season_id", season_id)])
            .await
    }
}
