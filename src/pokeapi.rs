use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{Result, ScrollError};
use crate::source::Source;
use crate::types::{Item, PageRequest, PageResult};

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

pub struct PokeApi {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for PokeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokeApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PokeApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ScrollError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn page_url(&self, request: &PageRequest) -> String {
        format!(
            "{}/pokemon?offset={}&limit={}",
            self.base_url, request.offset, request.limit
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrollError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrollError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScrollError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ScrollError::Decode(e.to_string()))
    }
}

// PokéAPI response types

#[derive(Deserialize)]
struct NamedResourceList {
    count: u32,
    results: Vec<NamedResource>,
}

#[derive(Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[async_trait]
impl Source for PokeApi {
    fn name(&self) -> &str {
        "PokéAPI"
    }

    async fn fetch_page(&self, request: &PageRequest) -> PageResult {
        let url = self.page_url(request);
        tracing::debug!(%url, page = request.page, "fetching page");

        match self.get_json::<NamedResourceList>(&url).await {
            Ok(list) => PageResult {
                items: list
                    .results
                    .into_iter()
                    .map(|r| Item {
                        name: r.name,
                        url: r.url,
                    })
                    .collect(),
                total: list.count,
                offset: request.offset,
                limit: request.limit,
                error: None,
            },
            Err(e) => {
                tracing::warn!(%url, error = %e, "page fetch failed");
                PageResult::failed(request, e.to_string())
            }
        }
    }
}
