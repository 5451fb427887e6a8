//! HTTP client for the analytics GraphQL API

use alloy_primitives::Address;
use constants::ANALYTICS_GRAPHQL_URL;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;
use util::get_current_time_seconds;

use crate::{
    errors::AnalyticsClientError,
    parsing::{parse_user_position, parse_vault_apy, parse_vault_history},
    queries::{user_position_query, vault_apy_query, vault_history_query},
    types::{TimeRange, UserPosition, VaultApy, VaultHistory},
};

/// The body of a GraphQL request
#[derive(Serialize)]
struct GraphQlRequest<'a> {
    /// The query document
    query: &'a str,
}

/// HTTP client for the analytics API
#[derive(Clone)]
pub struct AnalyticsClient {
    /// The underlying HTTP client
    client: Client,
    /// The GraphQL endpoint
    url: Url,
    /// The chain the queried vaults are deployed on
    chain_id: u64,
}

impl AnalyticsClient {
    /// Create a new analytics client
    pub fn new(url: Url, chain_id: u64) -> Self {
        Self { client: Client::new(), url, chain_id }
    }

    /// Create a client for the default analytics endpoint
    pub fn with_default_url(chain_id: u64) -> Result<Self, AnalyticsClientError> {
        let url = Url::parse(ANALYTICS_GRAPHQL_URL).map_err(AnalyticsClientError::url_build)?;
        Ok(Self::new(url, chain_id))
    }

    /// Get the current yield of a vault
    ///
    /// Returns `None` if the API does not know the vault
    #[instrument(skip_all, err, fields(vault = %vault))]
    pub async fn vault_apy(&self, vault: Address) -> Result<Option<VaultApy>, AnalyticsClientError> {
        let query = vault_apy_query(vault, self.chain_id);
        let body = self.post_query(&query).await?;
        parse_vault_apy(&body)
    }

    /// Get a vault's daily APY and deposits over the given range
    ///
    /// Returns `None` if the API does not know the vault
    #[instrument(skip_all, err, fields(vault = %vault, range = %range))]
    pub async fn vault_history(
        &self,
        vault: Address,
        range: TimeRange,
    ) -> Result<Option<VaultHistory>, AnalyticsClientError> {
        let now = get_current_time_seconds();
        let query = vault_history_query(vault, self.chain_id, range.start_timestamp(now), now);
        let body = self.post_query(&query).await?;
        parse_vault_history(&body)
    }

    /// Get a user's position in a vault over the given range
    ///
    /// A user with no position yields an empty position
    #[instrument(skip_all, err, fields(vault = %vault, user = %user, range = %range))]
    pub async fn user_position(
        &self,
        vault: Address,
        user: Address,
        range: TimeRange,
        asset_decimals: u8,
    ) -> Result<UserPosition, AnalyticsClientError> {
        let now = get_current_time_seconds();
        let start = range.start_timestamp(now);
        let query = user_position_query(vault, user, self.chain_id, start, now);
        let body = self.post_query(&query).await?;
        parse_user_position(&body, asset_decimals)
    }

    /// Post a query, returning the raw response body
    async fn post_query(&self, query: &str) -> Result<String, AnalyticsClientError> {
        debug!("posting analytics query to {}", self.url);
        let response =
            self.client.post(self.url.clone()).json(&GraphQlRequest { query }).send().await?;

        // Check for errors
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyticsClientError::StatusCode(status.as_u16(), body));
        }

        Ok(response.text().await?)
    }
}
