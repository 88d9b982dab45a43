//! HTTP client for the OTM saved-query search API.
//!
//! Every dispatch resolves to an envelope value: transport failures and HTTP
//! error statuses are captured into the envelope's error field instead of
//! propagating, so one failing query never aborts its siblings.

use crate::config::{
    MAX_BULK_TERMS, OTM_DOMAIN, OtmConfig, SEARCH_EXPAND, SEARCH_FIELDS, SearchKind,
};
use crate::errors::OtmError;
use crate::normalize::{normalize_shipment, truncate_chars};
use crate::protocol::{
    BulkResult, HealthStatus, QueryResult, SavedQueryResponse, SearchResult, ShipmentRecord,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Timeout for one saved-query dispatch or trigger POST.
pub(crate) const DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the 1-item health probe.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Characters of an upstream error body kept in a query error message.
const ERROR_BODY_LIMIT: usize = 200;

/// Client for the external OTM instance. Cheap to clone; per-request working
/// data is owned by the caller's task and discarded after serialization.
#[derive(Clone)]
pub struct OtmClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: Arc<OtmConfig>,
}

impl OtmClient {
    pub fn new(config: OtmConfig) -> Result<Self, OtmError> {
        // TLS verification is intentionally disabled for these upstreams.
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Runs one saved query and wraps the outcome in a result envelope.
    pub async fn fetch_query(&self, query_name: &str, term: &str) -> QueryResult {
        let url = format!(
            "{}/logisticsRestApi/resources-int/v2/custom-actions/savedQueries/shipments/{}/{}",
            self.config.base_url, OTM_DOMAIN, query_name
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("fields", SEARCH_FIELDS),
                ("expand", SEARCH_EXPAND),
                ("parameterValue", term),
            ])
            .basic_auth(&self.config.username, Some(&self.config.password))
            .timeout(DISPATCH_TIMEOUT)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(query = query_name, error = %e, "saved query dispatch failed");
                return QueryResult::failed(query_name, e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(query = query_name, status = status.as_u16(), "saved query rejected");
            return QueryResult::failed(
                query_name,
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    truncate_chars(&body, ERROR_BODY_LIMIT)
                ),
            );
        }

        let data: SavedQueryResponse = match response.json().await {
            Ok(data) => data,
            Err(e) => return QueryResult::failed(query_name, e.to_string()),
        };

        let items: Vec<ShipmentRecord> = data.items.iter().map(normalize_shipment).collect();
        QueryResult {
            query: query_name.to_string(),
            count: data.count.unwrap_or(items.len() as u64),
            has_more: data.has_more,
            items,
            error: None,
        }
    }

    /// Searches one term across the kind's saved queries in parallel and
    /// merges the results, deduplicating by shipment identifier.
    pub async fn search(&self, kind: SearchKind, term: &str) -> SearchResult {
        let term = term.trim().to_string();
        let query_names = kind.query_names();

        let mut join_set = JoinSet::new();
        let mut task_slots: HashMap<tokio::task::Id, usize> = HashMap::new();
        for (slot, name) in query_names.iter().enumerate() {
            let client = self.clone();
            let name = *name;
            let term = term.clone();
            let handle =
                join_set.spawn(async move { (slot, client.fetch_query(name, &term).await) });
            task_slots.insert(handle.id(), slot);
        }

        // Completion order is irrelevant; slots keep envelopes in query-list
        // order, which fixes dedup precedence.
        let mut envelopes: Vec<QueryResult> = query_names
            .iter()
            .map(|name| QueryResult::failed(name, "query task did not complete".to_string()))
            .collect();
        while let Some(joined) = join_set.join_next_with_id().await {
            match joined {
                Ok((_, (slot, envelope))) => envelopes[slot] = envelope,
                Err(e) => {
                    tracing::error!(error = %e, "query task panicked");
                    if let Some(slot) = task_slots.get(&e.id()) {
                        envelopes[*slot] =
                            QueryResult::failed(query_names[*slot], format!("task failed: {e}"));
                    }
                }
            }
        }

        // First occurrence wins, scanning envelopes in query-list order and
        // items in response order.
        let mut seen: HashSet<Option<String>> = HashSet::new();
        let mut merged: Vec<ShipmentRecord> = Vec::new();
        for envelope in &envelopes {
            for item in &envelope.items {
                if seen.insert(item.shipment_xid.clone()) {
                    merged.push(item.clone());
                }
            }
        }

        SearchResult {
            search_type: kind.as_str().to_string(),
            search_value: term,
            total_count: merged.len() as u64,
            queries: envelopes.iter().map(QueryResult::summary).collect(),
            errors: envelopes.iter().filter_map(|e| e.error.clone()).collect(),
            items: merged,
        }
    }

    /// Searches every term of a comma-separated list concurrently.
    ///
    /// Totals are intentionally not deduplicated across terms: the same
    /// shipment may legitimately surface under multiple search terms.
    pub async fn bulk_search(
        &self,
        kind: SearchKind,
        raw_terms: &str,
    ) -> Result<BulkResult, OtmError> {
        let terms: Vec<String> = raw_terms
            .split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_string)
            .collect();

        if terms.is_empty() {
            return Err(OtmError::NoSearchValues);
        }
        if terms.len() > MAX_BULK_TERMS {
            return Err(OtmError::TooManySearchValues);
        }

        let mut join_set = JoinSet::new();
        for (slot, term) in terms.iter().enumerate() {
            let client = self.clone();
            let term = term.clone();
            join_set.spawn(async move { (slot, client.search(kind, &term).await) });
        }

        let mut collected: Vec<Option<SearchResult>> = Vec::new();
        collected.resize_with(terms.len(), || None);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((slot, result)) => collected[slot] = Some(result),
                Err(e) => tracing::error!(error = %e, "bulk term task panicked"),
            }
        }

        let results: Vec<SearchResult> = collected
            .into_iter()
            .enumerate()
            .map(|(slot, result)| {
                result.unwrap_or_else(|| SearchResult {
                    search_type: kind.as_str().to_string(),
                    search_value: terms[slot].clone(),
                    total_count: 0,
                    queries: Vec::new(),
                    errors: vec!["search task did not complete".to_string()],
                    items: Vec::new(),
                })
            })
            .collect();

        Ok(BulkResult {
            search_type: kind.as_str().to_string(),
            term_count: results.len(),
            total_count: results.iter().map(|result| result.total_count).sum(),
            results,
        })
    }

    /// 1-item probe against the shipments resource.
    pub async fn health(&self) -> HealthStatus {
        let url = format!(
            "{}/logisticsRestApi/resources-int/v2/shipments",
            self.config.base_url
        );
        let probe = self
            .http
            .get(&url)
            .query(&[("limit", "1")])
            .basic_auth(&self.config.username, Some(&self.config.password))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await;

        match probe {
            Ok(response) => HealthStatus {
                status: "ok",
                otm_http: Some(response.status().as_u16()),
                detail: None,
            },
            Err(e) => HealthStatus {
                status: "error",
                otm_http: None,
                detail: Some(e.to_string()),
            },
        }
    }
}
