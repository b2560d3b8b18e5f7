use std::sync::Arc;

use models::Check;
use serde::Serialize;
use tracing::{info, instrument};
use url::Url;

use crate::errors::ServiceError;
use crate::health::id::{derive_id, is_valid_id};
use crate::health::repository::CheckRepository;
use crate::pagination::{normalize_page, PageSize, PAGE_SIZE};

/// One page of registered checks.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListPage {
    pub items: Vec<Check>,
    pub page: usize,
    pub total: usize,
    pub size: usize,
}

/// Application service for the check registry.
/// Validates endpoints and ids before anything reaches the repository.
pub struct CheckService<R: CheckRepository> {
    repo: Arc<R>,
}

impl<R: CheckRepository> CheckService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Register `endpoint`. The stored endpoint is the normalized URL and the id
    /// is derived from it, so equivalent spellings of one URL collide.
    #[instrument(skip(self))]
    pub async fn create(&self, endpoint: &str) -> Result<Check, ServiceError> {
        let endpoint = normalize_endpoint(endpoint)?;
        let check = Check::created(derive_id(&endpoint), endpoint);
        self.repo.create(check.clone()).await?;
        info!(id = %check.id, endpoint = %check.endpoint, "check_registered");
        Ok(check)
    }

    #[instrument(skip(self))]
    pub async fn read(&self, id: &str) -> Result<Check, ServiceError> {
        ensure_id(id)?;
        Ok(self.repo.read(id).await?)
    }

    /// List page `page` (values below 1 mean the first page) at the fixed page size.
    pub async fn list(&self, page: i64) -> Result<ListPage, ServiceError> {
        let page = normalize_page(page);
        let (total, items) = self.repo.list(page, PageSize::Limit(PAGE_SIZE)).await?;
        Ok(ListPage { items, page, total, size: PAGE_SIZE })
    }

    /// Remove a check. Unknown ids fail with `NotFound`, matching `read`.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        ensure_id(id)?;
        if !self.repo.delete(id).await? {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        info!(%id, "check_deleted");
        Ok(())
    }
}

fn ensure_id(id: &str) -> Result<(), ServiceError> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(ServiceError::InvalidId(format!("{:?} is not a check id", id)))
    }
}

/// Parse `raw` as an absolute URL with a non-empty host and return its normalized form.
pub fn normalize_endpoint(raw: &str) -> Result<String, ServiceError> {
    if raw.is_empty() {
        return Err(ServiceError::InvalidEndpoint("endpoint is empty".into()));
    }
    // the url crate silently strips these; keep the input verbatim instead
    if raw.starts_with(' ') || raw.ends_with(' ') || raw.chars().any(|c| c.is_ascii_control()) {
        return Err(ServiceError::InvalidEndpoint("endpoint contains whitespace or control characters".into()));
    }
    // the url crate repairs `http:///host`; treat an empty authority as a missing host
    if has_empty_authority(raw) {
        return Err(ServiceError::InvalidEndpoint("endpoint has no host".into()));
    }
    let url = Url::parse(raw).map_err(|e| ServiceError::InvalidEndpoint(e.to_string()))?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url.into()),
        _ => Err(ServiceError::InvalidEndpoint("endpoint has no host".into())),
    }
}

/// `scheme://` followed directly by a path, query, fragment or nothing.
fn has_empty_authority(raw: &str) -> bool {
    let Some((_, rest)) = raw.split_once(':') else { return false };
    match rest.strip_prefix("//") {
        Some(authority) => authority.is_empty() || authority.starts_with(['/', '?', '#']),
        None => false,
    }
}
