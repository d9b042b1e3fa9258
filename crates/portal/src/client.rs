//! HTTP client for the portal.
//!
//! `PortalApi` is the seam the desk depends on; `PortalClient` is the reqwest
//! implementation. Tests substitute their own implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode, redirect};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::error::{PortalError, Result};
use crate::export::{ExportFilters, ExportRequest};
use crate::model::{
    Category, CategoryList, DashboardStats, FormReceipt, Opportunity, OpportunityList,
    PreviewPage,
};

const CSRF_COOKIE: &str = "csrftoken";
const CSRF_HEADER: &str = "X-CSRFToken";
const CSRF_FIELD: &str = "csrfmiddlewaretoken";

#[async_trait]
pub trait PortalApi: Send + Sync {
    /// `GET /api/categories/`
    async fn categories(&self) -> Result<Vec<Category>>;

    /// `GET /api/export/preview/` with the given filters.
    async fn export_preview(&self, filters: &ExportFilters) -> Result<PreviewPage>;

    /// Fetch `/export/{format}/` and store the body as `<target_dir>/<filename>.<format>`.
    async fn download_export(&self, request: &ExportRequest, target_dir: &Path)
    -> Result<PathBuf>;

    /// `GET /api/opportunities/`
    async fn opportunities(&self) -> Result<Vec<Opportunity>>;

    /// `GET /api/dashboard-stats/`
    async fn dashboard_stats(&self) -> Result<DashboardStats>;

    /// Post one of the server-rendered forms (`/signup/`, `/opportunities/add/`).
    async fn submit_form(&self, path: &str, fields: &[(String, String)]) -> Result<FormReceipt>;
}

#[derive(Debug, Clone)]
pub struct PortalClient {
    base: Url,
    http: reqwest::Client,
}

impl PortalClient {
    /// Build a client for `base_url`. A missing trailing slash is added so
    /// relative endpoint paths resolve below the base instead of replacing
    /// its last segment.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = normalize_base(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            // Django signals an accepted form with a redirect; we need to see it.
            .redirect(redirect::Policy::none())
            .user_agent(concat!("volunteer-desk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let response = check(self.http.get(url).send().await?)?;
        Ok(response.json::<T>().await?)
    }
}

/// Parse `raw` and make sure its path ends with `/`.
pub fn normalize_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(PortalError::Status {
            url: response.url().to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl PortalApi for PortalClient {
    async fn categories(&self) -> Result<Vec<Category>> {
        let list: CategoryList = self.get_json(self.endpoint("api/categories/")?).await?;
        Ok(list.categories)
    }

    async fn export_preview(&self, filters: &ExportFilters) -> Result<PreviewPage> {
        let mut url = self.endpoint("api/export/preview/")?;
        let pairs = filters.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        }
        self.get_json(url).await
    }

    async fn download_export(
        &self,
        request: &ExportRequest,
        target_dir: &Path,
    ) -> Result<PathBuf> {
        let url = request.url(&self.base)?;
        debug!(%url, "GET export");
        let response = check(self.http.get(url).send().await?)?;
        let body = response.bytes().await?;

        tokio::fs::create_dir_all(target_dir).await?;
        let target = target_dir.join(request.file_name());
        tokio::fs::write(&target, &body).await?;
        info!(path = %target.display(), bytes = body.len(), "export saved");
        Ok(target)
    }

    async fn opportunities(&self) -> Result<Vec<Opportunity>> {
        let list: OpportunityList = self.get_json(self.endpoint("api/opportunities/")?).await?;
        Ok(list.opportunities)
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.get_json(self.endpoint("api/dashboard-stats/")?).await
    }

    async fn submit_form(&self, path: &str, fields: &[(String, String)]) -> Result<FormReceipt> {
        let url = self.endpoint(path)?;

        // GET first: Django hands out the csrftoken cookie with the rendered form.
        let page = check(self.http.get(url.clone()).send().await?)?;
        let token = page
            .cookies()
            .find(|c| c.name() == CSRF_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| PortalError::MissingCsrfToken(url.to_string()))?;

        let mut form: Vec<(&str, &str)> = fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        form.push((CSRF_FIELD, token.as_str()));

        debug!(%url, fields = fields.len(), "POST form");
        let response = self
            .http
            .post(url.clone())
            .header(CSRF_HEADER, token.as_str())
            .header(reqwest::header::REFERER, url.as_str())
            .form(&form)
            .send()
            .await?;

        match response.status() {
            StatusCode::FOUND | StatusCode::SEE_OTHER => {
                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                Ok(FormReceipt::Accepted { location })
            }
            StatusCode::OK => Ok(FormReceipt::Rejected),
            other => Err(PortalError::Status {
                url: url.to_string(),
                status: other.as_u16(),
            }),
        }
    }
}
