//! Supabase storage backend

use super::traits::{validate_object_name, ObjectStore};
use super::types::{StorageError, StorageResult};
use crate::config::{Secret, StorageSettings};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;

/// Object store backed by the Supabase storage HTTP API
///
/// Writes go to `POST {project}/storage/v1/object/{bucket}/{name}` with the
/// service key; the bucket is expected to be public, so the object is read
/// back from `{project}/storage/v1/object/public/{bucket}/{name}`.
#[derive(Debug, Clone)]
pub struct SupabaseObjectStore {
    http: reqwest::Client,
    project_url: String,
    service_key: Secret,
}

impl SupabaseObjectStore {
    /// Creates a store for the given project
    #[must_use]
    pub fn new(http: reqwest::Client, project_url: impl Into<String>, service_key: Secret) -> Self {
        Self {
            http,
            project_url: project_url.into().trim_end_matches('/').to_string(),
            service_key,
        }
    }

    /// Builds a store from storage settings
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` if the project URL or service key
    /// is missing
    pub fn from_settings(http: reqwest::Client, settings: &StorageSettings) -> StorageResult<Self> {
        let project_url = settings
            .supabase_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| StorageError::Configuration("storage.supabase_url is not set".into()))?;
        let service_key = settings
            .supabase_service_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                StorageError::Configuration("storage.supabase_service_key is not set".into())
            })?;

        Ok(Self::new(http, project_url, service_key))
    }

    /// Builds a store whose writes are bounded by `storage.fetch_timeout_secs`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` if settings are missing or the
    /// HTTP client cannot be built
    pub fn connect(settings: &StorageSettings) -> StorageResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.fetch_timeout())
            .build()
            .map_err(|e| StorageError::Configuration(e.to_string()))?;
        Self::from_settings(http, settings)
    }

    fn object_endpoint(&self, bucket: &str, name: &str) -> String {
        format!("{}/storage/v1/object/{bucket}/{name}", self.project_url)
    }
}

#[async_trait]
impl ObjectStore for SupabaseObjectStore {
    async fn put(
        &self,
        bucket: &str,
        name: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<()> {
        validate_object_name(bucket)?;
        validate_object_name(name)?;

        let response = self
            .http
            .post(self.object_endpoint(bucket, name))
            .bearer_auth(self.service_key.expose())
            .header("apikey", self.service_key.expose())
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Write(format!("{status}: {body}")));
        }

        Ok(())
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{name}", self.project_url)
    }
}
