// security/src/directory.rs

use async_trait::async_trait;
use log::{debug, warn};
use models::NetId;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::AuthError;

/// The fields used from a directory record. Other fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryPerson {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

/// Looks up profile details for a net id after SSO login.
#[async_trait]
pub trait DirectoryLookup: Send + Sync + 'static {
    async fn find_person(&self, net_id: &NetId) -> Result<Option<DirectoryPerson>, AuthError>;
}

/// Client for the Yalies people API.
pub struct DirectoryClient {
    http: reqwest::Client,
    people_url: String,
    api_key: Option<String>,
}

impl DirectoryClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        DirectoryClient {
            http: reqwest::Client::new(),
            people_url: format!("{}/people", base_url.trim_end_matches('/')),
            api_key,
        }
    }
}

#[async_trait]
impl DirectoryLookup for DirectoryClient {
    async fn find_person(&self, net_id: &NetId) -> Result<Option<DirectoryPerson>, AuthError> {
        let mut request = self
            .http
            .post(&self.people_url)
            .json(&json!({ "query": "", "filters": { "netid": net_id.as_str() } }));
        match &self.api_key {
            Some(key) => request = request.bearer_auth(key),
            None => warn!("No directory API key configured; lookup of {} will likely fail", net_id),
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Directory(e.to_string()))?;
        if !response.status().is_success() {
            return Err(AuthError::Directory(format!(
                "directory returned HTTP {}",
                response.status()
            )));
        }
        let people: Vec<DirectoryPerson> = response
            .json()
            .await
            .map_err(|e| AuthError::Directory(e.to_string()))?;
        debug!("Directory returned {} record(s) for {}", people.len(), net_id);

        // Net ids are unique.
        Ok(people.into_iter().next())
    }
}
