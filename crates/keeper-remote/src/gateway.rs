//! [`RemoteGateway`] over the OpenSearch REST API

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use keeper_core::{
    Environment, Error, RemoteDocument, RemoteGateway, ResourceBody, ResourceKind, Result,
    Revision,
};
use reqwest::Method;
use serde_json::{Value, json};

use crate::client::{HttpClient, Response};

/// Page size when listing ISM policies
const POLICY_PAGE_SIZE: usize = 200;

/// Gateway for one environment and one resource kind.
pub struct OpenSearchGateway {
    client: HttpClient,
    kind: ResourceKind,
}

impl OpenSearchGateway {
    /// Build a client for `env` and verify the cluster is reachable.
    ///
    /// Fails with [`Error::Connection`] if the cluster cannot be reached or
    /// rejects the credentials.
    pub fn connect(env: &Environment, kind: ResourceKind) -> Result<Self> {
        let client = HttpClient::from_environment(env)?;
        client.ping()?;
        tracing::info!(environment = %env.name, url = %client.base_url(), %kind, "connected");
        Ok(Self::with_client(client, kind))
    }

    /// Wrap an existing client without pinging.
    pub fn with_client(client: HttpClient, kind: ResourceKind) -> Self {
        Self { client, kind }
    }

    fn request(
        &self,
        method: Method,
        name: Option<&str>,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Response> {
        let mut segments: Vec<&str> = self.kind.info().api_path.split('/').collect();
        segments.extend(name);
        let url = self.client.url(&segments, query)?;
        self.client.send(method, url, body)
    }

    fn not_found(&self, name: &str) -> Error {
        Error::NotFound {
            kind: self.kind,
            name: name.to_string(),
        }
    }

    /// Map 404 to `NotFound` and other failures to `Api`.
    fn expect_success(&self, response: Response, name: &str) -> Result<Response> {
        match response.status {
            200..=299 => Ok(response),
            404 => Err(self.not_found(name)),
            _ => Err(response.into_api_error()),
        }
    }

    fn list_templates(&self) -> Result<BTreeSet<String>> {
        let response = self.request(Method::GET, None, &[], None)?;
        if !response.is_success() {
            return Err(response.into_api_error());
        }
        let templates = response.body["index_templates"]
            .as_array()
            .ok_or_else(|| unexpected("index_templates"))?;
        Ok(templates
            .iter()
            .filter_map(|t| t["name"].as_str())
            .map(str::to_string)
            .collect())
    }

    fn list_policies(&self) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        let mut from = 0;
        loop {
            let query = [
                ("size", POLICY_PAGE_SIZE.to_string()),
                ("from", from.to_string()),
            ];
            let response = self.request(Method::GET, None, &query, None)?;
            if response.status == 404 {
                // Plugin answers 404 when no policy has ever been created
                return Ok(names);
            }
            if !response.is_success() {
                return Err(response.into_api_error());
            }

            let page = response.body["policies"]
                .as_array()
                .ok_or_else(|| unexpected("policies"))?;
            names.extend(
                page.iter()
                    .filter_map(|p| p["_id"].as_str())
                    .map(str::to_string),
            );

            from += page.len();
            let total = response.body["total_policies"].as_u64().unwrap_or(0) as usize;
            if page.is_empty() || from >= total {
                return Ok(names);
            }
        }
    }

    fn get_template(&self, name: &str) -> Result<RemoteDocument> {
        let response = self.request(Method::GET, Some(name), &[], None)?;
        let response = self.expect_success(response, name)?;
        let template = response.body["index_templates"]
            .as_array()
            .and_then(|all| all.iter().find(|t| t["name"] == name))
            .ok_or_else(|| self.not_found(name))?;
        let body = as_body(&template["index_template"], "index_template")?;
        Ok(RemoteDocument::new(body))
    }

    fn get_policy(&self, name: &str) -> Result<RemoteDocument> {
        let response = self.request(Method::GET, Some(name), &[], None)?;
        let response = self.expect_success(response, name)?;
        let body = as_body(&response.body["policy"], "policy")?;
        let revision = Revision {
            seq_no: response.body["_seq_no"].as_u64(),
            primary_term: response.body["_primary_term"].as_u64(),
            last_updated: body
                .get("last_updated_time")
                .and_then(Value::as_i64)
                .and_then(DateTime::<Utc>::from_timestamp_millis),
        };
        Ok(RemoteDocument {
            body,
            revision: Some(revision),
        })
    }
}

impl RemoteGateway for OpenSearchGateway {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn list_names(&self) -> Result<BTreeSet<String>> {
        match self.kind {
            ResourceKind::Template => self.list_templates(),
            ResourceKind::IsmPolicy => self.list_policies(),
        }
    }

    fn get(&self, name: &str) -> Result<RemoteDocument> {
        match self.kind {
            ResourceKind::Template => self.get_template(name),
            ResourceKind::IsmPolicy => self.get_policy(name),
        }
    }

    fn put(&self, name: &str, body: &ResourceBody, expected: Option<&Revision>) -> Result<()> {
        let (payload, query) = match self.kind {
            ResourceKind::Template => (Value::Object(body.clone()), Vec::new()),
            ResourceKind::IsmPolicy => {
                let query = match expected {
                    Some(Revision {
                        seq_no: Some(seq_no),
                        primary_term: Some(primary_term),
                        ..
                    }) => vec![
                        ("if_seq_no", seq_no.to_string()),
                        ("if_primary_term", primary_term.to_string()),
                    ],
                    _ => Vec::new(),
                };
                (json!({ "policy": body }), query)
            }
        };

        let response = self.request(Method::PUT, Some(name), &query, Some(&payload))?;
        if !response.is_success() {
            return Err(response.into_api_error());
        }
        tracing::debug!(kind = %self.kind, resource = name, "put resource");
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        let response = self.request(Method::DELETE, Some(name), &[], None)?;
        self.expect_success(response, name)?;
        Ok(())
    }
}

fn as_body(value: &Value, field: &str) -> Result<ResourceBody> {
    value
        .as_object()
        .cloned()
        .ok_or_else(|| unexpected(field))
}

fn unexpected(field: &str) -> Error {
    Error::Api {
        status: 200,
        reason: format!("unexpected response: missing '{}'", field),
    }
}
