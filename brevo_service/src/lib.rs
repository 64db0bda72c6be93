pub mod lists;

use std::time::Duration;

use anyhow::Context;
use reqwest::{header, StatusCode};
use serde::Serialize;

use shared_lib::env_utils;
use shared_lib::structs::Donor;

const CONTACTS_PATH: &str = "/v3/contacts";
const LISTS_PATH: &str = "/v3/contacts/lists";

/// Body of `POST /v3/contacts`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpsertRequest {
    pub email: String,
    pub attributes: ContactAttributes,
    pub list_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct ContactAttributes {
    pub firstname: String,
    pub lastname: String,
}

impl ContactUpsertRequest {
    pub fn new(donor: &Donor, list_id: i64) -> Self {
        Self {
            email: donor.email.clone(),
            attributes: ContactAttributes {
                firstname: donor.first_name.clone(),
                lastname: donor.last_name.clone(),
            },
            list_ids: vec![list_id],
        }
    }
}

/// Whatever Brevo answered. The status is not interpreted here.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub status: StatusCode,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct BrevoClient {
    client: reqwest::Client,
    base_url: String,
}

impl BrevoClient {
    /// `timeout` of `None` leaves reqwest's default behaviour in place
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().context("Failed to build Brevo http client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(
            env_utils::get_brevo_api_base_url(),
            env_utils::get_brevo_timeout(),
        )
    }

    /// Single attempt, no retries. Errors only when the request could not be
    /// completed, a 4xx/5xx answer is returned as a normal response.
    pub async fn upsert_contact(
        &self,
        api_key: &str,
        contact: &ContactUpsertRequest,
    ) -> Result<ProviderResponse, reqwest::Error> {
        let url = format!("{}{}", self.base_url, CONTACTS_PATH);
        tracing::debug!("Sending contact {} to {}", contact.email, url);

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .header("api-key", api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .json(contact)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::trace!("Brevo answered {} for {}: {}", status, contact.email, body);

        Ok(ProviderResponse { status, body })
    }
}
