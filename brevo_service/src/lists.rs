use std::collections::BTreeMap;

use anyhow::Context;
use reqwest::header;
use serde::Deserialize;

use crate::{BrevoClient, LISTS_PATH};

#[derive(Deserialize, Debug)]
struct ListsResponse {
    lists: Vec<ContactList>,
}

#[derive(Deserialize, Debug)]
struct ContactList {
    id: i64,
    name: String,
}

impl BrevoClient {
    /// Contact lists on the account, id → name. Only used to fill the settings
    /// dropdown, so any failure is logged and yields an empty map.
    pub async fn get_lists(&self, api_key: &str) -> BTreeMap<i64, String> {
        match self.fetch_lists(api_key).await {
            Ok(lists) => lists,
            Err(e) => {
                tracing::warn!("Failed to fetch Brevo contact lists: {:?}", e);
                BTreeMap::new()
            }
        }
    }

    async fn fetch_lists(&self, api_key: &str) -> anyhow::Result<BTreeMap<i64, String>> {
        let url = format!("{}{}", self.base_url, LISTS_PATH);

        let resp = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .header("api-key", api_key)
            .send()
            .await
            .context("Failed to send request")?;

        let text = resp.text().await.context("Failed to get Brevo lists")?;
        let lists: ListsResponse =
            serde_json::from_str(&text).context("Failed to deserialize JSON")?;

        Ok(lists
            .lists
            .into_iter()
            .map(|list| (list.id, list.name))
            .collect())
    }
}
