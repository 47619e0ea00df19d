use crate::archive::StatusSource;
use crate::models::{Account, Status, Visibility};
use anyhow::{Context, Result};
use reqwest::header::AUTHORIZATION;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct NewStatus<'a> {
    status: &'a str,
    visibility: &'a str,
}

/// Minimal Mastodon REST client: everything the bot needs and nothing more.
pub struct Mastodon {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl Mastodon {
    pub fn new(base_url: &str, access_token: &str) -> Self {
        Mastodon {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Verify the access token and return the bot's own account.
    pub async fn verify_credentials(&self) -> Result<Account> {
        let url = format!("{}/api/v1/accounts/verify_credentials", self.base_url);

        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.bearer())
            .send()
            .await
            .context("Mastodon verify credentials request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Mastodon verify credentials error {status}: {text}");
        }

        let account: Account = resp.json().await.context("parse account")?;
        Ok(account)
    }

    /// One page of the account's statuses. `max_id` is the pagination
    /// cursor: pass the id of the last status of the previous page.
    pub async fn account_statuses(
        &self,
        account_id: &str,
        max_id: Option<&str>,
        limit: u32,
        exclude_replies: bool,
        exclude_reblogs: bool,
    ) -> Result<Vec<Status>> {
        let url = format!("{}/api/v1/accounts/{}/statuses", self.base_url, account_id);

        let mut query: Vec<(&str, String)> = vec![("limit", limit.to_string())];
        if let Some(max_id) = max_id {
            query.push(("max_id", max_id.to_string()));
        }
        if exclude_replies {
            query.push(("exclude_replies", "true".to_string()));
        }
        if exclude_reblogs {
            query.push(("exclude_reblogs", "true".to_string()));
        }

        let resp = self
            .client
            .get(&url)
            .query(&query)
            .header(AUTHORIZATION, self.bearer())
            .send()
            .await
            .context("Mastodon account statuses request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Mastodon account statuses error {status}: {text}");
        }

        let statuses: Vec<Status> = resp.json().await.context("parse account statuses")?;
        Ok(statuses)
    }

    /// Post a new status.
    pub async fn post_status(&self, body: &str, visibility: Visibility) -> Result<()> {
        let url = format!("{}/api/v1/statuses", self.base_url);

        let new_status = NewStatus {
            status: body,
            visibility: visibility.as_str(),
        };

        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.bearer())
            .json(&new_status)
            .send()
            .await
            .context("Mastodon post status failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Mastodon post error {status}: {text}");
        }

        Ok(())
    }

    /// Replace the account bio.
    pub async fn update_bio(&self, note: &str) -> Result<()> {
        let url = format!("{}/api/v1/accounts/update_credentials", self.base_url);

        let resp = self
            .client
            .patch(&url)
            .header(AUTHORIZATION, self.bearer())
            .form(&[("note", note)])
            .send()
            .await
            .context("Mastodon update credentials failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Mastodon update credentials error {status}: {text}");
        }

        Ok(())
    }
}

impl StatusSource for Mastodon {
    async fn verify_credentials(&self) -> Result<Account> {
        Mastodon::verify_credentials(self).await
    }

    async fn account_statuses(
        &self,
        account_id: &str,
        max_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Status>> {
        Mastodon::account_statuses(self, account_id, max_id, limit, false, false).await
    }
}
