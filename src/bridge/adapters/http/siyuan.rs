//! SiYuan kernel API client implementing the editor host port.

use async_trait::async_trait;
use reqwest::{Client, header::AUTHORIZATION};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::bridge::{
    domain::BlockId,
    ports::{EditorHost, EditorHostError, EditorHostResult},
};

/// Address of a locally running SiYuan kernel.
pub const DEFAULT_SIYUAN_URL: &str = "http://127.0.0.1:6806";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Editor host backed by the SiYuan kernel HTTP API.
#[derive(Debug, Clone)]
pub struct SiyuanEditorHost {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl SiyuanEditorHost {
    /// Creates a client for the kernel at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorHostError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(base_url: impl Into<String>) -> EditorHostResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(EditorHostError::transport)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: None,
        })
    }

    /// Sends `Authorization: Token <token>` with every request.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|value| !value.trim().is_empty());
        self
    }

    /// Posts `body` to a kernel endpoint and unwraps the `{code, msg, data}`
    /// envelope.
    async fn call<T>(&self, path: &str, body: &Value) -> EditorHostResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Token {token}"));
        }

        let response = request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(EditorHostError::transport)?;
        let envelope: KernelResponse<T> =
            response.json().await.map_err(EditorHostError::transport)?;

        if envelope.code != 0 {
            return Err(EditorHostError::rejected(envelope.code, envelope.msg));
        }
        Ok(envelope.data)
    }
}

#[derive(Debug, Deserialize)]
struct KernelResponse<T> {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default = "Option::default")]
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct BlockKramdown {
    #[serde(default)]
    kramdown: String,
}

#[derive(Debug, Deserialize)]
struct ParentRow {
    #[serde(default)]
    parent_id: String,
}

#[async_trait]
impl EditorHost for SiyuanEditorHost {
    #[instrument(skip_all, fields(block_id = %id))]
    async fn block_content(&self, id: &BlockId) -> EditorHostResult<Option<String>> {
        let block: Option<BlockKramdown> = self
            .call("/api/block/getBlockKramdown", &json!({ "id": id.as_str() }))
            .await?;
        Ok(block
            .map(|block| block.kramdown)
            .filter(|kramdown| !kramdown.is_empty()))
    }

    #[instrument(skip_all, fields(block_id = %id))]
    async fn update_block_content(&self, id: &BlockId, content: &str) -> EditorHostResult<()> {
        let _: Option<Value> = self
            .call(
                "/api/block/updateBlock",
                &json!({ "id": id.as_str(), "dataType": "markdown", "data": content }),
            )
            .await?;
        debug!("updated block");
        Ok(())
    }

    #[instrument(skip_all, fields(block_id = %id))]
    async fn parent_id(&self, id: &BlockId) -> EditorHostResult<Option<BlockId>> {
        // BlockId only admits [A-Za-z0-9-], so it cannot break out of the literal.
        let statement = format!("SELECT parent_id FROM blocks WHERE id = '{id}'");
        let rows: Option<Vec<ParentRow>> = self
            .call("/api/query/sql", &json!({ "stmt": statement }))
            .await?;
        Ok(rows
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|row| BlockId::new(row.parent_id).ok()))
    }
}
