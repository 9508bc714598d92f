// PromptReel Hosted Image Providers
// Copyright (c) 2026 Xing_The_Creator | PromptReel

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::{GenError, GenResult};

pub const POLLINATIONS_TIMEOUT: Duration = Duration::from_secs(30);
pub const HUGGINGFACE_TIMEOUT: Duration = Duration::from_secs(60);

/// A remote text-to-image endpoint returning encoded image bytes.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, seed: u64) -> GenResult<Vec<u8>>;
}

/// Build the provider chain in the configured order.
pub fn build_providers(cfg: &ProviderConfig) -> Vec<Box<dyn ImageProvider>> {
    cfg.enabled
        .iter()
        .map(|kind| -> Box<dyn ImageProvider> {
            match kind {
                ProviderKind::Pollinations => Box::new(PollinationsProvider::new(
                    &cfg.pollinations_url,
                    cfg.image_width,
                    cfg.image_height,
                )),
                ProviderKind::HuggingFace => Box::new(HuggingFaceProvider::new(
                    &cfg.huggingface_url,
                    &cfg.huggingface_model,
                    cfg.huggingface_token.clone(),
                    cfg.image_width,
                    cfg.image_height,
                )),
            }
        })
        .collect()
}

fn client_with_timeout(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_default()
}

async fn read_image_body(provider: &str, resp: reqwest::Response) -> GenResult<Vec<u8>> {
    let status = resp.status();
    if !status.is_success() {
        return Err(GenError::provider(format!("{} returned HTTP {}", provider, status)));
    }
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| GenError::provider(format!("{} body: {}", provider, e)))?;
    if bytes.is_empty() {
        return Err(GenError::provider(format!("{} returned an empty body", provider)));
    }
    Ok(bytes.to_vec())
}

pub struct PollinationsProvider {
    client: Client,
    base_url: String,
    width: u32,
    height: u32,
}

impl PollinationsProvider {
    pub fn new(base_url: &str, width: u32, height: u32) -> Self {
        Self {
            client: client_with_timeout(POLLINATIONS_TIMEOUT),
            base_url: base_url.to_string(),
            width,
            height,
        }
    }

    /// `{base}/prompt/{prompt}?width=&height=&seed=&nologo=true`
    pub fn request_url(&self, prompt: &str, seed: u64) -> GenResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GenError::config(format!("bad pollinations url '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| GenError::config(format!("pollinations url '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .push("prompt")
            .push(prompt);
        url.query_pairs_mut()
            .append_pair("width", &self.width.to_string())
            .append_pair("height", &self.height.to_string())
            .append_pair("seed", &seed.to_string())
            .append_pair("nologo", "true");
        Ok(url)
    }
}

#[async_trait]
impl ImageProvider for PollinationsProvider {
    fn name(&self) -> &str {
        "pollinations"
    }

    async fn generate(&self, prompt: &str, seed: u64) -> GenResult<Vec<u8>> {
        let url = self.request_url(prompt, seed)?;
        debug!("[GEN] GET {}", url);
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GenError::provider(format!("pollinations request: {}", e)))?;
        read_image_body(self.name(), resp).await
    }
}

pub struct HuggingFaceProvider {
    client: Client,
    base_url: String,
    model: String,
    token: Option<String>,
    width: u32,
    height: u32,
}

impl HuggingFaceProvider {
    pub fn new(base_url: &str, model: &str, token: Option<String>, width: u32, height: u32) -> Self {
        Self {
            client: client_with_timeout(HUGGINGFACE_TIMEOUT),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.trim_matches('/').to_string(),
            token,
            width,
            height,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }

    pub fn payload(&self, prompt: &str) -> serde_json::Value {
        json!({
            "inputs": prompt,
            "parameters": {
                "width": self.width,
                "height": self.height,
                "num_inference_steps": 20
            }
        })
    }
}

#[async_trait]
impl ImageProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn generate(&self, prompt: &str, _seed: u64) -> GenResult<Vec<u8>> {
        let endpoint = self.endpoint();
        debug!("[GEN] POST {}", endpoint);
        let mut req = self.client.post(&endpoint).json(&self.payload(prompt));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| GenError::provider(format!("huggingface request: {}", e)))?;
        read_image_body(self.name(), resp).await
    }
}
