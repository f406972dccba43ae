use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::warn;

use super::{backoff, build_client, is_retryable, NlpError, Translator, MAX_RETRIES};
use crate::cache::{CacheStats, SingleFlightCache};
use crate::config::TranslatorConfig;

/// DeepL REST `/v2/translate` backend.
#[derive(Clone)]
pub struct DeepLTranslator {
    api_key: Option<String>,
    api_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

impl DeepLTranslator {
    pub fn new(config: &TranslatorConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            client: build_client(config.timeout),
        }
    }

    pub fn is_available(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    async fn post_with_retry(&self, api_key: &str, form: &[(&str, &str)]) -> Result<DeepLResponse, NlpError> {
        let mut retry = 0;
        loop {
            let sent = self
                .client
                .post(&self.api_url)
                .header(reqwest::header::AUTHORIZATION, format!("DeepL-Auth-Key {api_key}"))
                .form(form)
                .send()
                .await;
            let err = match sent {
                Ok(resp) if resp.status().is_success() => return Ok(resp.json::<DeepLResponse>().await?),
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    if !is_retryable(status) {
                        return Err(NlpError::HttpStatus { status, body });
                    }
                    NlpError::HttpStatus { status, body }
                }
                Err(e) => NlpError::Request(e),
            };
            if retry >= MAX_RETRIES {
                return Err(err);
            }
            warn!(retry, error = %err, "translation request failed, retrying");
            sleep(backoff(retry)).await;
            retry += 1;
        }
    }
}

#[async_trait]
impl Translator for DeepLTranslator {
    async fn translate(&self, text: &str, source: Option<&str>, target: &str) -> Result<String, NlpError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(NlpError::NotConfigured("DEEPL_API_KEY"))?;
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let target = target.to_uppercase();
        let source = source.map(str::to_uppercase);
        let mut form = vec![("text", text), ("target_lang", target.as_str())];
        if let Some(source) = source.as_deref() {
            form.push(("source_lang", source));
        }

        let resp = self.post_with_retry(api_key, &form).await?;
        resp.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or(NlpError::Empty("DeepL"))
    }
}

type TranslationKey = (String, Option<String>, String);

/// Bounded single-flight memo in front of any translator.
pub struct CachedTranslator {
    inner: Arc<dyn Translator>,
    cache: SingleFlightCache<TranslationKey, String>,
}

impl CachedTranslator {
    pub fn new(inner: Arc<dyn Translator>, capacity: usize) -> Self {
        Self {
            inner,
            cache: SingleFlightCache::new(capacity),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[async_trait]
impl Translator for CachedTranslator {
    async fn translate(&self, text: &str, source: Option<&str>, target: &str) -> Result<String, NlpError> {
        let key = (
            text.to_string(),
            source.map(str::to_lowercase),
            target.to_lowercase(),
        );
        self.cache
            .get_or_try_insert_with(key, || self.inner.translate(text, source, target))
            .await
    }
}
