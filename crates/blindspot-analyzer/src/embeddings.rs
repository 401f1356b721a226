//! TEI (Text Embeddings Inference) client for article vectors.

use std::time::Duration;

use serde::Serialize;

use crate::error::AnalyzerError;

/// Maximum number of texts per /embed call.
const BATCH_SIZE: usize = 64;

/// TEI HTTP client.
///
/// Posts to the `/embed` endpoint of a TEI server. Use
/// [`EmbeddingClient::new`] with the configured service URL; tests point it
/// at a wiremock server.
pub struct EmbeddingClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [&'a str],
}

impl EmbeddingClient {
    /// Creates a new client for the TEI server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, AnalyzerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/embed", base_url.trim_end_matches('/')),
        })
    }

    /// Generates embeddings for a batch of texts.
    ///
    /// Texts are batched into groups of [`BATCH_SIZE`] (64) per request.
    /// Returns one embedding vector per input text, in the same order.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Embedding`] if a request fails, the server
    /// answers with a non-success status, the response cannot be parsed, or
    /// the vector count does not match the input count.
    pub async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AnalyzerError> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let request = EmbedRequest { inputs: chunk };
            let response = self
                .client
                .post(&self.url)
                .json(&request)
                .send()
                .await
                .map_err(|e| AnalyzerError::Embedding(format!("TEI request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(AnalyzerError::Embedding(format!(
                    "TEI returned status {}",
                    response.status()
                )));
            }

            let embeddings: Vec<Vec<f32>> = response
                .json()
                .await
                .map_err(|e| AnalyzerError::Embedding(format!("TEI response parse error: {e}")))?;

            if embeddings.len() != chunk.len() {
                return Err(AnalyzerError::Embedding(format!(
                    "TEI returned {} embeddings for {} inputs",
                    embeddings.len(),
                    chunk.len()
                )));
            }

            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }
}
