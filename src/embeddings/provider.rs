use crate::error::{DocscopeError, Result};
use serde::Deserialize;

/// Text → vector capability. Built once by the command layer and passed by
/// reference to whatever needs to embed text.
pub enum EmbeddingProvider {
    OpenAI { api_key: String, dimensions: usize },
    Gemini { api_key: String },
    OllamaLocal { model: String },
}

const DEFAULT_OLLAMA_MODEL: &str = "nomic-embed-text";

impl EmbeddingProvider {
    /// Create provider from environment
    pub fn from_env(dimensions: usize) -> Result<Self> {
        // Try OpenAI first
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            return Ok(Self::OpenAI {
                api_key: key,
                dimensions,
            });
        }

        // Try Gemini
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            return Ok(Self::Gemini { api_key: key });
        }

        // Fall back to Ollama
        Ok(Self::OllamaLocal {
            model: ollama_model(),
        })
    }

    /// Create a provider by name, reading its key from the environment
    pub fn from_name(name: &str, dimensions: usize) -> Result<Self> {
        match name {
            "openai" => {
                let key = std::env::var("OPENAI_API_KEY")
                    .map_err(|_| DocscopeError::Config("OPENAI_API_KEY not set".into()))?;
                Ok(Self::OpenAI {
                    api_key: key,
                    dimensions,
                })
            }
            "gemini" => {
                let key = std::env::var("GEMINI_API_KEY")
                    .map_err(|_| DocscopeError::Config("GEMINI_API_KEY not set".into()))?;
                Ok(Self::Gemini { api_key: key })
            }
            "ollama" => Ok(Self::OllamaLocal {
                model: ollama_model(),
            }),
            _ => Err(DocscopeError::Config(format!("Unknown provider: {}", name))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAI { .. } => "openai",
            Self::Gemini { .. } => "gemini",
            Self::OllamaLocal { .. } => "ollama",
        }
    }

    /// Generate embeddings for a batch of texts
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self {
            Self::OpenAI {
                api_key,
                dimensions,
            } => self.embed_openai(texts, api_key, *dimensions).await,
            Self::Gemini { api_key } => self.embed_gemini(texts, api_key).await,
            Self::OllamaLocal { model } => self.embed_ollama(texts, model).await,
        }
    }

    /// Generate embedding for single text
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let batch = self.embed_batch(&[text.to_string()]).await?;
        batch
            .into_iter()
            .next()
            .ok_or_else(|| DocscopeError::Embedding("No embedding returned".into()))
    }

    async fn embed_openai(
        &self,
        texts: &[String],
        api_key: &str,
        dimensions: usize,
    ) -> Result<Vec<Vec<f32>>> {
        #[derive(Deserialize)]
        struct EmbeddingResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let client = reqwest::Client::new();
        let response = client
            .post("https://api.openai.com/v1/embeddings")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&serde_json::json!({
                "model": "text-embedding-3-small",
                "input": texts,
                "dimensions": dimensions,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DocscopeError::Embedding(format!("OpenAI API error: {}", text)));
        }

        let result: EmbeddingResponse = response.json().await?;
        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn embed_gemini(&self, texts: &[String], api_key: &str) -> Result<Vec<Vec<f32>>> {
        let client = reqwest::Client::new();
        let mut embeddings = Vec::new();

        for text in texts {
            let response = client
                .post(format!(
                    "https://generativelanguage.googleapis.com/v1/models/text-embedding-004:embedContent?key={}",
                    api_key
                ))
                .json(&serde_json::json!({
                    "content": {
                        "parts": [{
                            "text": text
                        }]
                    }
                }))
                .send()
                .await?;

            if !response.status().is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(DocscopeError::Embedding(format!("Gemini API error: {}", text)));
            }

            let result: serde_json::Value = response.json().await?;
            embeddings.push(float_array(
                result.get("embedding").and_then(|e| e.get("values")),
                "Gemini",
            )?);
        }

        Ok(embeddings)
    }

    async fn embed_ollama(&self, texts: &[String], model: &str) -> Result<Vec<Vec<f32>>> {
        let endpoint = std::env::var("OLLAMA_HOST")
            .unwrap_or_else(|_| "http://localhost:11434".to_string());
        let client = reqwest::Client::new();
        let mut embeddings = Vec::new();

        for text in texts {
            let response = client
                .post(format!("{}/api/embeddings", endpoint.trim_end_matches('/')))
                .json(&serde_json::json!({
                    "model": model,
                    "prompt": text,
                }))
                .send()
                .await?;

            if !response.status().is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(DocscopeError::Embedding(format!("Ollama API error: {}", text)));
            }

            let result: serde_json::Value = response.json().await?;
            embeddings.push(float_array(result.get("embedding"), "Ollama")?);
        }

        Ok(embeddings)
    }
}

fn ollama_model() -> String {
    std::env::var("DOCSCOPE_OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string())
}

fn float_array(value: Option<&serde_json::Value>, provider: &str) -> Result<Vec<f32>> {
    let values = value.and_then(|v| v.as_array()).ok_or_else(|| {
        DocscopeError::Embedding(format!("Invalid {} embedding response", provider))
    })?;
    let embedding: Vec<f32> = values
        .iter()
        .filter_map(|v| v.as_f64().map(|f| f as f32))
        .collect();
    if embedding.is_empty() {
        return Err(DocscopeError::Embedding(format!(
            "{} returned an empty embedding",
            provider
        )));
    }
    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_name() {
        assert!(matches!(
            EmbeddingProvider::from_name("word2vec", 768),
            Err(DocscopeError::Config(_))
        ));
    }

    #[test]
    fn test_ollama_by_name_needs_no_key() {
        let provider = EmbeddingProvider::from_name("ollama", 768).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_float_array_parses_numbers() {
        let value = serde_json::json!([0.5, -1, 2.25]);
        assert_eq!(
            float_array(Some(&value), "test").unwrap(),
            vec![0.5, -1.0, 2.25]
        );
    }

    #[test]
    fn test_float_array_rejects_missing_and_empty() {
        assert!(float_array(None, "test").is_err());
        let empty = serde_json::json!([]);
        assert!(float_array(Some(&empty), "test").is_err());
    }
}
