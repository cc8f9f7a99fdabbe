/// OpenAI-compatible generation provider
///
/// Talks to any endpoint implementing the OpenAI REST shape:
/// 1. Text: POST {base}/chat/completions → choices[0].message.content
/// 2. Images: POST {base}/images/generations → data[0].url
///
/// No retries happen here; the generator decides what a failure means.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::{ImageGenerator, TextGenerator};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    http_client: HttpClient,
    api_url: String,
    api_key: Option<String>,
    text_model: String,
    image_model: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    response_format: &'a str,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}

impl OpenAiCompatibleClient {
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        text_model: String,
        image_model: String,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
            text_model,
            image_model,
        }
    }

    async fn post_json<B: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<R> {
        let url = format!("{}/{}", self.api_url, path);

        let mut request = self.http_client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                url = %url,
                status = %status,
                body = %body,
                "Generation API request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Generation API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiCompatibleClient {
    async fn generate_text(&self, system_prompt: &str, user_prompt: &str) -> AppResult<String> {
        let request = ChatCompletionRequest {
            model: &self.text_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };

        let response: ChatCompletionResponse = self.post_json("chat/completions", &request).await?;

        first_message_content(response)
    }

    fn name(&self) -> &'static str {
        "openai-compatible"
    }
}

#[async_trait::async_trait]
impl ImageGenerator for OpenAiCompatibleClient {
    async fn generate_image(&self, prompt: &str) -> AppResult<String> {
        let request = ImageRequest {
            model: &self.image_model,
            prompt,
            response_format: "url",
            n: 1,
        };

        let response: ImageResponse = self.post_json("images/generations", &request).await?;

        first_image_url(response)
    }

    fn name(&self) -> &'static str {
        "openai-compatible"
    }
}

fn first_message_content(response: ChatCompletionResponse) -> AppResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| AppError::ExternalApi("Chat completion had no content".to_string()))
}

fn first_image_url(response: ImageResponse) -> AppResult<String> {
    response
        .data
        .into_iter()
        .next()
        .and_then(|image| image.url)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::ExternalApi("Image response had no URL".to_string()))
}
