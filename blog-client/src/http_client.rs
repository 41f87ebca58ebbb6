use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;

use crate::api::{AUTH_TOKEN_HEADER, BlogApi};
use crate::error::{BlogClientError, BlogClientResult};
use crate::models::{Post, User};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Таймаут запроса по умолчанию.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    message: Option<String>,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API блога.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера и таймаутом
    /// по умолчанию.
    pub fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Создаёт HTTP-клиент с заданным таймаутом на весь запрос.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> BlogClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Базовый URL, с которым создан клиент.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn decode_error(response: reqwest::Response) -> BlogClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body.message,
            Err(_) => None,
        };
        BlogClientError::from_http_status(status, message)
    }

    /// отправляет запрос и проверяет статус ответа
    async fn send(request: RequestBuilder) -> BlogClientResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(BlogClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn get_json<TRes>(&self, path: &str, token: Option<&str>) -> BlogClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(%url, authorized = token.is_some(), "GET");

        let mut request = self.client.request(Method::GET, url);
        if let Some(token) = token {
            request = request.header(AUTH_TOKEN_HEADER, token);
        }

        Self::send(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(BlogClientError::from_reqwest)
    }
}

#[async_trait]
impl BlogApi for HttpClient {
    async fn list_posts(&self) -> BlogClientResult<Vec<Post>> {
        self.get_json("/posts", None).await
    }

    async fn fetch_profile(&self, token: &str) -> BlogClientResult<User> {
        self.get_json("/auth/profile", Some(token)).await
    }

    async fn delete_post(&self, token: &str, id: &str) -> BlogClientResult<()> {
        let url = self.endpoint(&format!("/posts/{id}"));
        debug!(%url, post_id = id, "DELETE");

        let request = self
            .client
            .request(Method::DELETE, url)
            .header(AUTH_TOKEN_HEADER, token);

        // тело успешного ответа не используется
        Self::send(request).await?;
        Ok(())
    }
}
