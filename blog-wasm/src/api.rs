use gloo_net::http::Request;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::models::{Post, User};

const API_BASE_URL: &str = match option_env!("WASM_API_BASE_URL") {
    Some(value) => value,
    None => "http://127.0.0.1:8080",
};

const AUTH_TOKEN_HEADER: &str = "x-auth-token";

#[derive(Debug, Clone)]
pub(crate) enum ApiError {
    Network(String),
    Http { status: u16, message: Option<String> },
    Decode(String),
}

impl ApiError {
    /// Текст из поля `message` тела ошибки, если сервер его прислал.
    pub(crate) fn server_message(&self) -> Option<&str> {
        match self {
            Self::Http { message, .. } => message.as_deref(),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }
}

impl core::fmt::Display for ApiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Http { status, message } => write!(
                f,
                "http error {status}: {}",
                message.as_deref().unwrap_or("no message")
            ),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn endpoint(path: &str) -> String {
    format!(
        "{}/{}",
        API_BASE_URL.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

async fn parse_json<T: DeserializeOwned>(response: gloo_net::http::Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

async fn parse_error_body(response: gloo_net::http::Response) -> ApiError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty());

    ApiError::Http { status, message }
}

pub(crate) async fn list_posts() -> Result<Vec<Post>, ApiError> {
    let response = Request::get(&endpoint("/posts"))
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;

    if !response.ok() {
        return Err(parse_error_body(response).await);
    }

    parse_json(response).await
}

pub(crate) async fn fetch_profile(token: &str) -> Result<User, ApiError> {
    let response = Request::get(&endpoint("/auth/profile"))
        .header(AUTH_TOKEN_HEADER, token)
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;

    if !response.ok() {
        return Err(parse_error_body(response).await);
    }

    parse_json(response).await
}

pub(crate) async fn delete_post(token: &str, id: &str) -> Result<(), ApiError> {
    let response = Request::delete(&endpoint(&format!("/posts/{id}")))
        .header(AUTH_TOKEN_HEADER, token)
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;

    if !response.ok() {
        return Err(parse_error_body(response).await);
    }

    Ok(())
}
