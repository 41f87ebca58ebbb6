use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `blog-client`.
pub enum BlogClientError {
    /// Ошибка HTTP-транспорта или декодирования ответа (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация (отсутствует/некорректен токен, 401/403).
    #[error("unauthorized")]
    Unauthorized(Option<String>),

    /// Запрошенный ресурс не найден (404).
    #[error("not found")]
    NotFound(Option<String>),

    /// Сервер ответил другим не-2xx статусом.
    #[error("api error: http status {status}")]
    Api {
        /// HTTP-статус ответа.
        status: u16,
        /// Сообщение из тела ответа, если сервер его прислал.
        message: Option<String>,
    },

    /// Ошибка хранилища токена.
    #[error("credential storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Результат операций `blog-client`.
pub type BlogClientResult<T> = Result<T, BlogClientError>;

impl BlogClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        let message = message.filter(|message| !message.trim().is_empty());
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized(message)
            }
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }

    /// Сообщение, присланное сервером в поле `message` тела ошибки.
    ///
    /// Пустые сообщения не сохраняются, поэтому `Some` всегда содержит
    /// непустую строку.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(message) | Self::NotFound(message) => message.as_deref(),
            Self::Api { message, .. } => message.as_deref(),
            Self::Http(_) | Self::Storage(_) => None,
        }
    }
}
