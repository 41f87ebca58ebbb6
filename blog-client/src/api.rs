use async_trait::async_trait;

use crate::error::BlogClientResult;
use crate::models::{Post, User};

/// Заголовок, в котором бэкенд ожидает токен доступа.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

#[async_trait]
/// Операции бэкенда, которые нужны главной странице блога.
///
/// Реализуется HTTP-клиентом ([`crate::HttpClient`]); в тестах подменяется
/// заглушкой.
pub trait BlogApi: Send + Sync {
    /// Возвращает все посты. Авторизация не требуется.
    async fn list_posts(&self) -> BlogClientResult<Vec<Post>>;

    /// Обменивает токен на профиль текущего пользователя.
    async fn fetch_profile(&self, token: &str) -> BlogClientResult<User>;

    /// Удаляет пост по идентификатору от имени владельца токена.
    async fn delete_post(&self, token: &str, id: &str) -> BlogClientResult<()>;
}
