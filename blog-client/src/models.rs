use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Публичная модель пользователя.
pub struct User {
    /// Идентификатор пользователя (непрозрачная строка).
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Логин.
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста (непрозрачная строка).
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Заголовок поста.
    pub title: String,
    /// Содержимое поста.
    #[serde(default)]
    pub content: String,
    /// Идентификатор автора.
    #[serde(rename = "user", alias = "owner_id", alias = "ownerId")]
    pub owner_id: String,
}

impl Post {
    /// Совпадает ли заголовок с поисковым запросом без учёта регистра.
    ///
    /// `needle` ожидается уже приведённым к нижнему регистру.
    pub(crate) fn title_matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
    }
}
