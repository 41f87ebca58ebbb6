use serde::Deserialize;

pub(crate) const POSTS_ERROR: &str = "Error fetching posts";
pub(crate) const PROFILE_ERROR: &str = "Error fetching user profile";
pub(crate) const DELETE_ERROR: &str = "Error deleting post";

const PREVIEW_CHARS: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "user", alias = "owner_id", alias = "ownerId")]
    pub owner_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PostLists {
    pub(crate) all: Vec<Post>,
    pub(crate) filtered: Vec<Post>,
}

impl PostLists {
    pub(crate) fn new(posts: Vec<Post>, term: &str) -> Self {
        Self {
            filtered: filter_posts(&posts, term),
            all: posts,
        }
    }

    pub(crate) fn refilter(&mut self, term: &str) {
        self.filtered = filter_posts(&self.all, term);
    }

    pub(crate) fn remove(&mut self, id: &str) {
        self.all.retain(|post| post.id != id);
        self.filtered.retain(|post| post.id != id);
    }
}

pub(crate) fn filter_posts(posts: &[Post], term: &str) -> Vec<Post> {
    let needle = term.to_lowercase();
    posts
        .iter()
        .filter(|post| post.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub(crate) fn preview(content: &str) -> String {
    let mut preview: String = content.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

pub(crate) fn is_owner(user: Option<&User>, post_owner_id: &str) -> bool {
    user.is_some_and(|user| user.id == post_owner_id)
}

/// Токен из хранилища; пустая строка означает его отсутствие.
pub(crate) fn parse_token(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

pub(crate) fn post_path(id: &str) -> String {
    format!("/post/{id}")
}

pub(crate) fn edit_path(id: &str) -> String {
    format!("/edit/{id}")
}
