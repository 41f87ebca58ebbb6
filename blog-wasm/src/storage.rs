use crate::models::parse_token;

const TOKEN_KEY: &str = "token";

fn local_storage() -> Result<web_sys::Storage, String> {
    let window = web_sys::window().ok_or_else(|| "window is not available".to_string())?;
    window
        .local_storage()
        .map_err(|_| "failed to access localStorage".to_string())?
        .ok_or_else(|| "localStorage is not available".to_string())
}

/// Токен доступа в `localStorage` под одним ключом.
///
/// Передаётся в `Home` снаружи, страница сама к `localStorage` не ходит.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalStorageSession {
    key: &'static str,
}

impl Default for LocalStorageSession {
    fn default() -> Self {
        Self { key: TOKEN_KEY }
    }
}

impl LocalStorageSession {
    pub(crate) fn get(&self) -> Option<String> {
        let raw = local_storage().ok()?.get_item(self.key).ok()??;
        parse_token(&raw)
    }

    pub(crate) fn clear(&self) -> Result<(), String> {
        local_storage()?
            .remove_item(self.key)
            .map_err(|_| "failed to clear token".to_string())
    }
}

