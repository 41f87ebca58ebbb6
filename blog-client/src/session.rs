//! Хранилища токена доступа.
//!
//! Главная страница не владеет токеном: она получает провайдер при
//! создании и только читает/очищает его через [`CredentialStore`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::error::BlogClientResult;

/// Файл с токеном по умолчанию.
pub const DEFAULT_TOKEN_FILE: &str = ".blog_token";

/// Провайдер токена доступа.
pub trait CredentialStore: Send + Sync {
    /// Текущий токен, если он сохранён и не пустой.
    fn get(&self) -> Option<String>;

    /// Сохраняет токен.
    fn set(&self, token: &str) -> BlogClientResult<()>;

    /// Удаляет токен. Отсутствие токена не считается ошибкой.
    fn clear(&self) -> BlogClientResult<()>;
}

pub(crate) fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[derive(Debug, Default)]
/// Токен в памяти процесса.
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Пустое хранилище (анонимная сессия).
    pub fn new() -> Self {
        Self::default()
    }

    /// Хранилище с заранее сохранённым токеном.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(parse_token_content(&token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: &str) -> BlogClientResult<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = parse_token_content(token);
        Ok(())
    }

    fn clear(&self) -> BlogClientResult<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Токен в файле на диске.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Хранилище поверх указанного файла. Файл создаётся при первом `set`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Путь к файлу с токеном.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileCredentialStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_FILE)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => parse_token_content(&raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read token file");
                None
            }
        }
    }

    fn set(&self, token: &str) -> BlogClientResult<()> {
        fs::write(&self.path, token.trim())?;
        Ok(())
    }

    fn clear(&self) -> BlogClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
