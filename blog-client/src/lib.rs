//! Клиентская библиотека главной страницы блога.
//!
//! Состоит из:
//! - HTTP-клиента REST API (`reqwest`) за трейтом [`BlogApi`];
//! - провайдеров токена доступа ([`CredentialStore`]);
//! - контроллера главной страницы ([`HomeController`]): загрузка постов и
//!   профиля, поиск по заголовку, удаление поста, выход;
//! - модели отображения ([`HomeView`]).
#![warn(missing_docs)]

mod api;
mod error;
mod home;
mod http_client;
mod models;
mod session;
mod view;

pub use api::{AUTH_TOKEN_HEADER, BlogApi};
pub use error::{BlogClientError, BlogClientResult};
pub use home::{
    DELETE_ERROR, DeleteOutcome, HomeController, HomeState, POSTS_ERROR, PROFILE_ERROR,
    filter_posts,
};
pub use http_client::{DEFAULT_REQUEST_TIMEOUT, HttpClient};
pub use models::{Post, User};
pub use session::{
    CredentialStore, DEFAULT_TOKEN_FILE, FileCredentialStore, MemoryCredentialStore,
};
pub use view::{
    Body, Header, HomeView, LoadedView, OwnerControls, PREVIEW_CHARS, PostCard, Route, preview,
};
