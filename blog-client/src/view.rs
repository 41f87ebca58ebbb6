//! Модель отображения главной страницы.
//!
//! Не зависит от способа вывода: CLI печатает её через `Display`,
//! другие фронтенды могут строить разметку по полям.

use std::fmt;

use crate::home::HomeState;
use crate::models::Post;

/// Сколько символов содержимого показывать в карточке.
pub const PREVIEW_CHARS: usize = 150;

const PAGE_TITLE: &str = "Blog Posts";
const SEARCH_PLACEHOLDER: &str = "Search by title";
const EMPTY_MESSAGE: &str = "No posts available";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Цель навигации. Сама навигация выполняется вызывающей стороной.
pub enum Route {
    /// Страница входа.
    Login,
    /// Страница регистрации.
    Register,
    /// Создание поста.
    Create,
    /// Просмотр поста.
    Post(String),
    /// Редактирование поста.
    Edit(String),
}

impl Route {
    /// Путь для роутера.
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Create => "/create".to_string(),
            Self::Post(id) => format!("/post/{id}"),
            Self::Edit(id) => format!("/edit/{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Верхний блок страницы.
pub enum Header {
    /// Приветствие и кнопка выхода.
    Greeting {
        /// Имя авторизованного пользователя.
        username: String,
    },
    /// Кнопки входа и регистрации.
    Anonymous {
        /// Вход.
        login: Route,
        /// Регистрация.
        register: Route,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Кнопки, доступные только автору поста.
pub struct OwnerControls {
    /// Переход к редактированию.
    pub edit: Route,
    /// Можно ли сейчас нажать «удалить».
    pub delete_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Карточка поста в списке.
pub struct PostCard {
    /// Идентификатор поста.
    pub id: String,
    /// Заголовок.
    pub title: String,
    /// Начало содержимого.
    pub preview: String,
    /// Переход к полному тексту.
    pub read_more: Route,
    /// Кнопки автора, если пост принадлежит текущему пользователю.
    pub owner_controls: Option<OwnerControls>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Список постов или сообщение о пустом списке.
pub enum Body {
    /// Нет постов для показа.
    Empty,
    /// По карточке на каждый отфильтрованный пост.
    Cards(Vec<PostCard>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Загруженная страница.
pub struct LoadedView {
    /// Приветствие или кнопки входа.
    pub header: Header,
    /// Значение поля поиска.
    pub search_term: String,
    /// Текст баннера ошибки.
    pub error_banner: Option<String>,
    /// Кнопка создания поста.
    pub create: Route,
    /// Посты.
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Что показывает главная страница.
pub enum HomeView {
    /// Идёт загрузка: только индикатор.
    Loading,
    /// Страница загружена.
    Loaded(LoadedView),
}

/// Первые [`PREVIEW_CHARS`] символов содержимого и многоточие.
pub fn preview(content: &str) -> String {
    let mut preview: String = content.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

impl PostCard {
    fn from_post(post: &Post, state: &HomeState) -> Self {
        let owner_controls = state.owns(post).then(|| OwnerControls {
            edit: Route::Edit(post.id.clone()),
            delete_enabled: !state.is_delete_pending(&post.id),
        });

        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            preview: preview(&post.content),
            read_more: Route::Post(post.id.clone()),
            owner_controls,
        }
    }
}

impl HomeView {
    /// Строит модель отображения по снимку состояния.
    pub fn from_state(state: &HomeState) -> Self {
        if state.loading {
            return Self::Loading;
        }

        let header = match &state.user {
            Some(user) => Header::Greeting {
                username: user.username.clone(),
            },
            None => Header::Anonymous {
                login: Route::Login,
                register: Route::Register,
            },
        };

        let body = if state.filtered_posts.is_empty() {
            Body::Empty
        } else {
            Body::Cards(
                state
                    .filtered_posts
                    .iter()
                    .map(|post| PostCard::from_post(post, state))
                    .collect(),
            )
        };

        Self::Loaded(LoadedView {
            header,
            search_term: state.search_term.clone(),
            error_banner: state.error.clone(),
            create: Route::Create,
            body,
        })
    }
}

impl fmt::Display for HomeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{PAGE_TITLE}")?;
        writeln!(f)?;

        let view = match self {
            Self::Loading => return writeln!(f, "Loading..."),
            Self::Loaded(view) => view,
        };

        match &view.header {
            Header::Greeting { username } => {
                writeln!(f, "Welcome, {username}!")?;
                writeln!(f, "[Logout]")?;
            }
            Header::Anonymous { login, register } => {
                writeln!(f, "[Login] {}  [Register] {}", login.path(), register.path())?;
            }
        }
        writeln!(f)?;

        if view.search_term.is_empty() {
            writeln!(f, "{SEARCH_PLACEHOLDER}: -")?;
        } else {
            writeln!(f, "{SEARCH_PLACEHOLDER}: {}", view.search_term)?;
        }

        if let Some(error) = &view.error_banner {
            writeln!(f, "! {error}")?;
        }
        writeln!(f, "[Create New Post] {}", view.create.path())?;
        writeln!(f)?;

        let cards = match &view.body {
            Body::Empty => return writeln!(f, "{EMPTY_MESSAGE}"),
            Body::Cards(cards) => cards,
        };

        for card in cards {
            writeln!(f, "# {}", card.title)?;
            writeln!(f, "  {}", card.preview)?;
            write!(f, "  [Read More] {}", card.read_more.path())?;
            if let Some(controls) = &card.owner_controls {
                write!(f, "  [Edit] {}", controls.edit.path())?;
                if controls.delete_enabled {
                    write!(f, "  [Delete] id={}", card.id)?;
                } else {
                    write!(f, "  [Deleting...]")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
