//! Состояние и действия главной страницы блога.
//!
//! [`HomeController`] загружает посты и профиль, фильтрует посты по
//! заголовку, удаляет посты и выполняет выход. Состояние хранится в
//! `tokio::sync::watch`, каждое изменение применяется одним `send_modify`,
//! поэтому подписчики видят только согласованные снимки.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::BlogApi;
use crate::error::BlogClientResult;
use crate::models::{Post, User};
use crate::session::CredentialStore;
use crate::view::HomeView;

/// Сообщение об ошибке загрузки списка постов.
pub const POSTS_ERROR: &str = "Error fetching posts";
/// Сообщение об ошибке загрузки профиля.
pub const PROFILE_ERROR: &str = "Error fetching user profile";
/// Сообщение об ошибке удаления, если сервер не прислал своё.
pub const DELETE_ERROR: &str = "Error deleting post";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Снимок состояния главной страницы.
pub struct HomeState {
    /// Все загруженные посты.
    pub posts: Vec<Post>,
    /// Посты, заголовок которых содержит `search_term`.
    pub filtered_posts: Vec<Post>,
    /// Текущий поисковый запрос.
    pub search_term: String,
    /// Авторизованный пользователь; `None` для анонимной сессии.
    pub user: Option<User>,
    /// Последняя ошибка для баннера.
    pub error: Option<String>,
    /// Идёт начальная загрузка списка постов.
    pub loading: bool,
    /// Посты, для которых запрос на удаление ещё не завершился.
    pub pending_deletes: BTreeSet<String>,
}

impl Default for HomeState {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            filtered_posts: Vec::new(),
            search_term: String::new(),
            user: None,
            error: None,
            loading: true,
            pending_deletes: BTreeSet::new(),
        }
    }
}

impl HomeState {
    /// Принадлежит ли пост текущему пользователю.
    pub fn owns(&self, post: &Post) -> bool {
        self.user
            .as_ref()
            .is_some_and(|user| user.id == post.owner_id)
    }

    /// Ожидает ли пост завершения удаления.
    pub fn is_delete_pending(&self, id: &str) -> bool {
        self.pending_deletes.contains(id)
    }

    fn set_posts(&mut self, posts: Vec<Post>) {
        self.filtered_posts = filter_posts(&posts, &self.search_term);
        self.posts = posts;
    }

    fn apply_search(&mut self, term: String) {
        self.filtered_posts = filter_posts(&self.posts, &term);
        self.search_term = term;
    }

    fn remove_post(&mut self, id: &str) {
        self.posts.retain(|post| post.id != id);
        self.filtered_posts.retain(|post| post.id != id);
    }
}

/// Посты, в заголовке которых есть `term` без учёта регистра.
///
/// Порядок сохраняется; пустой запрос возвращает все посты.
pub fn filter_posts(posts: &[Post], term: &str) -> Vec<Post> {
    let needle = term.to_lowercase();
    posts
        .iter()
        .filter(|post| post.title_matches(&needle))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Результат [`HomeController::delete_post`].
pub enum DeleteOutcome {
    /// Сервер подтвердил удаление, пост убран из списков.
    Deleted,
    /// Удаление не удалось, текст ошибки в `HomeState::error`.
    Failed,
    /// Удаление этого поста уже выполняется, новый запрос не отправлялся.
    AlreadyPending,
    /// Страница закрыта до ответа сервера, результат отброшен.
    Cancelled,
}

#[derive(Clone)]
/// Контроллер главной страницы.
///
/// Клоны разделяют одно состояние и один токен отмены.
pub struct HomeController {
    api: Arc<dyn BlogApi>,
    session: Arc<dyn CredentialStore>,
    state: Arc<watch::Sender<HomeState>>,
    mounted: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl HomeController {
    /// Создаёт контроллер в состоянии загрузки.
    pub fn new(api: Arc<dyn BlogApi>, session: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(HomeState::default());
        Self {
            api,
            session,
            state: Arc::new(state),
            mounted: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
        }
    }

    /// Текущий снимок состояния.
    pub fn state(&self) -> HomeState {
        self.state.borrow().clone()
    }

    /// Подписка на изменения состояния.
    pub fn subscribe(&self) -> watch::Receiver<HomeState> {
        self.state.subscribe()
    }

    /// Модель отображения для текущего состояния.
    pub fn view(&self) -> HomeView {
        HomeView::from_state(&self.state.borrow())
    }

    /// Начальная загрузка: список постов и, если есть токен, профиль.
    ///
    /// Оба запроса идут параллельно и применяются по мере готовности.
    /// `loading` сбрасывается только по завершении запроса постов.
    /// Повторный вызов ничего не делает.
    pub async fn load(&self) {
        if self.mounted.swap(true, Ordering::SeqCst) {
            debug!("home view already loaded, ignoring");
            return;
        }

        tokio::join!(self.load_posts(), self.load_profile());
    }

    async fn load_posts(&self) {
        let Some(result) = self.until_cancelled(self.api.list_posts()).await else {
            debug!("post list fetch cancelled");
            return;
        };

        self.state.send_modify(|state| {
            match result {
                Ok(posts) => {
                    debug!(count = posts.len(), "posts loaded");
                    state.set_posts(posts);
                }
                Err(err) => {
                    warn!(error = %err, "failed to fetch posts");
                    state.error = Some(POSTS_ERROR.to_string());
                }
            }
            state.loading = false;
        });
    }

    async fn load_profile(&self) {
        let Some(token) = self.session.get() else {
            debug!("no credential token, skipping profile fetch");
            return;
        };

        let Some(result) = self.until_cancelled(self.api.fetch_profile(&token)).await else {
            debug!("profile fetch cancelled");
            return;
        };

        // после выхода (или смены токена) ответ относится к чужой сессии
        if self.session.get().as_deref() != Some(token.as_str()) {
            debug!("credential token changed during profile fetch, dropping result");
            return;
        }

        match result {
            Ok(user) => {
                debug!(user_id = %user.id, "profile loaded");
                self.state.send_modify(|state| state.user = Some(user));
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch user profile");
                self.set_error(PROFILE_ERROR);
            }
        }
    }

    /// Меняет поисковый запрос и пересчитывает отфильтрованные посты.
    pub fn search(&self, term: impl Into<String>) {
        let term = term.into();
        self.state.send_modify(|state| state.apply_search(term));
    }

    /// Удаляет пост на сервере и, после подтверждения, из обоих списков.
    pub async fn delete_post(&self, id: &str) -> DeleteOutcome {
        let Some(token) = self.session.get() else {
            warn!(post_id = id, "delete requested without credential token");
            self.set_error(DELETE_ERROR);
            return DeleteOutcome::Failed;
        };

        let claimed = self
            .state
            .send_if_modified(|state| state.pending_deletes.insert(id.to_string()));
        if !claimed {
            debug!(post_id = id, "delete already in flight");
            return DeleteOutcome::AlreadyPending;
        }

        let Some(result) = self
            .until_cancelled(self.api.delete_post(&token, id))
            .await
        else {
            debug!(post_id = id, "delete cancelled");
            self.state.send_modify(|state| {
                state.pending_deletes.remove(id);
            });
            return DeleteOutcome::Cancelled;
        };

        let outcome = if result.is_ok() {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::Failed
        };

        self.state.send_modify(|state| {
            state.pending_deletes.remove(id);
            match result {
                Ok(()) => {
                    debug!(post_id = id, "post deleted");
                    state.remove_post(id);
                }
                Err(err) => {
                    warn!(post_id = id, error = %err, "failed to delete post");
                    let message = err.server_message().unwrap_or(DELETE_ERROR);
                    state.error = Some(message.to_string());
                }
            }
        });

        outcome
    }

    /// Удаляет сохранённый токен и сбрасывает пользователя.
    ///
    /// Посты не перезагружаются. Пользователь сбрасывается даже если
    /// хранилище не смогло удалить токен; ошибка хранилища возвращается.
    pub fn logout(&self) -> BlogClientResult<()> {
        let cleared = self.session.clear();
        if let Err(err) = &cleared {
            warn!(error = %err, "failed to clear credential token");
        }
        self.state.send_modify(|state| state.user = None);
        cleared
    }

    /// Закрывает страницу: незавершённые запросы больше не меняют состояние.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Была ли страница закрыта.
    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn set_error(&self, message: &str) {
        self.state
            .send_modify(|state| state.error = Some(message.to_string()));
    }

    async fn until_cancelled<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            output = fut => Some(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BlogClientError;
    use crate::session::MemoryCredentialStore;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    fn post(id: &str, title: &str, owner: &str) -> Post {
        Post {
            id: id.to_string(),
            title: title.to_string(),
            content: format!("content of {id}"),
            owner_id: owner.to_string(),
        }
    }

    fn alice() -> User {
        User {
            id: "5".to_string(),
            username: "alice".to_string(),
        }
    }

    fn sample_posts() -> Vec<Post> {
        vec![post("1", "Hello World", "5"), post("2", "Goodbye", "7")]
    }

    #[derive(Default)]
    struct FakeApi {
        posts: Vec<Post>,
        fail_posts: bool,
        profile: Option<User>,
        delete_failure: Option<(u16, Option<String>)>,
        posts_gate: Option<Arc<Notify>>,
        posts_started: Option<Arc<Notify>>,
        profile_gate: Option<Arc<Notify>>,
        delete_gate: Option<Arc<Notify>>,
        profile_calls: AtomicUsize,
        delete_calls: AtomicUsize,
        last_token: std::sync::Mutex<Option<String>>,
    }

    #[async_trait]
    impl BlogApi for FakeApi {
        async fn list_posts(&self) -> BlogClientResult<Vec<Post>> {
            if let Some(started) = &self.posts_started {
                started.notify_one();
            }
            if let Some(gate) = &self.posts_gate {
                gate.notified().await;
            }
            if self.fail_posts {
                return Err(BlogClientError::from_http_status(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    None,
                ));
            }
            Ok(self.posts.clone())
        }

        async fn fetch_profile(&self, token: &str) -> BlogClientResult<User> {
            self.profile_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_token.lock().expect("lock") = Some(token.to_string());
            if let Some(gate) = &self.profile_gate {
                gate.notified().await;
            }
            self.profile
                .clone()
                .ok_or(BlogClientError::Unauthorized(None))
        }

        async fn delete_post(&self, token: &str, _id: &str) -> BlogClientResult<()> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_token.lock().expect("lock") = Some(token.to_string());
            if let Some(gate) = &self.delete_gate {
                gate.notified().await;
            }
            match &self.delete_failure {
                Some((status, message)) => Err(BlogClientError::from_http_status(
                    StatusCode::from_u16(*status).expect("valid status"),
                    message.clone(),
                )),
                None => Ok(()),
            }
        }
    }

    fn controller(api: FakeApi, token: Option<&str>) -> (HomeController, Arc<FakeApi>) {
        let api = Arc::new(api);
        let session: Arc<dyn CredentialStore> = match token {
            Some(token) => Arc::new(MemoryCredentialStore::with_token(token)),
            None => Arc::new(MemoryCredentialStore::new()),
        };
        (HomeController::new(api.clone(), session), api)
    }

    #[test]
    fn filter_posts_is_case_insensitive_substring() {
        let posts = sample_posts();
        let filtered = filter_posts(&posts, "hello");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "1");

        assert_eq!(filter_posts(&posts, "OODB").len(), 1);
        assert_eq!(filter_posts(&posts, "o").len(), 2);
        assert!(filter_posts(&posts, "missing").is_empty());
    }

    #[test]
    fn filter_posts_with_empty_term_returns_everything() {
        let posts = sample_posts();
        assert_eq!(filter_posts(&posts, ""), posts);
    }

    #[test]
    fn initial_state_is_loading() {
        let (home, _) = controller(FakeApi::default(), None);
        let state = home.state();
        assert!(state.loading);
        assert!(state.posts.is_empty());
        assert!(state.user.is_none());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn load_populates_posts_and_profile() {
        let api = FakeApi {
            posts: sample_posts(),
            profile: Some(alice()),
            ..FakeApi::default()
        };
        let (home, api) = controller(api, Some("tok"));

        home.load().await;

        let state = home.state();
        assert!(!state.loading);
        assert_eq!(state.posts, sample_posts());
        assert_eq!(state.filtered_posts, state.posts);
        assert_eq!(state.user, Some(alice()));
        assert!(state.error.is_none());
        assert_eq!(api.last_token.lock().expect("lock").as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn load_without_token_skips_profile() {
        let api = FakeApi {
            posts: sample_posts(),
            profile: Some(alice()),
            ..FakeApi::default()
        };
        let (home, api) = controller(api, None);

        home.load().await;

        assert_eq!(api.profile_calls.load(Ordering::SeqCst), 0);
        let state = home.state();
        assert!(state.user.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn posts_failure_sets_error_and_finishes_loading() {
        let api = FakeApi {
            fail_posts: true,
            ..FakeApi::default()
        };
        let (home, _) = controller(api, None);

        home.load().await;

        let state = home.state();
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some(POSTS_ERROR));
        assert!(state.posts.is_empty());
    }

    #[tokio::test]
    async fn profile_failure_sets_error_but_keeps_posts() {
        let api = FakeApi {
            posts: sample_posts(),
            profile: None,
            ..FakeApi::default()
        };
        let (home, _) = controller(api, Some("expired"));

        home.load().await;

        let state = home.state();
        assert_eq!(state.error.as_deref(), Some(PROFILE_ERROR));
        assert_eq!(state.posts.len(), 2);
        assert!(state.user.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn loading_finishes_before_profile_settles() {
        let gate = Arc::new(Notify::new());
        let api = FakeApi {
            posts: sample_posts(),
            profile: Some(alice()),
            profile_gate: Some(gate.clone()),
            ..FakeApi::default()
        };
        let (home, _) = controller(api, Some("tok"));
        let mut rx = home.subscribe();

        let task = tokio::spawn({
            let home = home.clone();
            async move { home.load().await }
        });

        let state = rx
            .wait_for(|state| !state.loading)
            .await
            .expect("sender alive")
            .clone();
        assert_eq!(state.posts.len(), 2);
        assert!(state.user.is_none());

        gate.notify_one();
        task.await.expect("load task");
        assert_eq!(home.state().user, Some(alice()));
    }

    #[tokio::test]
    async fn loading_transitions_only_once() {
        let api = FakeApi {
            posts: sample_posts(),
            ..FakeApi::default()
        };
        let (home, _) = controller(api, None);
        let mut rx = home.subscribe();

        home.load().await;
        assert!(rx.has_changed().expect("sender alive"));
        let _ = rx.borrow_and_update();

        home.load().await;
        assert!(!rx.has_changed().expect("sender alive"));
        assert!(!home.state().loading);
    }

    #[tokio::test]
    async fn search_filters_loaded_posts() {
        let api = FakeApi {
            posts: sample_posts(),
            ..FakeApi::default()
        };
        let (home, _) = controller(api, None);
        home.load().await;

        home.search("hello");
        let state = home.state();
        assert_eq!(state.search_term, "hello");
        assert_eq!(state.filtered_posts.len(), 1);
        assert_eq!(state.filtered_posts[0].id, "1");
        assert_eq!(state.posts.len(), 2);

        home.search("");
        assert_eq!(home.state().filtered_posts.len(), 2);
    }

    #[tokio::test]
    async fn search_before_posts_arrive_still_applies() {
        let api = FakeApi {
            posts: sample_posts(),
            ..FakeApi::default()
        };
        let (home, _) = controller(api, None);

        home.search("good");
        home.load().await;

        let state = home.state();
        assert_eq!(state.filtered_posts.len(), 1);
        assert_eq!(state.filtered_posts[0].id, "2");
    }

    #[tokio::test]
    async fn delete_removes_post_from_both_lists() {
        let api = FakeApi {
            posts: sample_posts(),
            profile: Some(alice()),
            ..FakeApi::default()
        };
        let (home, api) = controller(api, Some("tok"));
        home.load().await;
        home.search("o");

        let outcome = home.delete_post("1").await;

        assert_eq!(outcome, DeleteOutcome::Deleted);
        let state = home.state();
        assert_eq!(state.posts.len(), 1);
        assert!(state.posts.iter().all(|post| post.id != "1"));
        assert!(state.filtered_posts.iter().all(|post| post.id != "1"));
        assert_eq!(state.filtered_posts.len(), 1);
        assert!(state.pending_deletes.is_empty());
        assert_eq!(api.delete_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn delete_failure_shows_server_message() {
        let api = FakeApi {
            posts: sample_posts(),
            delete_failure: Some((401, Some("Not authorized".to_string()))),
            ..FakeApi::default()
        };
        let (home, _) = controller(api, Some("tok"));
        home.load().await;

        let outcome = home.delete_post("2").await;

        assert_eq!(outcome, DeleteOutcome::Failed);
        let state = home.state();
        assert_eq!(state.error.as_deref(), Some("Not authorized"));
        assert_eq!(state.posts, sample_posts());
        assert!(state.pending_deletes.is_empty());
    }

    #[tokio::test]
    async fn delete_failure_without_message_uses_generic_text() {
        let api = FakeApi {
            posts: sample_posts(),
            delete_failure: Some((500, None)),
            ..FakeApi::default()
        };
        let (home, _) = controller(api, Some("tok"));
        home.load().await;

        home.delete_post("2").await;

        assert_eq!(home.state().error.as_deref(), Some(DELETE_ERROR));
    }

    #[tokio::test]
    async fn delete_without_token_sends_nothing() {
        let api = FakeApi {
            posts: sample_posts(),
            ..FakeApi::default()
        };
        let (home, api) = controller(api, None);
        home.load().await;

        let outcome = home.delete_post("1").await;

        assert_eq!(outcome, DeleteOutcome::Failed);
        assert_eq!(api.delete_calls.load(Ordering::SeqCst), 0);
        assert_eq!(home.state().error.as_deref(), Some(DELETE_ERROR));
        assert_eq!(home.state().posts.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_delete_while_pending_is_ignored() {
        let gate = Arc::new(Notify::new());
        let api = FakeApi {
            posts: sample_posts(),
            delete_gate: Some(gate.clone()),
            ..FakeApi::default()
        };
        let (home, api) = controller(api, Some("tok"));
        home.load().await;
        let mut rx = home.subscribe();

        let first = tokio::spawn({
            let home = home.clone();
            async move { home.delete_post("1").await }
        });
        rx.wait_for(|state| state.is_delete_pending("1"))
            .await
            .expect("sender alive");

        let second = home.delete_post("1").await;
        assert_eq!(second, DeleteOutcome::AlreadyPending);

        gate.notify_one();
        assert_eq!(first.await.expect("delete task"), DeleteOutcome::Deleted);
        assert_eq!(api.delete_calls.load(Ordering::SeqCst), 1);
        assert!(!home.state().is_delete_pending("1"));
    }

    #[tokio::test]
    async fn logout_clears_token_and_user_only() {
        let api = FakeApi {
            posts: sample_posts(),
            profile: Some(alice()),
            ..FakeApi::default()
        };
        let session = Arc::new(MemoryCredentialStore::with_token("tok"));
        let home = HomeController::new(Arc::new(api), session.clone());
        home.load().await;
        home.search("hello");
        let before = home.state();

        home.logout().expect("logout");

        let after = home.state();
        assert!(session.get().is_none());
        assert!(after.user.is_none());
        assert_eq!(after.posts, before.posts);
        assert_eq!(after.filtered_posts, before.filtered_posts);
        assert_eq!(after.search_term, before.search_term);
    }

    #[tokio::test]
    async fn results_after_shutdown_are_discarded() {
        let gate = Arc::new(Notify::new());
        let started = Arc::new(Notify::new());
        let api = FakeApi {
            posts: sample_posts(),
            posts_gate: Some(gate.clone()),
            posts_started: Some(started.clone()),
            ..FakeApi::default()
        };
        let (home, _) = controller(api, None);

        let task = tokio::spawn({
            let home = home.clone();
            async move { home.load().await }
        });

        // запрос уже отправлен и ждёт ответа
        started.notified().await;
        home.shutdown();
        gate.notify_one();
        task.await.expect("load task");

        let state = home.state();
        assert!(home.is_shut_down());
        assert!(state.loading);
        assert!(state.posts.is_empty());
    }

    #[tokio::test]
    async fn profile_arriving_after_logout_is_dropped() {
        let gate = Arc::new(Notify::new());
        let api = FakeApi {
            posts: sample_posts(),
            profile: Some(alice()),
            profile_gate: Some(gate.clone()),
            ..FakeApi::default()
        };
        let session = Arc::new(MemoryCredentialStore::with_token("tok"));
        let home = HomeController::new(Arc::new(api), session.clone());
        let mut rx = home.subscribe();

        let task = tokio::spawn({
            let home = home.clone();
            async move { home.load().await }
        });
        rx.wait_for(|state| !state.loading)
            .await
            .expect("sender alive");

        home.logout().expect("logout");
        gate.notify_one();
        task.await.expect("load task");

        let state = home.state();
        assert!(session.get().is_none());
        assert!(state.user.is_none());
        assert!(state.error.is_none());
    }
}
