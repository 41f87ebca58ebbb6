use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::ev::SubmitEvent;
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::components::post_card::PostCard;
use crate::models::{DELETE_ERROR, POSTS_ERROR, PROFILE_ERROR};
use crate::state::HomeState;
use crate::storage::LocalStorageSession;

#[component]
pub(crate) fn Home(session: LocalStorageSession) -> impl IntoView {
    let state = HomeState::new();

    // после размонтирования ответы сервера больше не трогают сигналы
    let disposed = Arc::new(AtomicBool::new(false));
    on_cleanup({
        let disposed = disposed.clone();
        move || disposed.store(true, Ordering::Relaxed)
    });

    spawn_local({
        let disposed = disposed.clone();
        async move {
            let result = api::list_posts().await;
            if disposed.load(Ordering::Relaxed) {
                return;
            }
            match result {
                Ok(posts) => state.set_posts(posts),
                Err(err) => {
                    warn!("failed to fetch posts: {err}");
                    state.set_error(POSTS_ERROR);
                }
            }
            state.loading.set(false);
        }
    });

    if let Some(token) = session.get() {
        let disposed = disposed.clone();
        spawn_local(async move {
            let result = api::fetch_profile(&token).await;
            if disposed.load(Ordering::Relaxed) {
                return;
            }
            // пользователь успел выйти, пока шёл запрос
            if session.get().as_deref() != Some(token.as_str()) {
                return;
            }
            match result {
                Ok(user) => state.user.set(Some(user)),
                Err(err) => {
                    warn!("failed to fetch user profile: {err}");
                    state.set_error(PROFILE_ERROR);
                }
            }
        });
    }

    let on_delete = Callback::new(move |post_id: String| {
        let Some(token) = session.get() else {
            state.set_error(DELETE_ERROR);
            return;
        };
        if !state.claim_delete(&post_id) {
            return;
        }

        let disposed = disposed.clone();
        spawn_local(async move {
            let result = api::delete_post(&token, &post_id).await;
            if disposed.load(Ordering::Relaxed) {
                return;
            }
            state.release_delete(&post_id);
            match result {
                Ok(()) => state.remove_post(&post_id),
                Err(err) => {
                    warn!("failed to delete post {post_id}: {err}");
                    state.set_error(err.server_message().unwrap_or(DELETE_ERROR));
                }
            }
        });
    });

    let on_logout = move |_| {
        if let Err(err) = session.clear() {
            warn!("{err}");
        }
        state.user.set(None);
    };

    view! {
        <section class="container homepage-container">
            <header class="text-center">
                <h1 class="retro-title">"Blog Posts"</h1>
            </header>

            <Show
                when=move || !state.loading.get()
                fallback=|| view! { <div class="spinner" aria-busy="true">"Loading..."</div> }
            >
                {move || match state.user.get() {
                    Some(user) => view! {
                        <div class="greeting">
                            <p>"Welcome, " <strong>{user.username}</strong> "!"</p>
                            <button on:click=on_logout>"Logout"</button>
                        </div>
                    }
                    .into_any(),
                    None => view! {
                        <div class="auth-links">
                            <a href="/login"><button>"Login"</button></a>
                            <a href="/register"><button>"Register"</button></a>
                        </div>
                    }
                    .into_any(),
                }}

                <form on:submit=|ev: SubmitEvent| ev.prevent_default()>
                    <input
                        type="text"
                        class="retro-input"
                        placeholder="Search by title"
                        prop:value=move || state.search_term.get()
                        on:input=move |ev| state.apply_search(event_target_value(&ev))
                    />
                </form>

                <Show when=move || state.error.get().is_some()>
                    <div class="error-banner">{move || state.error.get().unwrap_or_default()}</div>
                </Show>

                <div class="text-center">
                    <a href="/create"><button>"Create New Post"</button></a>
                </div>

                {move || {
                    let posts = state.lists.with(|lists| lists.filtered.clone());
                    if posts.is_empty() {
                        view! { <div class="info-banner">"No posts available"</div> }.into_any()
                    } else {
                        view! {
                            <div class="post-grid">
                                {posts
                                    .into_iter()
                                    .map(|post| view! { <PostCard post=post state=state on_delete=on_delete /> })
                                    .collect_view()}
                            </div>
                        }
                        .into_any()
                    }
                }}
            </Show>
        </section>
    }
}
