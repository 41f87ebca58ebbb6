use leptos::prelude::*;

use crate::models::{Post, edit_path, is_owner, post_path, preview};
use crate::state::HomeState;

#[component]
pub(crate) fn PostCard(post: Post, state: HomeState, on_delete: Callback<String>) -> impl IntoView {
    let post_id = post.id.clone();
    let owner_id = post.owner_id.clone();
    let edit_href = edit_path(&post_id);

    let owned = move || state.user.with(|user| is_owner(user.as_ref(), &owner_id));

    view! {
        <div class="card retro-card">
            <h3 class="retro-card-title">{post.title}</h3>
            <p>{preview(&post.content)}</p>
            <div class="card-actions">
                <a href=post_path(&post_id)><button>"Read More"</button></a>
                <Show when=owned>
                    <a href=edit_href.clone()><button>"Edit"</button></a>
                    <button
                        class="danger"
                        on:click={
                            let id = post_id.clone();
                            move |_| on_delete.run(id.clone())
                        }
                        disabled={
                            let id = post_id.clone();
                            move || state.pending_deletes.with(|pending| pending.contains(&id))
                        }
                    >
                        "Delete"
                    </button>
                </Show>
            </div>
        </div>
    }
}
