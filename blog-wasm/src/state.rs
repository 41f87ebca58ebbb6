use std::collections::BTreeSet;

use leptos::prelude::*;

use crate::models::{Post, PostLists, User};

#[derive(Debug, Clone, Copy)]
pub(crate) struct HomeState {
    // все посты и отфильтрованные меняются одним `set`
    pub(crate) lists: RwSignal<PostLists>,
    pub(crate) search_term: RwSignal<String>,
    pub(crate) user: RwSignal<Option<User>>,
    pub(crate) error: RwSignal<Option<String>>,
    pub(crate) loading: RwSignal<bool>,
    pub(crate) pending_deletes: RwSignal<BTreeSet<String>>,
}

impl HomeState {
    pub(crate) fn new() -> Self {
        Self {
            lists: RwSignal::new(PostLists::default()),
            search_term: RwSignal::new(String::new()),
            user: RwSignal::new(None),
            error: RwSignal::new(None),
            loading: RwSignal::new(true),
            pending_deletes: RwSignal::new(BTreeSet::new()),
        }
    }

    pub(crate) fn set_error(&self, message: impl Into<String>) {
        self.error.set(Some(message.into()));
    }

    pub(crate) fn set_posts(&self, posts: Vec<Post>) {
        let term = self.search_term.get_untracked();
        self.lists.set(PostLists::new(posts, &term));
    }

    pub(crate) fn apply_search(&self, term: String) {
        self.lists.update(|lists| lists.refilter(&term));
        self.search_term.set(term);
    }

    pub(crate) fn remove_post(&self, id: &str) {
        self.lists.update(|lists| lists.remove(id));
    }

    /// Помечает пост как удаляемый. `false`, если удаление уже идёт.
    pub(crate) fn claim_delete(&self, id: &str) -> bool {
        self.pending_deletes
            .try_update(|pending| pending.insert(id.to_string()))
            .unwrap_or(false)
    }

    pub(crate) fn release_delete(&self, id: &str) {
        self.pending_deletes.update(|pending| {
            pending.remove(id);
        });
    }
}
