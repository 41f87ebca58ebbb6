use leptos::prelude::*;

use crate::components::home::Home;
use crate::storage::LocalStorageSession;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <main class="page">
            <Home session=LocalStorageSession::default() />
        </main>
    }
}
