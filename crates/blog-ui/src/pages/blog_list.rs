use blog_types::Post;
use leptos::prelude::*;
use leptos_router::components::A;

use crate::auth::use_auth;
use crate::routes::post_href;

#[server]
pub async fn get_posts() -> Result<Vec<Post>, ServerFnError> {
    crate::auth::server::services()?
        .db
        .list_posts()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[server]
pub async fn create_post(title: String, content: String) -> Result<Post, ServerFnError> {
    use blog_types::PostDraft;

    let session = crate::auth::server::caller_session()?
        .ok_or_else(|| ServerFnError::new("sign in to publish"))?;
    let draft = PostDraft { title, content };

    crate::auth::server::services()?
        .db
        .create_post(&draft, &session)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

/// `2024-03-01T10:00:00Z` -> `2024-03-01`.
pub(crate) fn format_date(timestamp: &str) -> String {
    timestamp.split('T').next().unwrap_or_default().to_string()
}

#[component]
pub fn BlogListPage() -> impl IntoView {
    let auth = use_auth();
    let createAction = ServerAction::<CreatePost>::new();
    let createValue = createAction.value();

    #[allow(unused_variables)]
    let (posts, setPosts) = signal(Option::<Result<Vec<Post>, String>>::None);

    #[cfg(feature = "hydrate")]
    {
        use wasm_bindgen_futures::spawn_local;

        // Fetch on mount and again after every publish.
        Effect::new(move |_| {
            createAction.version().get();
            spawn_local(async move {
                let result = get_posts().await.map_err(|e| e.to_string());
                setPosts.set(Some(result));
            });
        });
    }

    let createError = move || {
        createValue
            .get()
            .and_then(|result| result.err())
            .map(|e| e.to_string())
    };

    view! {
        <div class="page-header">
            <h1>"Latest posts"</h1>
        </div>

        <Show when=move || auth.user.get().is_some()>
            <div class="card">
                <div class="card-title">"New post"</div>
                {move || createError().map(|e| view! { <div class="form-error">{e}</div> })}
                <ActionForm action=createAction>
                    <div class="form-group">
                        <label for="title">"Title"</label>
                        <input type="text" id="title" name="title" required />
                    </div>
                    <div class="form-group">
                        <label for="content">"Content"</label>
                        <textarea id="content" name="content" rows="6" required></textarea>
                    </div>
                    <button type="submit" class="btn btn-primary">
                        "Publish"
                    </button>
                </ActionForm>
            </div>
        </Show>

        {move || {
            match posts.get() {
                None => {
                    view! {
                        <div class="loading">
                            <div class="spinner"></div>
                            "Loading posts..."
                        </div>
                    }
                        .into_any()
                }
                Some(Err(e)) => {
                    view! {
                        <div class="card">
                            <p class="form-error">"Failed to load posts: " {e}</p>
                        </div>
                    }
                        .into_any()
                }
                Some(Ok(list)) if list.is_empty() => {
                    view! { <div class="card">"No posts yet."</div> }.into_any()
                }
                Some(Ok(list)) => {
                    view! {
                        <ul class="post-list">
                            {list
                                .into_iter()
                                .map(|post| {
                                    view! {
                                        <li class="post-item">
                                            <A href=post_href(&post.id)>{post.title.clone()}</A>
                                            <span class="post-meta">
                                                {post.author_name.clone()} " \u{00B7} "
                                                {format_date(&post.created_at)}
                                            </span>
                                        </li>
                                    }
                                })
                                .collect_view()}
                        </ul>
                    }
                        .into_any()
                }
            }
        }}
    }
}
