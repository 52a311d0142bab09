use blog_types::Post;
use leptos::prelude::*;
use leptos_router::{components::A, hooks::use_params_map};

use crate::pages::blog_list::format_date;
use crate::routes::HOME;

#[server]
pub async fn get_post(id: String) -> Result<Option<Post>, ServerFnError> {
    crate::auth::server::services()?
        .db
        .get_post(&id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[component]
pub fn BlogPostPage() -> impl IntoView {
    let params = use_params_map();
    #[allow(unused_variables)]
    let postId = move || params.read().get("id").unwrap_or_default();

    #[allow(unused_variables)]
    let (post, setPost) = signal(Option::<Result<Option<Post>, String>>::None);

    #[cfg(feature = "hydrate")]
    {
        use wasm_bindgen_futures::spawn_local;

        // Refetch when navigating between posts without leaving the view.
        Effect::new(move |_| {
            let id = postId();
            setPost.set(None);
            spawn_local(async move {
                let result = get_post(id).await.map_err(|e| e.to_string());
                setPost.set(Some(result));
            });
        });
    }

    view! {
        <A href=HOME.href(&[])>"\u{2190} All posts"</A>
        {move || {
            match post.get() {
                None => {
                    view! {
                        <div class="loading">
                            <div class="spinner"></div>
                            "Loading post..."
                        </div>
                    }
                        .into_any()
                }
                Some(Err(e)) => {
                    view! {
                        <div class="card">
                            <p class="form-error">"Failed to load post: " {e}</p>
                        </div>
                    }
                        .into_any()
                }
                Some(Ok(None)) => view! { <div class="card">"Post not found."</div> }.into_any(),
                Some(Ok(Some(post))) => {
                    view! {
                        <article class="post">
                            <h1>{post.title.clone()}</h1>
                            <p class="post-meta">
                                {post.author_name.clone()} " \u{00B7} "
                                {format_date(&post.created_at)}
                            </p>
                            <div class="post-content">{post.content.clone()}</div>
                        </article>
                    }
                        .into_any()
                }
            }
        }}
    }
}
