use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::{
    components::{Route, Router, Routes},
    ParamSegment, StaticSegment,
};

use crate::auth::AuthProvider;
use crate::components::nav::Nav;
use crate::pages::blog_list::BlogListPage;
use crate::pages::blog_post::BlogPostPage;

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

/// Mirrors `routes::ROUTES`: `/` lists posts, `/post/:id` shows one.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Stylesheet id="leptos" href="/pkg/quill-blog.css" />
        <Title text="Quill" />
        <AuthProvider>
            <Router>
                <Nav />
                <main class="main-content">
                    <Routes fallback=|| view! { <p>"Page not found."</p> }.into_any()>
                        <Route path=StaticSegment("") view=BlogListPage />
                        <Route path=(StaticSegment("post"), ParamSegment("id")) view=BlogPostPage />
                    </Routes>
                </main>
            </Router>
        </AuthProvider>
    }
}
