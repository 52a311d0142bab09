use leptos::prelude::*;
use leptos_router::{components::A, hooks::use_location};

use crate::auth::use_auth;
use crate::routes::{resolve, RouteView, HOME};

#[component]
pub fn Nav() -> impl IntoView {
    let auth = use_auth();
    let location = use_location();
    let onHome = move || {
        resolve(&location.pathname.get()).is_some_and(|m| m.entry.view == RouteView::BlogList)
    };

    let signInValue = auth.sign_in.value();
    let signInError = move || {
        signInValue
            .get()
            .and_then(|result| result.err())
            .map(|e| e.to_string())
    };

    view! {
        <nav class="nav-bar">
            <div class="nav-brand">
                <A href=HOME.href(&[])>"Quill"</A>
            </div>
            <ul class="nav-links">
                <li class="nav-item" class:active=onHome>
                    <A href=HOME.href(&[])>"Posts"</A>
                </li>
            </ul>
            <div class="nav-auth">
                {move || match auth.user.get() {
                    Some(user) => {
                        view! {
                            <span class="nav-user">{user.label().to_string()}</span>
                            <ActionForm action=auth.sign_out>
                                <button type="submit" class="btn">"Sign out"</button>
                            </ActionForm>
                        }
                            .into_any()
                    }
                    None => {
                        view! {
                            {signInError().map(|e| view! { <span class="form-error">{e}</span> })}
                            <ActionForm action=auth.sign_in>
                                <input
                                    type="password"
                                    name="id_token"
                                    placeholder="Google ID token"
                                    required
                                />
                                <button type="submit" class="btn btn-primary">
                                    "Sign in with Google"
                                </button>
                            </ActionForm>
                        }
                            .into_any()
                    }
                }}
            </div>
        </nav>
    }
}
