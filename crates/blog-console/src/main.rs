#![allow(non_snake_case)]

#[cfg(feature = "ssr")]
mod config;

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    use std::net::SocketAddr;
    use std::time::Duration;

    use axum::Router;
    use blog_api::middleware::auth::AppState;
    use blog_firebase::{spawn_token_refresher, AuthObserver, FirebaseApp};
    use blog_ui::{shell, App};
    use leptos::prelude::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};
    use tower_http::trace::TraceLayer;
    use tracing_subscriber::{fmt, EnvFilter};

    // Initialize tracing
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse config path from args
    let args: Vec<String> = std::env::args().collect();
    let configPath = if let Some(idx) = args.iter().position(|a| a == "--config") {
        args.get(idx + 1)
            .cloned()
            .unwrap_or_else(|| "config.example.toml".into())
    } else {
        "config.example.toml".into()
    };

    let appConfig = match config::load(&configPath) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    let mut services = match FirebaseApp::initialize(appConfig.firebase.clone()) {
        Ok(services) => services,
        Err(e) => {
            tracing::error!("failed to initialize firebase from {configPath}: {e}");
            std::process::exit(1);
        }
    };
    for (key, value) in &appConfig.auth.google_parameters {
        services.google_provider.set_custom_parameter(key, value);
    }
    if appConfig.emulators.is_some() {
        tracing::info!("using the firebase emulator suite");
    }

    // The single subscription to the auth stream for this process.
    let authObserver = AuthObserver::start(&services.auth);
    let authState = authObserver.state();
    let refresher = spawn_token_refresher(
        services.auth.clone(),
        Duration::from_secs(appConfig.auth.refresh_check_secs),
        Duration::from_secs(appConfig.auth.refresh_leeway_secs),
    );

    let appState = AppState {
        services: services.clone(),
        auth_state: authState.clone(),
    };

    // Get Leptos configuration
    let conf = get_configuration(None).expect("failed to load Leptos configuration");
    let leptosOptions = conf.leptos_options;
    let bindAddr = format!("{}:{}", appConfig.server.bind, appConfig.server.port);
    let addr = bindAddr.parse::<SocketAddr>().unwrap_or_else(|e| {
        tracing::warn!("invalid bind address {bindAddr}: {e}, using {}", leptosOptions.site_addr);
        leptosOptions.site_addr
    });

    let routes = generate_route_list(App);

    let apiRouter = blog_api::api_router(appState);

    let app = Router::new()
        .leptos_routes_with_context(
            &leptosOptions,
            routes,
            {
                let services = services.clone();
                let authState = authState.clone();
                move || {
                    provide_context(services.clone());
                    provide_context(authState.clone());
                }
            },
            {
                let leptosOptions = leptosOptions.clone();
                move || shell(leptosOptions.clone())
            },
        )
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptosOptions)
        .merge(apiRouter)
        .layer(TraceLayer::new_for_http());

    tracing::info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server exited with error");

    authObserver.unsubscribe();
    refresher.abort();
    tracing::info!("shut down");
}

#[cfg(feature = "ssr")]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(not(feature = "ssr"))]
fn main() {}
