use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::auth::AuthClient;

/// Refreshes the id token whenever it is within `leeway` of expiring, checking
/// every `interval`. Abort the handle to stop.
pub fn spawn_token_refresher(
    auth: AuthClient,
    interval: Duration,
    leeway: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Some(session) = auth.current_session() else {
                continue;
            };
            if !session.expires_within(leeway) {
                continue;
            }

            match auth.refresh().await {
                Ok(user) => debug!("refreshed id token for {}", user.uid),
                Err(e) => warn!("token refresh failed for {}: {e}", session.user.uid),
            }
        }
    })
}
