//! Spinner-backed waiting for outstanding session requests.

use resas_chart_cli_utils::{MultiProgress, fetch_spinner};
use resas_chart_session::Session;

/// Applies session events until nothing is pending, showing a spinner
/// with the number of completed requests.
pub async fn settle(session: &mut Session, multi: &MultiProgress, message: &str) {
    if !session.is_busy() {
        return;
    }

    let total = pending(session).max(1);
    let bar = fetch_spinner(multi, message, total);

    while session.is_busy() {
        if !session.process_next().await {
            break;
        }
        bar.set_position(total.saturating_sub(pending(session)));
    }

    bar.finish_and_clear();
}

fn pending(session: &Session) -> u64 {
    u64::try_from(session.pending_fetches()).unwrap_or(u64::MAX)
}
