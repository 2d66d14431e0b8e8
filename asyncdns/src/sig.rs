use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Spawn a future that waits for a CTRL-C interrupt (SIGINT on Unix) and
/// cancels `token`, or exits once `token` is cancelled some other way.
pub async fn wait_for_interrupt(handle: Handle, token: CancellationToken) {
    handle.spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!(message = "interrupted, cancelling queries");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    });
}
