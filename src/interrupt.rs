use std::pin::pin;

use futures::{Stream, StreamExt};
use stream_cancel::Trigger;

/// Cancels `trigger` on the first interrupt.
///
/// Resolves to `true` if a second interrupt arrives while the teardown is running; the
/// caller then exits without waiting for it. An interrupt source that ends before
/// delivering anything also cancels the trigger, since nothing could stop the run later.
pub async fn forward_interrupts<S>(interrupts: S, trigger: Trigger) -> bool
where
    S: Stream<Item = ()>,
{
    let mut interrupts = pin!(interrupts);

    match interrupts.next().await {
        Some(()) => log::debug!("Interrupt received"),
        None => log::error!("Interrupt source closed; shutting down"),
    }
    trigger.cancel();

    interrupts.next().await.is_some()
}
