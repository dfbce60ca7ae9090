//! Debounced channels.
//!
//! A value is forwarded only after `delay` has passed with no newer value.
//! Every new value cancels the pending timer, so a burst of updates yields
//! exactly one output: the last value of the burst.

use std::time::Duration;

use tokio::sync::mpsc;

/// Debounce `input`, returning a receiver of settled values.
///
/// When `input` closes, a value that is still waiting for its pause is
/// emitted immediately and the output closes. Dropping the returned receiver
/// stops the background task at its next emit.
pub fn debounce<T: Send + 'static>(
    mut input: mpsc::Receiver<T>,
    delay: Duration,
) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        let mut pending: Option<T> = None;
        loop {
            let Some(value) = pending.take() else {
                match input.recv().await {
                    Some(value) => pending = Some(value),
                    None => break,
                }
                continue;
            };

            tokio::select! {
                next = input.recv() => match next {
                    Some(newer) => pending = Some(newer),
                    None => {
                        let _ = tx.send(value).await;
                        break;
                    }
                },
                _ = tokio::time::sleep(delay) => {
                    if tx.send(value).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn burst_yields_last_value() {
        let (tx, rx) = mpsc::channel(8);
        let mut out = debounce(rx, DELAY);

        tx.send("S").await.unwrap();
        tx.send("Sy").await.unwrap();
        tx.send("Syd").await.unwrap();

        assert_eq!(out.recv().await, Some("Syd"));

        drop(tx);
        assert_eq!(out.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn separated_values_all_settle() {
        let (tx, rx) = mpsc::channel(8);
        let mut out = debounce(rx, DELAY);

        tx.send(1).await.unwrap();
        tokio::time::sleep(DELAY * 2).await;
        tx.send(2).await.unwrap();
        drop(tx);

        assert_eq!(out.recv().await, Some(1));
        assert_eq!(out.recv().await, Some(2));
        assert_eq!(out.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn new_value_restarts_timer() {
        let (tx, rx) = mpsc::channel(8);
        let mut out = debounce(rx, DELAY);

        tx.send("Me").await.unwrap();
        tokio::time::sleep(DELAY / 2).await;
        tx.send("Mel").await.unwrap();
        tokio::time::sleep(DELAY / 2).await;

        // 300ms since the first value, only 150ms since the second.
        assert!(out.try_recv().is_err());

        assert_eq!(out.recv().await, Some("Mel"));
    }

    #[tokio::test(start_paused = true)]
    async fn closing_flushes_pending_value() {
        let (tx, rx) = mpsc::channel(8);
        let mut out = debounce(rx, Duration::from_secs(3600));

        tx.send("Bri").await.unwrap();
        drop(tx);

        assert_eq!(out.recv().await, Some("Bri"));
        assert_eq!(out.recv().await, None);
    }
}
