//! Counted completion barrier

use tokio::sync::watch;

/// Counts outstanding relay tasks; waiters are released when it hits zero.
///
/// The count never goes below zero. Extra count-downs are ignored.
#[derive(Debug)]
pub struct CompletionGate {
    remaining: watch::Sender<usize>,
}

impl CompletionGate {
    /// Create a gate expecting `count` completions
    pub fn new(count: usize) -> Self {
        let (remaining, _) = watch::channel(count);
        Self { remaining }
    }

    /// Record one completion.
    ///
    /// Returns `false` if the gate was already open.
    pub fn count_down(&self) -> bool {
        self.remaining.send_if_modified(|remaining| {
            if *remaining == 0 {
                return false;
            }
            *remaining -= 1;
            true
        })
    }

    /// Completions still outstanding
    pub fn remaining(&self) -> usize {
        *self.remaining.borrow()
    }

    /// Whether every expected completion has been recorded
    pub fn is_open(&self) -> bool {
        self.remaining() == 0
    }

    /// Wait until the count reaches zero
    pub async fn wait(&self) {
        let mut rx = self.remaining.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|remaining| *remaining == 0).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_opens_after_two_count_downs() {
        let gate = Arc::new(CompletionGate::new(2));
        let waiter = tokio::spawn({
            let gate = Arc::clone(&gate);
            async move { gate.wait().await }
        });

        assert!(gate.count_down());
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());
        assert!(!gate.is_open());

        assert!(gate.count_down());
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter released")
            .unwrap();
        assert!(gate.is_open());
    }

    #[tokio::test]
    async fn test_extra_count_down_is_ignored() {
        let gate = CompletionGate::new(2);
        assert!(gate.count_down());
        assert!(gate.count_down());
        assert!(!gate.count_down());
        assert_eq!(gate.remaining(), 0);

        // Still open for late waiters
        tokio::time::timeout(Duration::from_secs(1), gate.wait())
            .await
            .expect("open gate does not block");
    }

    #[tokio::test]
    async fn test_count_down_from_threads() {
        let gate = Arc::new(CompletionGate::new(2));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || gate.count_down())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }

        tokio::time::timeout(Duration::from_secs(1), gate.wait())
            .await
            .expect("gate opened");
    }

    #[tokio::test]
    async fn test_zero_count_is_open() {
        let gate = CompletionGate::new(0);
        assert!(gate.is_open());
        gate.wait().await;
    }
}
