use std::time::Duration;

use tokio::sync::Mutex;

/// Fixed courtesy pause in front of every outbound lookup.
///
/// Waits are serialised, so two callers sharing a throttle never issue
/// requests closer together than `delay`, however many requests are in
/// flight.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    gate: Mutex<()>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            gate: Mutex::new(()),
        }
    }

    pub async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }

        let _turn = self.gate.lock().await;
        tokio::time::sleep(self.delay).await;
    }
}
