use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::warn;

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request ceiling keyed by client address. Each model call
/// occupies a backend round trip for up to the gateway timeout, so the
/// ceiling is the only thing standing between a chatty client and a
/// saturated inference backend.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    slots: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self { max_requests, window, slots: Mutex::new(HashMap::new()) }
    }

    /// Counts one request against `ip`; false once the window is full.
    pub fn try_acquire(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut slots = match self.slots.lock() {
            Ok(slots) => slots,
            // A poisoned ceiling should fail closed, not open the gate.
            Err(_) => return false,
        };

        // Expired windows are dropped wholesale so the map stays bounded by
        // the number of clients active within one window.
        slots.retain(|_, slot| now.duration_since(slot.started) < self.window);

        let slot = slots.entry(ip).or_insert(Window { started: now, count: 0 });

        if slot.count >= self.max_requests {
            warn!(event_name = "rate_limit.exceeded", client_ip = %ip, "rate limit exceeded");
            return false;
        }

        slot.count += 1;
        true
    }
}
