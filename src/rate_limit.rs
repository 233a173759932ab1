use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::{DashMap, DashSet};

/// Per-IP submission rate limiter using sliding window.
pub struct SubmissionRateLimiter {
    /// ip -> (count, window_start)
    entries: DashMap<IpAddr, (u32, Instant)>,
}

impl SubmissionRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check if request is allowed. Returns Ok(()) or Err with retry-after seconds.
    pub fn check(&self, ip: IpAddr, limit: u32, window_secs: u64) -> Result<(), u64> {
        let window = Duration::from_secs(window_secs);
        let now = Instant::now();

        let mut entry = self.entries.entry(ip).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > window {
            *count = 1;
            *start = now;
            return Ok(());
        }

        if *count >= limit {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(window_secs.saturating_sub(elapsed));
        }

        *count += 1;
        Ok(())
    }

    /// Remove stale entries older than the given duration.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }
}

impl Default for SubmissionRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Clients with a submission currently being sent.
///
/// Server-side counterpart of disabling the submit button: a second submit
/// from the same client is refused until the first one settles.
pub struct InFlight {
    active: DashSet<IpAddr>,
}

impl InFlight {
    pub fn new() -> Self {
        Self {
            active: DashSet::new(),
        }
    }

    /// Mark `ip` as sending. Returns `None` if it already is.
    pub fn acquire(&self, ip: IpAddr) -> Option<InFlightGuard<'_>> {
        // Built lazily: a guard dropped here would release the current holder.
        self.active.insert(ip).then(|| InFlightGuard {
            active: &self.active,
            ip,
        })
    }

    #[cfg(test)]
    fn is_active(&self, ip: IpAddr) -> bool {
        self.active.contains(&ip)
    }
}

impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases the client on drop, whatever way the send ended.
pub struct InFlightGuard<'a> {
    active: &'a DashSet<IpAddr>,
    ip: IpAddr,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.active.remove(&self.ip);
    }
}
