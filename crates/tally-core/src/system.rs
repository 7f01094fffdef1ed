use std::{sync::OnceLock, time::Instant};

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Initialize process start time.
pub fn init_uptime() {
    START_TIME.get_or_init(Instant::now);
}

/// Process uptime in seconds.
pub fn uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(Instant::now);
    start.elapsed().as_secs()
}

/// Get platform (OS family).
#[inline]
pub fn platform() -> &'static str {
    std::env::consts::OS
}

/// Host name of this machine, falling back to `localhost`.
///
/// Used to build the default address an agent advertises to the orchestrator.
pub fn hostname() -> String {
    ::hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_is_monotonic() {
        init_uptime();
        let a = uptime_seconds();
        let b = uptime_seconds();
        assert!(b >= a);
    }

    #[test]
    fn hostname_is_never_empty() {
        assert!(!hostname().is_empty());
        assert!(!platform().is_empty());
    }
}
