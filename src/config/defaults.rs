use std::time::Duration;

pub(super) const fn default_queue_bound() -> usize {
    64
}

pub(super) const fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

pub(super) const fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}
