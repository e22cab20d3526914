use super::ordering::OrderingMethod;
use std::time::Duration;

#[derive(Clone)]
pub struct SearchOptions {
    pub ordering: OrderingMethod,
    pub timeout: Duration,
    pub parallelism: usize,
    pub probe: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            ordering: OrderingMethod::Degeneracy,
            timeout: Duration::from_secs(u64::MAX),
            parallelism: 1,
            probe: false,
        }
    }
}
