use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide gate: has the backend been provisioned for this site?
///
/// Written only during activation and deactivation, read on every chat
/// request. Constructed explicitly in the composition root and shared by
/// `Arc` rather than living in a static.
#[derive(Debug, Default)]
pub struct SiteReadiness {
    ready: AtomicBool,
}

impl SiteReadiness {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ready() -> Self {
        let flag = Self::default();
        flag.set(true);
        flag
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn set(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    pub fn clear(&self) {
        self.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_transitions() {
        let flag = SiteReadiness::new();
        assert!(!flag.is_ready());

        flag.set(true);
        assert!(flag.is_ready());

        flag.clear();
        assert!(!flag.is_ready());
    }
}
