//! Admin access gate

/// Whether the admin dashboard is unlocked for this run
#[derive(Debug, Clone, Default)]
pub struct AdminSession {
    logged_in: bool,
}

impl AdminSession {
    /// Unlock if `nickname` exactly matches `expected`
    pub fn login(&mut self, nickname: &str, expected: &str) -> bool {
        self.logged_in = nickname == expected;
        if self.logged_in {
            tracing::info!("Admin session started");
        } else {
            tracing::warn!("Rejected admin login attempt");
        }
        self.logged_in
    }

    pub fn logout(&mut self) {
        self.logged_in = false;
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }
}
