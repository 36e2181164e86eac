//! Transient toast notifications

use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText};

/// How long a toast stays on screen
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A message shown in the top-right corner for a few seconds
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    shown_at: Instant,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Error)
    }

    fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= NOTIFICATION_TTL
    }

    /// Draw the toast, or clear it once expired
    pub fn show(slot: &mut Option<Notification>, ctx: &egui::Context) {
        let now = Instant::now();
        if slot.as_ref().is_some_and(|n| n.is_expired(now)) {
            *slot = None;
        }
        let Some(notification) = slot.as_ref() else {
            return;
        };

        let fill = match notification.kind {
            NotificationKind::Success => Color32::from_rgb(22, 163, 74),
            NotificationKind::Error => Color32::from_rgb(220, 38, 38),
        };

        egui::Area::new(egui::Id::new("notification"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-24.0, 48.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(fill)
                    .inner_margin(egui::Margin::symmetric(16, 8))
                    .corner_radius(6.0)
                    .show(ui, |ui| {
                        ui.label(RichText::new(&notification.message).color(Color32::WHITE));
                    });
            });

        let remaining = NOTIFICATION_TTL.saturating_sub(now.duration_since(notification.shown_at));
        ctx.request_repaint_after(remaining);
    }
}
