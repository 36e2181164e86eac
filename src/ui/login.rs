//! Admin login form

use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText};

use crate::app::TopperGuideApp;
use crate::core::route::Route;

const LOGIN_ERROR: &str = "Incorrect nickname. Access denied.";
const ERROR_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Default)]
pub struct LoginState {
    pub nickname: String,
    error_since: Option<Instant>,
}

impl LoginState {
    /// Error text to show, if a failed attempt is still recent
    pub fn error(&self, now: Instant) -> Option<&'static str> {
        self.error_since
            .filter(|since| now.duration_since(*since) < ERROR_TTL)
            .map(|_| LOGIN_ERROR)
    }

    fn reject(&mut self) {
        self.error_since = Some(Instant::now());
    }

    fn clear(&mut self) {
        self.nickname.clear();
        self.error_since = None;
    }
}

pub struct LoginPanel;

impl LoginPanel {
    pub fn show(ui: &mut egui::Ui, app: &mut TopperGuideApp) {
        let mut submitted = false;

        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.25);
            ui.heading(RichText::new("Admin Login").size(26.0).strong());
            ui.add_space(12.0);

            let response = ui.add(
                egui::TextEdit::singleline(&mut app.login.nickname)
                    .hint_text("Enter admin nickname")
                    .desired_width(280.0),
            );
            let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            ui.add_space(8.0);

            if ui.button("Login").clicked() || enter {
                submitted = true;
            }

            if let Some(error) = app.login.error(Instant::now()) {
                ui.add_space(8.0);
                ui.label(RichText::new(error).color(Color32::from_rgb(220, 38, 38)));
                ui.ctx().request_repaint_after(ERROR_TTL);
            }
        });

        if submitted {
            Self::submit(app);
        }
    }

    fn submit(app: &mut TopperGuideApp) {
        if app.session.login(&app.login.nickname, &app.config.admin.nickname) {
            app.login.clear();
            app.navigate(Route::Admin);
        } else {
            app.login.reject();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_expires() {
        let mut state = LoginState::default();
        assert_eq!(state.error(Instant::now()), None);

        state.reject();
        assert_eq!(state.error(Instant::now()), Some(LOGIN_ERROR));
        assert_eq!(state.error(Instant::now() + ERROR_TTL), None);

        state.clear();
        assert_eq!(state.error(Instant::now()), None);
    }
}
