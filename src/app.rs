//! Main application state and UI coordination

use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui;
use tokio::runtime::Runtime;

use crate::core::config::AppConfig;
use crate::core::generation::{generator_from_config, TextGenerator};
use crate::core::medium::{FileMedium, StorageMedium};
use crate::core::route::Route;
use crate::core::session::AdminSession;
use crate::core::store::StudyStore;
use crate::ui::admin::{AdminPanel, AdminState};
use crate::ui::block_renderer::BlockAction;
use crate::ui::content::{ContentPanel, ContentState};
use crate::ui::home::{HomePanel, HomeState};
use crate::ui::login::{LoginPanel, LoginState};
use crate::ui::notification::Notification;

const APP_TITLE: &str = "Topper Guide";

/// Store type the UI works against; the medium is chosen at startup
pub type Store = StudyStore<Box<dyn StorageMedium>>;

/// Main application state
pub struct TopperGuideApp {
    /// Application configuration
    pub config: AppConfig,
    /// Chapter index and content table
    pub store: Store,
    /// Current view
    pub route: Route,
    /// Admin access for this run
    pub session: AdminSession,
    /// AI drafting backend
    pub generator: Arc<dyn TextGenerator>,
    /// Runtime for background generation requests
    pub runtime: Runtime,
    /// Active toast, if any
    pub notification: Option<Notification>,
    pub home: HomeState,
    pub login: LoginState,
    pub admin: AdminState,
    pub content: ContentState,
    window_title: String,
}

impl TopperGuideApp {
    /// Create a new application instance
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        runtime: Runtime,
        initial_route: Route,
    ) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        Self::apply_theme(&cc.egui_ctx, &config.ui.theme);

        let medium = FileMedium::new(config.resolved_data_dir());
        tracing::info!("Using data folder: {}", medium.root().display());
        let store: Store = StudyStore::new(Box::new(medium));
        let generator = generator_from_config(&config.generation);

        let home = HomeState::new(config.browse.board);
        let admin = AdminState::new(&config.browse, &store);

        let mut app = Self {
            config,
            store,
            route: Route::Home,
            session: AdminSession::default(),
            generator,
            runtime,
            notification: None,
            home,
            login: LoginState::default(),
            admin,
            content: ContentState::default(),
            window_title: APP_TITLE.to_string(),
        };
        app.navigate(initial_route);
        app
    }

    fn apply_theme(ctx: &egui::Context, theme: &str) {
        if theme.eq_ignore_ascii_case("light") {
            ctx.set_visuals(egui::Visuals::light());
        } else {
            ctx.set_visuals(egui::Visuals::dark());
        }
    }

    /// Switch views, loading whatever the target view reads from the store
    pub fn navigate(&mut self, route: Route) {
        let route = match route {
            Route::Admin if !self.session.is_logged_in() => Route::Login,
            other => other,
        };
        tracing::debug!("Navigating to {}", route.to_path());

        match &route {
            Route::Home => self.home.collapse_all(),
            Route::Admin => self.admin.reload_chapters(&self.store),
            Route::Content(chapter) => self.content.load(&self.store, chapter.clone()),
            Route::Login => {}
        }
        self.route = route;
    }

    /// Point the store at a different data folder
    pub fn open_data_dir(&mut self, path: PathBuf) {
        let medium = FileMedium::new(&path);
        self.store = StudyStore::new(Box::new(medium));
        self.config.set_data_dir(path.clone());
        if let Err(e) = self.config.save() {
            tracing::error!("Failed to save config: {:#}", e);
        }

        self.admin.reset_selection();
        let current = self.route.clone();
        self.navigate(current);
        self.notification = Some(Notification::success(format!(
            "Opened data folder {}",
            path.display()
        )));
    }

    pub fn handle_block_action(&mut self, action: BlockAction) {
        match action {
            BlockAction::OpenUrl(url) => {
                if let Err(e) = open::that(&url) {
                    tracing::error!("Failed to open {}: {}", url, e);
                    self.notification = Some(Notification::error(format!("Could not open {url}")));
                }
            }
        }
    }

    fn sync_window_title(&mut self, ctx: &egui::Context) {
        let title = match &self.route {
            Route::Content(chapter) => format!(
                "{} - Class {} {} Notes | {}",
                chapter.chapter, chapter.class, chapter.subject, APP_TITLE
            ),
            _ => APP_TITLE.to_string(),
        };
        if title != self.window_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.window_title = title;
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Data Folder...").clicked() {
                        if let Some(path) = rfd::FileDialog::new().pick_folder() {
                            self.open_data_dir(path);
                        }
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.selectable_label(self.route == Route::Home, "Home").clicked() {
                        self.navigate(Route::Home);
                        ui.close();
                    }
                    if ui.selectable_label(self.route == Route::Admin, "Admin").clicked() {
                        self.navigate(Route::Admin);
                        ui.close();
                    }
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.session.is_logged_in() {
                        if ui.button("Logout").clicked() {
                            self.session.logout();
                            self.navigate(Route::Home);
                        }
                    } else if ui.button("Admin").clicked() {
                        self.navigate(Route::Login);
                    }
                    ui.separator();
                    if ui.link(APP_TITLE).clicked() {
                        self.navigate(Route::Home);
                    }
                });
            });
        });
    }

    fn render_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(self.route.to_path())
                        .monospace()
                        .small(),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!("Data: {}", self.store.medium().describe()))
                            .small(),
                    );
                });
            });
        });
    }
}

impl eframe::App for TopperGuideApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle keyboard shortcuts
        let save_pressed = ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S));
        if save_pressed && self.route == Route::Admin {
            AdminPanel::save_draft(self);
        }

        if self.route == Route::Admin {
            AdminPanel::poll_generation(self);
        }

        self.render_menu_bar(ctx);
        self.render_status_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.route.clone() {
            Route::Home => HomePanel::show(ui, self),
            Route::Login => LoginPanel::show(ui, self),
            Route::Admin => AdminPanel::show(ui, self),
            Route::Content(_) => ContentPanel::show(ui, self),
        });

        AdminPanel::show_dialogs(ctx, self);
        Notification::show(&mut self.notification, ctx);
        self.sync_window_title(ctx);
    }
}
