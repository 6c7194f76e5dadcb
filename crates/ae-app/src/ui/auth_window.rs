use eframe::egui::{self, Color32, Context, RichText, TextEdit};
use crate::events::AppEvent;
use crate::ui::{UiComponent, UiContext, UiEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Login,
    Register,
}

#[derive(Default)]
pub struct AuthWindow {
    open: bool,
    mode: Mode,
    username: String,
    email: String,
    password: String,
}

impl AuthWindow {
    fn submit(&mut self, ui_ctx: &UiContext) {
        let event = match self.mode {
            Mode::Login => UiEvent::Login {
                username: self.username.trim().to_string(),
                password: self.password.clone(),
            },
            Mode::Register => UiEvent::Register {
                username: self.username.trim().to_string(),
                email: self.email.trim().to_string(),
                password: self.password.clone(),
            },
        };
        ui_ctx.send_event(event);
        self.password.clear();
    }

    fn reset(&mut self) {
        self.open = false;
        self.password.clear();
    }
}

impl UiComponent for AuthWindow {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        if !self.open {
            return;
        }

        let mut open = self.open;
        let title = match self.mode {
            Mode::Login => "Log in",
            Mode::Register => "Create an account",
        };
        egui::Window::new(title)
            .id(egui::Id::new("auth_window"))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                if self.mode == Mode::Login {
                    ui.label(
                        RichText::new("Log in to save images and buy credits.")
                            .small()
                            .color(Color32::LIGHT_BLUE),
                    );
                    ui.add_space(5.0);
                }

                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.mode, Mode::Login, "Log in");
                    ui.selectable_value(&mut self.mode, Mode::Register, "Register");
                });
                ui.separator();

                egui::Grid::new("auth_fields")
                    .num_columns(2)
                    .spacing([8.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Username");
                        ui.add(TextEdit::singleline(&mut self.username).desired_width(220.0));
                        ui.end_row();

                        if self.mode == Mode::Register {
                            ui.label("Email");
                            ui.add(TextEdit::singleline(&mut self.email).desired_width(220.0));
                            ui.end_row();
                        }

                        ui.label("Password");
                        let password = ui.add(
                            TextEdit::singleline(&mut self.password)
                                .password(true)
                                .desired_width(220.0),
                        );
                        if password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                            self.submit(ui_ctx);
                        }
                        ui.end_row();
                    });

                ui.add_space(8.0);
                if ui.button(title).clicked() {
                    self.submit(ui_ctx);
                }
            });

        if !open {
            self.reset();
        }
    }

    fn on_app_event(&mut self, e: &AppEvent) {
        match e {
            AppEvent::LoginRequired => {
                self.open = true;
                self.mode = Mode::Login;
            }
            AppEvent::SessionChanged(Some(_)) => {
                self.reset();
                self.username.clear();
                self.email.clear();
            }
            _ => {}
        }
    }
}
