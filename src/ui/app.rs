//! Main application window and eframe integration
//!
//! The update loop owns the `Assistant`: every frame pumps the listening
//! session, then draws from `ScreenState`.

use crate::integration::{Assistant, Presenter};
use crate::ui::components::Waveform;
use crate::ui::state::ScreenState;
use crate::ui::theme::Theme;
use egui::{Button, CentralPanel, Color32, Frame, Key, RichText, TextEdit, Vec2};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const WINDOW_TITLE: &str = "🎓 School Assistant";

/// Repaint interval while a session is in flight without a feedback tick
const BUSY_REPAINT: Duration = Duration::from_millis(100);

pub struct ScholarApp {
    assistant: Assistant,
    screen: ScreenState,
    theme: Theme,
}

impl ScholarApp {
    pub fn new(cc: &eframe::CreationContext<'_>, assistant: Assistant) -> Self {
        let theme = Theme::light();
        theme.apply(&cc.egui_ctx);

        info!("Scholar UI initialized");
        Self {
            assistant,
            screen: ScreenState::new(),
            theme,
        }
    }

    fn submit(&mut self) {
        let question = self.screen.entry.clone();
        if let Err(e) = self.assistant.ask(&question, &mut self.screen) {
            debug!("Question '{}' went unanswered: {}", question, e);
        }
    }

    fn toggle_listening(&mut self, now: Instant) {
        if let Err(e) = self.assistant.toggle_listening(now, &mut self.screen) {
            warn!("Could not start listening: {}", e);
            self.screen.display_status(&e.user_message());
        }
    }

    fn action_button(&self, label: &str, fill: Color32) -> Button<'static> {
        Button::new(RichText::new(label.to_string()).strong().color(Color32::WHITE))
            .fill(fill)
            .rounding(self.theme.button_rounding)
            .min_size(Vec2::new(180.0, 34.0))
    }

    fn render(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.vertical_centered(|ui| {
            ui.add_space(self.theme.spacing_sm);
            ui.heading(RichText::new("School Assistant 🤖").strong());
            ui.add_space(self.theme.spacing_sm);

            ui.label("Ask me anything:");
            let entry = ui.add(
                TextEdit::singleline(&mut self.screen.entry)
                    .desired_width(420.0)
                    .hint_text("e.g. what is gravity"),
            );
            let entered = entry.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

            let listening = self.assistant.is_listening();
            let (speak_label, speak_fill) = if listening {
                ("⏹ Stop", self.theme.error)
            } else {
                ("🎤 Speak", self.theme.primary)
            };
            if ui.add(self.action_button(speak_label, speak_fill)).clicked() {
                self.toggle_listening(now);
            }

            Waveform::new(self.screen.frame.as_ref(), &self.theme).show(ui);

            ui.label(
                RichText::new(&self.screen.status)
                    .color(self.theme.status_color(&self.screen.status)),
            );

            let mut answer = self.screen.answer.as_str();
            ui.add(
                TextEdit::multiline(&mut answer)
                    .desired_rows(4)
                    .desired_width(520.0),
            );

            ui.add_space(self.theme.spacing_sm);
            let submitted = ui
                .add(self.action_button("💡 Submit Text", self.theme.success))
                .clicked();
            if submitted || entered {
                self.submit();
            }

            if self.screen.fallback_visible
                && ui
                    .add(self.action_button("🌐 Search on Google", self.theme.search))
                    .clicked()
            {
                if let Err(e) = self.assistant.search_fallback() {
                    warn!("Fallback search failed: {}", e);
                    self.screen.display_status(&e.user_message());
                }
            }
        });
    }
}

impl eframe::App for ScholarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.assistant.pump(now, &mut self.screen);
        if !self.assistant.controller().is_feedback_active() {
            self.screen.clear_frame();
        }

        CentralPanel::default().show(ctx, |ui| {
            ui.add_space(self.theme.spacing_lg);
            Frame::none()
                .fill(self.theme.bg_card)
                .rounding(self.theme.card_rounding)
                .inner_margin(self.theme.spacing_lg)
                .show(ui, |ui| self.render(ui, now));
        });

        if let Some(deadline) = self.assistant.next_wakeup() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        } else if self.assistant.is_listening() {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let mut screen = std::mem::take(&mut self.screen);
        self.assistant.stop_listening(&mut screen);
    }
}
