//! Colors, fonts and spacing for the assistant window

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Vec2, Visuals};

/// Application theme configuration
#[derive(Clone, Debug)]
pub struct Theme {
    /// Speak button
    pub primary: Color32,
    /// Submit button
    pub success: Color32,
    /// Search button
    pub search: Color32,
    /// Stop button and failure statuses
    pub error: Color32,

    /// Window background
    pub bg_primary: Color32,
    /// Card and canvas background
    pub bg_card: Color32,

    pub text_primary: Color32,
    pub text_muted: Color32,
    /// Ready status
    pub status_ok: Color32,
    /// In-flight statuses
    pub status_busy: Color32,

    /// Waveform bars alternate between these
    pub wave_even: Color32,
    pub wave_odd: Color32,

    pub button_rounding: Rounding,
    pub card_rounding: Rounding,

    pub spacing: f32,
    pub spacing_lg: f32,
    pub spacing_sm: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    pub fn light() -> Self {
        Self {
            primary: Color32::from_rgb(0x34, 0x98, 0xdb),        // Blue
            success: Color32::from_rgb(0x2e, 0xcc, 0x71),        // Green
            search: Color32::from_rgb(0xf3, 0x9c, 0x12),         // Orange
            error: Color32::from_rgb(0xe7, 0x4c, 0x3c),          // Red

            bg_primary: Color32::from_rgb(0xec, 0xf0, 0xf1), // Cloud gray
            bg_card: Color32::WHITE,

            text_primary: Color32::from_rgb(0x2c, 0x3e, 0x50), // Midnight blue
            text_muted: Color32::from_rgb(0x7f, 0x8c, 0x8d),
            status_ok: Color32::from_rgb(0x27, 0xae, 0x60),
            status_busy: Color32::from_rgb(0x29, 0x80, 0xb9),

            wave_even: Color32::from_rgb(0x34, 0x98, 0xdb),
            wave_odd: Color32::from_rgb(0x2e, 0xcc, 0x71),

            button_rounding: Rounding::same(6.0),
            card_rounding: Rounding::same(10.0),

            spacing: 16.0,
            spacing_lg: 30.0,
            spacing_sm: 8.0,
        }
    }

    /// Color for the bar at `index`
    pub fn wave_color(&self, index: usize) -> Color32 {
        if index % 2 == 0 {
            self.wave_even
        } else {
            self.wave_odd
        }
    }

    /// Color for a status line
    pub fn status_color(&self, status: &str) -> Color32 {
        if status.starts_with('✅') {
            self.status_ok
        } else if status.ends_with("...") {
            self.status_busy
        } else {
            self.error
        }
    }

    /// Apply this theme to egui
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = Visuals::light();

        visuals.panel_fill = self.bg_primary;
        visuals.window_fill = self.bg_card;
        visuals.extreme_bg_color = self.bg_card;
        visuals.override_text_color = Some(self.text_primary);

        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Color32::WHITE);
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Color32::WHITE);
        visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);

        visuals.selection.bg_fill = self.primary.gamma_multiply(0.3);
        visuals.selection.stroke = Stroke::new(1.0, self.primary);

        visuals.window_rounding = self.card_rounding;
        visuals.window_stroke = Stroke::new(1.0, self.text_muted);

        ctx.set_visuals(visuals);
        ctx.set_fonts(egui::FontDefinitions::default());

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = Vec2::splat(self.spacing_sm);
        style.spacing.button_padding = Vec2::new(10.0, 5.0);

        style.text_styles.insert(
            egui::TextStyle::Heading,
            FontId::new(26.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Body,
            FontId::new(16.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Button,
            FontId::new(16.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Small,
            FontId::new(14.0, FontFamily::Proportional),
        );

        ctx.set_style(style);
    }
}
