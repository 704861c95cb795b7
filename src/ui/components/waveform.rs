//! Listening feedback waveform
//!
//! Paints the bars of the latest `WaveFrame` as vertical strokes centred on
//! the canvas, or a flat line while no session is active.

use crate::listening::WaveFrame;
use crate::ui::theme::Theme;
use egui::{Pos2, Rect, Stroke, Vec2};

const LINE_WIDTH: f32 = 8.0;

pub struct Waveform<'a> {
    frame: Option<&'a WaveFrame>,
    theme: &'a Theme,
    size: Vec2,
}

impl<'a> Waveform<'a> {
    pub fn new(frame: Option<&'a WaveFrame>, theme: &'a Theme) -> Self {
        Self {
            frame,
            theme,
            size: Vec2::new(200.0, 90.0),
        }
    }

    pub fn size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(self.size, egui::Sense::hover());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            painter.rect_filled(rect, self.theme.card_rounding, self.theme.bg_card);

            match self.frame {
                Some(frame) if !frame.bars.is_empty() => {
                    for (i, (top, bottom)) in bar_segments(rect, &frame.bars).into_iter().enumerate()
                    {
                        painter.line_segment(
                            [top, bottom],
                            Stroke::new(LINE_WIDTH, self.theme.wave_color(i)),
                        );
                    }
                }
                _ => {
                    let center_y = rect.center().y;
                    painter.line_segment(
                        [
                            Pos2::new(rect.left() + 8.0, center_y),
                            Pos2::new(rect.right() - 8.0, center_y),
                        ],
                        Stroke::new(1.0, self.theme.text_muted),
                    );
                }
            }
        }

        response
    }
}

/// Evenly spaced vertical segments, one per bar, mirrored around the centre
fn bar_segments(rect: Rect, bars: &[f32]) -> Vec<(Pos2, Pos2)> {
    let spacing = rect.width() / (bars.len() + 1) as f32;
    let center_y = rect.center().y;
    let max_offset = rect.height() / 2.0;

    bars.iter()
        .enumerate()
        .map(|(i, offset)| {
            let x = rect.left() + spacing * (i + 1) as f32;
            let offset = offset.clamp(-max_offset, max_offset);
            (
                Pos2::new(x, center_y - offset),
                Pos2::new(x, center_y + offset),
            )
        })
        .collect()
}
