//! Control panel and FPS overlay.

use crate::params::{ParamKind, Params};

const MARGIN: f32 = 10.0;

/// Draw the parameter panel in the top-left corner.
///
/// Edits are written to `params` clamped into range. Returns true if any
/// value changed this frame.
pub fn control_panel(ctx: &egui::Context, params: &mut Params) -> bool {
    let mut changed = false;

    egui::Window::new("Controls")
        .anchor(egui::Align2::LEFT_TOP, [MARGIN, MARGIN])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            egui::Grid::new("params_grid")
                .num_columns(3)
                .spacing([8.0, 6.0])
                .show(ui, |ui| {
                    for kind in ParamKind::ALL {
                        changed |= param_row(ui, params, kind);
                        ui.end_row();
                    }
                });
        });

    changed
}

fn param_row(ui: &mut egui::Ui, params: &mut Params, kind: ParamKind) -> bool {
    let range = kind.range();
    let mut value = params.get(kind);
    let before = value;

    ui.label(range.label);

    ui.add(
        egui::DragValue::new(&mut value)
            .range(range.min..=range.max)
            .speed(range.step)
            .custom_formatter(move |v, _| range.format(v))
            .custom_parser(move |text| range.parse(text)),
    );

    ui.add(
        egui::Slider::new(&mut value, range.min..=range.max)
            .step_by(range.step)
            .show_value(false),
    );

    if value != before {
        params.set(kind, value);
        params.get(kind) != before
    } else {
        false
    }
}

/// Draw the frame rate in the top-right corner.
pub fn fps_overlay(ctx: &egui::Context, fps: f32, paused: bool) {
    egui::Area::new(egui::Id::new("fps_overlay"))
        .anchor(egui::Align2::RIGHT_TOP, [-MARGIN, MARGIN])
        .interactable(false)
        .show(ctx, |ui| {
            let text = if paused {
                format!("{fps:.0} FPS (paused)")
            } else {
                format!("{fps:.0} FPS")
            };
            ui.label(
                egui::RichText::new(text)
                    .monospace()
                    .color(egui::Color32::from_gray(220)),
            );
        });
}
