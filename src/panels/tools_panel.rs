use crate::PaintApp;
use crate::layer::AspectRatio;
use crate::tools::{Color, FontFamily, PALETTE, STROKE_WIDTH_RANGE, ToolKind};

pub fn tools_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let active = app.tool_config().tool;
            ui.horizontal_wrapped(|ui| {
                for tool in ToolKind::ALL {
                    let label = format!("{} {}", tool.icon(), tool.name());
                    if ui.selectable_label(active == tool, label).clicked() {
                        app.set_tool(tool);
                    }
                }
            });
            ui.separator();

            ui.label("Color");
            ui.horizontal_wrapped(|ui| {
                for swatch in PALETTE {
                    let selected = app.tool_config().color == swatch;
                    let size = egui::vec2(20.0, 20.0);
                    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
                    ui.painter().rect_filled(rect, 3.0, swatch.to_color32());
                    if selected {
                        ui.painter().rect_stroke(rect, 3.0, ui.visuals().selection.stroke);
                    }
                    if response.on_hover_text(swatch.to_string()).clicked() {
                        app.tool_config_mut().color = swatch;
                    }
                }

                let mut custom = app.tool_config().color.to_color32();
                if ui.color_edit_button_srgba(&mut custom).changed() {
                    app.tool_config_mut().color = Color::from_color32(custom);
                }
            });

            ui.add(egui::Slider::new(&mut app.tool_config_mut().stroke_width, STROKE_WIDTH_RANGE).text("Size"));

            if active == ToolKind::Text {
                ui.separator();
                ui.label("Text");
                let config = app.tool_config_mut();
                egui::ComboBox::from_id_salt("font_family")
                    .selected_text(config.font_family.name())
                    .show_ui(ui, |ui| {
                        for family in FontFamily::ALL {
                            ui.selectable_value(&mut config.font_family, family, family.name());
                        }
                    });
                ui.add(egui::Slider::new(&mut config.font_size, 8.0..=120.0).text("Font size"));
                ui.checkbox(&mut config.bold, "Bold");
            }
            ui.separator();

            ui.label("Canvas");
            let current = app.aspect();
            egui::ComboBox::from_id_salt("aspect_ratio")
                .selected_text(current.to_string())
                .show_ui(ui, |ui| {
                    for aspect in AspectRatio::ALL {
                        if ui.selectable_label(current == aspect, aspect.to_string()).clicked() {
                            app.set_aspect(aspect);
                        }
                    }
                });
            ui.label(format!("{} × {}", app.engine().width(), app.engine().height()));

            ui.horizontal(|ui| {
                if ui.add_enabled(app.engine().can_undo(), egui::Button::new("Undo")).clicked() {
                    app.undo();
                }
                if ui.button("Clear").clicked() {
                    app.clear();
                }
                if ui.button("Download").clicked() {
                    app.download(ctx);
                }
            });
            ui.label(format!("Undo states: {}", app.engine().history_len()));
            ui.separator();

            ui.label("Background");
            ui.add(egui::TextEdit::singleline(&mut app.background_input).hint_text("Path or data URL"));
            ui.horizontal(|ui| {
                let loading = app.engine().background_pending();
                if ui.add_enabled(!loading, egui::Button::new("Load")).clicked() {
                    app.load_background_from_input();
                }
                if ui.add_enabled(app.engine().has_background(), egui::Button::new("Remove")).clicked() {
                    app.clear_background();
                }
                if loading {
                    ui.spinner();
                }
            });

            if let Some(status) = app.status() {
                ui.separator();
                ui.small(status);
            }

            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                ui.small(format!("Session {}", app.engine().session_id()));
                ui.small(format!("State: {}", app.engine().session().name()));
            });
        });
}
