use egui::{Color32, FontId, Id, Rect, Sense, pos2, vec2};

use crate::PaintApp;
use crate::input::{CanvasEvent, to_canvas_coords, to_screen_coords};
use crate::state::EditingSession;
use crate::tools::FontFamily;

pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::central_panel(&ctx.style()).fill(Color32::from_gray(230)))
        .show(ctx, |ui| {
            let available = ui.available_size();
            app.fit_canvas(available);

            let (response, painter) = ui.allocate_painter(available, Sense::click_and_drag());
            let canvas_size = [app.engine().width(), app.engine().height()];
            let canvas_rect = Rect::from_center_size(
                response.rect.center(),
                vec2(canvas_size[0] as f32, canvas_size[1] as f32),
            );

            handle_pointer(app, ctx, &response, canvas_rect, canvas_size);

            let (textures, engine) = app.textures_and_engine();
            let texture = textures.texture_for(ctx, engine);
            painter.rect_filled(canvas_rect, 0.0, Color32::WHITE);
            painter.image(
                texture,
                canvas_rect,
                Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                Color32::WHITE,
            );

            text_editor(app, ctx, canvas_rect, canvas_size);
        });
}

/// Translates raw pointer state into canvas events
fn handle_pointer(app: &mut PaintApp, ctx: &egui::Context, response: &egui::Response, canvas_rect: Rect, canvas_size: [u32; 2]) {
    let (pressed, released, position) = ctx.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.interact_pos().or(i.pointer.hover_pos()),
        )
    });
    let Some(screen) = position else {
        if app.pointer_inside {
            app.pointer_inside = false;
            app.send(CanvasEvent::PointerLeave);
        }
        return;
    };

    let inside = canvas_rect.contains(screen);
    let canvas = to_canvas_coords(screen, canvas_rect, canvas_size);

    if pressed && inside && response.hovered() {
        app.send(CanvasEvent::PointerDown(canvas));
    }

    let dragging = matches!(
        app.engine().session(),
        EditingSession::Stroking(_) | EditingSession::ShapeDragging(_)
    );
    if dragging {
        if inside {
            app.send(CanvasEvent::PointerMove(canvas));
        } else if app.pointer_inside {
            app.send(CanvasEvent::PointerLeave);
        }
        if released {
            app.send(CanvasEvent::PointerUp(canvas));
        }
    }
    app.pointer_inside = inside;
}

/// The floating editor shown while a text session is open
fn text_editor(app: &mut PaintApp, ctx: &egui::Context, canvas_rect: Rect, canvas_size: [u32; 2]) {
    let session = app.engine().session();
    let (Some((anchor, _)), Some(style)) = (session.text(), session.text_style().copied()) else {
        return;
    };

    let editor_id = Id::new(("text_editor", anchor.x.to_bits(), anchor.y.to_bits()));
    let has_focus = ctx.memory(|m| m.has_focus(editor_id));
    if has_focus && ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Enter)) {
        app.send(CanvasEvent::Enter { shift: false });
        return;
    }

    let font = match style.family {
        FontFamily::Monospace => FontId::monospace(style.size),
        FontFamily::Inter | FontFamily::Georgia => FontId::proportional(style.size),
    };

    let screen_anchor = to_screen_coords(anchor, canvas_rect, canvas_size);
    let inner = egui::Area::new(Id::new("text_editor_area"))
        .fixed_pos(screen_anchor)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::TextEdit::multiline(&mut app.text_draft)
                .id(editor_id)
                .font(font)
                .text_color(style.color.to_color32())
                .desired_rows(1)
                .desired_width(canvas_rect.right() - screen_anchor.x)
                .frame(true)
                .show(ui)
                .response
        });
    let editor = inner.inner;

    if app.focus_text_editor {
        editor.request_focus();
        app.focus_text_editor = false;
    }
    if editor.changed() {
        let text = app.text_draft.clone();
        app.send(CanvasEvent::TextChanged(text));
    }
    if editor.lost_focus() {
        app.send(CanvasEvent::Blur);
    }
}
