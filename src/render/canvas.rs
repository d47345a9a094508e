//! Canvas 2D painter
//!
//! Replays a captured [`Scene`] onto a `CanvasRenderingContext2d`. All
//! drawing failures are inconsequential per-frame noise and are discarded.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::Scene;

pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
}

impl CanvasPainter {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    pub fn draw(&self, scene: &Scene) {
        let ctx = &self.ctx;
        let (w, h) = (scene.width as f64, scene.height as f64);

        ctx.set_global_alpha(1.0);
        ctx.set_fill_style_str(scene.background);
        ctx.fill_rect(0.0, 0.0, w, h);

        // Dashed center line
        let dash = js_sys::Array::of2(&JsValue::from_f64(10.0), &JsValue::from_f64(10.0));
        let _ = ctx.set_line_dash(dash.as_ref());
        ctx.begin_path();
        ctx.move_to(w / 2.0, 0.0);
        ctx.line_to(w / 2.0, h);
        ctx.set_stroke_style_str(scene.center_line);
        ctx.stroke();
        let _ = ctx.set_line_dash(js_sys::Array::new().as_ref());

        for rect in &scene.rects {
            ctx.set_fill_style_str(rect.color);
            ctx.fill_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
        }

        for circle in &scene.circles {
            ctx.set_global_alpha(circle.alpha as f64);
            ctx.set_fill_style_str(circle.color);
            ctx.begin_path();
            let _ = ctx.arc(
                circle.x as f64,
                circle.y as f64,
                circle.r.max(0.1) as f64,
                0.0,
                std::f64::consts::TAU,
            );
            ctx.fill();
        }
        ctx.set_global_alpha(1.0);

        ctx.set_text_align("center");
        for text in &scene.texts {
            ctx.set_font(&format!("{}px Arial", text.size));
            ctx.set_fill_style_str(text.color);
            let _ = ctx.fill_text(&text.text, text.x as f64, text.y as f64);
        }
    }
}
