//! Footer scanning ray: a soft beam sweeping across a hairline at the bottom
//! of the page.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, Document, Window};

use sketch_core::ray::ScanRay;

use crate::constants::FOOTER_CANVAS_ID;
use crate::dom::{self, set_fill_style, set_stroke_style};

const STRIP_HEIGHT: u32 = 60;

pub fn install(window: &Window, document: &Document) {
    let (canvas, ctx) = match dom::canvas_2d(document, FOOTER_CANVAS_ID) {
        Ok(v) => v,
        Err(_) => {
            log::warn!("footer canvas #{FOOTER_CANVAS_ID} missing; scanning ray disabled");
            return;
        }
    };
    let (w, _) = dom::inner_size(window);
    canvas.set_width(w as u32);
    canvas.set_height(STRIP_HEIGHT);

    {
        let canvas = canvas.clone();
        let win = window.clone();
        let onresize = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let (w, _) = dom::inner_size(&win);
            canvas.set_width(w as u32);
        }));
        let _ =
            window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref());
        onresize.forget();
    }

    let ray = Rc::new(RefCell::new(ScanRay::new()));
    dom::start_raf_loop(window, move |_ts| {
        let mut ray = ray.borrow_mut();
        draw(&ctx, canvas.width() as f64, canvas.height() as f64, &ray);
        let span = canvas.width() as f64;
        ray.advance(span);
    });
}

fn draw(ctx: &CanvasRenderingContext2d, w: f64, h: f64, ray: &ScanRay) {
    ctx.clear_rect(0.0, 0.0, w, h);

    // Hairline across the strip.
    set_stroke_style(ctx, "rgba(255, 255, 255, 0.06)");
    ctx.set_line_width(1.0);
    ctx.begin_path();
    ctx.move_to(0.0, h / 2.0);
    ctx.line_to(w, h / 2.0);
    ctx.stroke();

    // The beam, one pixel column at a time, fading out from its center.
    for i in 0..ray.width as i32 {
        let x = ray.x + i as f64;
        if x >= 0.0 && x <= w {
            let alpha = ray.slice_alpha(i as f64) / 255.0;
            set_fill_style(ctx, &format!("rgba(255, 255, 255, {alpha:.3})"));
            ctx.fill_rect(x, h / 2.0 - 2.0, 1.0, 4.0);
        }
    }
}
