//! 3D-styled hero title: redraws the heading on an overlay canvas as a
//! stack of offset shadow layers with a gentle wobble.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, Window};

use sketch_core::title::{depth_layers, wobble_tilt};

use crate::constants::{HERO_TITLE_SELECTOR, TITLE_HOST_ID};
use crate::dom::{self, set_fill_style};

pub fn install(window: &Window, document: &Document) {
    let Some(host) = dom::html_element(document, TITLE_HOST_ID) else {
        log::warn!("title host #{TITLE_HOST_ID} missing; 3D title disabled");
        return;
    };

    // The real heading supplies the text and size so markup stays the source
    // of truth.
    let heading = host
        .parent_element()
        .and_then(|p| p.query_selector(HERO_TITLE_SELECTOR).ok().flatten())
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    let mut text = String::from("Martuza Ferdous");
    let mut title_size = 72.0;
    if let Some(h1) = &heading {
        let t = h1.inner_text();
        let t = t.trim();
        if !t.is_empty() {
            text = t.to_string();
        }
        if let Ok(Some(css)) = window.get_computed_style(h1)
            && let Ok(fs) = css.get_property_value("font-size")
            && let Some(px) = fs.strip_suffix("px").and_then(|v| v.parse::<f64>().ok())
        {
            title_size = px;
        }
    }

    let Ok(canvas) = document
        .create_element("canvas")
        .map(|el| el.unchecked_into::<HtmlCanvasElement>())
    else {
        return;
    };
    if host.append_child(&canvas).is_err() {
        return;
    }
    size_canvas(&host, &canvas, title_size);

    let Ok(Some(ctx)) = canvas.get_context("2d") else {
        log::warn!("2D context unavailable; 3D title disabled");
        return;
    };
    let ctx: CanvasRenderingContext2d = match ctx.dyn_into() {
        Ok(c) => c,
        Err(_) => return,
    };

    {
        let host = host.clone();
        let canvas = canvas.clone();
        let onresize = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            size_canvas(&host, &canvas, title_size);
        }));
        let _ =
            window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref());
        onresize.forget();
    }

    let frame = Rc::new(Cell::new(0.0_f64));
    dom::start_raf_loop(window, move |_ts| {
        let f = frame.get();
        frame.set(f + 1.0);
        draw(&ctx, &canvas, &text, title_size, f);
    });
}

fn size_canvas(host: &HtmlElement, canvas: &HtmlCanvasElement, title_size: f64) {
    let rect = host.get_bounding_client_rect();
    let w = if rect.width() > 0.0 { rect.width() } else { 600.0 };
    let h = (title_size * 2.0).max(180.0);
    canvas.set_width(w as u32);
    canvas.set_height(h as u32);
}

fn draw(
    ctx: &CanvasRenderingContext2d,
    canvas: &HtmlCanvasElement,
    text: &str,
    title_size: f64,
    frame: f64,
) {
    let (w, h) = (canvas.width() as f64, canvas.height() as f64);
    ctx.clear_rect(0.0, 0.0, w, h);
    ctx.save();
    let _ = ctx.translate(w / 2.0, h / 2.0);
    ctx.set_font(&format!("700 {title_size}px Inter, sans-serif"));
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");

    // Depth stack first, then the face on top.
    set_fill_style(ctx, "rgba(0, 168, 255, 0.35)");
    for layer in depth_layers(wobble_tilt(frame)) {
        let _ = ctx.fill_text(text, layer.dx, layer.dy);
    }
    set_fill_style(ctx, "#ffffff");
    let _ = ctx.fill_text(text, 0.0, 0.0);
    ctx.restore();
}
