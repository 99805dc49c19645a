//! Scroll-driven background tinting: the body background eases between
//! near-black tints as the viewport center crosses page sections.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, HtmlElement, Window};

use sketch_core::tint::{SectionBand, tint_at};

use crate::constants::SECTION_SELECTOR;

pub fn install(window: &Window, document: &Document) {
    let Some(body) = document.body() else {
        log::warn!("no document body; background tinting disabled");
        return;
    };
    let bands = measure_sections(document);
    if bands.is_empty() {
        log::warn!("no page sections found; background stays on the hero tint");
    }

    let apply: Rc<dyn Fn()> = Rc::new({
        let win = window.clone();
        let body = body.clone();
        move || {
            let scroll = win.scroll_y().unwrap_or(0.0);
            let (_, inner_h) = crate::dom::inner_size(&win);
            let color = tint_at(&bands, scroll + inner_h / 2.0);
            let _ = body.style().set_property("background-color", color);
        }
    });
    (*apply)();

    // Throttle scroll work through at most one animation frame at a time.
    let ticking = Rc::new(Cell::new(false));
    let win = window.clone();
    let onscroll = Closure::<dyn FnMut()>::wrap(Box::new(move || {
        if ticking.get() {
            return;
        }
        ticking.set(true);
        let ticking = ticking.clone();
        let apply = apply.clone();
        let cb = Closure::once(move || {
            (*apply)();
            ticking.set(false);
        });
        let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
        cb.forget();
    }));
    let _ = window.add_event_listener_with_callback("scroll", onscroll.as_ref().unchecked_ref());
    onscroll.forget();
}

fn measure_sections(document: &Document) -> Vec<SectionBand> {
    let mut bands = Vec::new();
    if let Ok(list) = document.query_selector_all(SECTION_SELECTOR) {
        for i in 0..list.length() {
            if let Some(node) = list.item(i)
                && let Ok(el) = node.dyn_into::<HtmlElement>()
            {
                bands.push(SectionBand {
                    id: el.id(),
                    top: el.offset_top() as f64,
                    height: el.offset_height() as f64,
                });
            }
        }
    }
    bands
}
