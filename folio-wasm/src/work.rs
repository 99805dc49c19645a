//! Work-section path visualization: project nodes on a flowing polyline.
//! Embeddable nodes glow and open the project dialog when activated.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, Document, HtmlElement, MouseEvent, Window};

use sketch_core::path::{self, PathNode};

use crate::constants::WORK_CANVAS_ID;
use crate::dom::{self, set_fill_style, set_stroke_style};
use crate::{Catalog, modal};

const CANVAS_HEIGHT: u32 = 800;

struct WorkView {
    nodes: Vec<PathNode>,
    points: Vec<(f64, f64)>,
    hover: Option<usize>,
    mouse: (f64, f64),
    catalog_rev: u64,
}

impl WorkView {
    fn relayout(&mut self, catalog: &Catalog, w: f64, h: f64) {
        let flags: Vec<bool> = catalog
            .records()
            .iter()
            .map(|r| r.embed_target().is_some())
            .collect();
        self.nodes = path::layout(&flags, w, h);
        self.points = path::waypoints(&self.nodes);
        self.catalog_rev = catalog.rev();
    }
}

pub fn install(
    window: &Window,
    document: &Document,
    catalog: Rc<Catalog>,
    modal: Option<modal::Shared>,
) {
    let (canvas, ctx) = match dom::canvas_2d(document, WORK_CANVAS_ID) {
        Ok(v) => v,
        Err(_) => {
            log::warn!("work canvas #{WORK_CANVAS_ID} missing; project path disabled");
            return;
        }
    };
    let (w, _) = dom::inner_size(window);
    canvas.set_width(w as u32);
    canvas.set_height(CANVAS_HEIGHT);

    let mut view = WorkView {
        nodes: Vec::new(),
        points: Vec::new(),
        hover: None,
        mouse: (-1.0, -1.0),
        catalog_rev: 0,
    };
    view.relayout(&catalog, w, CANVAS_HEIGHT as f64);
    let view = Rc::new(RefCell::new(view));

    // Pointer tracking for hover highlighting.
    {
        let view = view.clone();
        let canvas = canvas.clone();
        let canvas_inner = canvas.clone();
        let onmove = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            view.borrow_mut().mouse = dom::event_canvas_coords(&e, &canvas_inner);
        }));
        let _ = canvas.add_event_listener_with_callback("mousemove", onmove.as_ref().unchecked_ref());
        onmove.forget();
    }

    // Activating an embeddable node opens its project dialog, with the
    // canvas as the focus-return origin.
    {
        let view = view.clone();
        let canvas = canvas.clone();
        let canvas_inner = canvas.clone();
        let catalog = catalog.clone();
        let onclick = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let (mx, my) = dom::event_canvas_coords(&e, &canvas_inner);
            let hit = path::hit(&view.borrow().nodes, mx, my);
            let Some(index) = hit else { return };
            let record = catalog.records().get(index).cloned();
            let Some(record) = record else { return };
            if record.embed_target().is_none() {
                log::info!("project {:?} has no embed to open", record.id);
                return;
            }
            if let Some(modal) = &modal {
                let origin: HtmlElement = canvas_inner.clone().unchecked_into();
                modal::open_project(modal, &record, Some(origin));
            }
        }));
        let _ = canvas.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref());
        onclick.forget();
    }

    {
        let view = view.clone();
        let canvas = canvas.clone();
        let win = window.clone();
        let onresize = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let (w, _) = dom::inner_size(&win);
            canvas.set_width(w as u32);
            let mut v = view.borrow_mut();
            path::rescale(&mut v.nodes, w, CANVAS_HEIGHT as f64);
            v.points = path::waypoints(&v.nodes);
        }));
        let _ =
            window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref());
        onresize.forget();
    }

    dom::start_raf_loop(window, move |_ts| {
        let mut v = view.borrow_mut();
        if v.catalog_rev != catalog.rev() {
            let w = canvas.width() as f64;
            v.relayout(&catalog, w, CANVAS_HEIGHT as f64);
        }
        let (mx, my) = v.mouse;
        v.hover = path::hit(&v.nodes, mx, my);
        draw(&ctx, canvas.width() as f64, canvas.height() as f64, &v);
    });
}

fn draw(ctx: &CanvasRenderingContext2d, w: f64, h: f64, view: &WorkView) {
    ctx.clear_rect(0.0, 0.0, w, h);

    if !view.points.is_empty() {
        set_stroke_style(ctx, "rgba(255, 255, 255, 0.12)");
        ctx.set_line_width(2.0);
        ctx.begin_path();
        let (x0, y0) = view.points[0];
        ctx.move_to(x0, y0);
        for &(x, y) in &view.points[1..] {
            ctx.line_to(x, y);
        }
        ctx.stroke();
    }

    for node in &view.nodes {
        let hovered = view.hover == Some(node.index);
        let (ow, oh) = if hovered { (68.0, 46.0) } else { (60.0, 40.0) };

        if node.has_embed {
            set_fill_style(
                ctx,
                if hovered {
                    "rgba(0, 255, 200, 0.12)"
                } else {
                    "rgba(0, 255, 200, 0.06)"
                },
            );
            oval_fill(ctx, node.x, node.y, (ow + 20.0) / 2.0, (oh + 15.0) / 2.0);
        }

        set_fill_style(ctx, "#0a0a0f");
        if node.has_embed {
            set_stroke_style(ctx, "rgb(0, 255, 200)");
        } else {
            set_stroke_style(ctx, "rgba(255, 255, 255, 0.4)");
        }
        ctx.set_line_width(2.0);
        ctx.begin_path();
        let _ = ctx.ellipse(node.x, node.y, ow / 2.0, oh / 2.0, 0.0, 0.0, TAU);
        ctx.fill();
        ctx.stroke();

        if node.has_embed {
            set_fill_style(ctx, "rgb(0, 255, 200)");
        } else {
            set_fill_style(ctx, "rgba(255, 255, 255, 0.6)");
        }
        ctx.set_font("18px 'JetBrains Mono', monospace");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let _ = ctx.fill_text(&node.label(), node.x, node.y);
    }
}

fn oval_fill(ctx: &CanvasRenderingContext2d, x: f64, y: f64, rx: f64, ry: f64) {
    ctx.begin_path();
    let _ = ctx.ellipse(x, y, rx, ry, 0.0, 0.0, TAU);
    ctx.fill();
}
