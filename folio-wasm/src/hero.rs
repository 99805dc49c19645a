//! Hero connection network: a rotating ring of glowing nodes whose links
//! pulse with a travelling activation wave around a rainbow core.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use web_sys::{CanvasRenderingContext2d, Document, Window};

use sketch_core::math::{lerp, remap};
use sketch_core::network::{self, NODE_COUNT, NetLink, NetNode};
use sketch_core::rng::XorShift;

use crate::constants::HERO_CANVAS_ID;
use crate::dom::{self, set_fill_style, set_stroke_style};

const SIZE: u32 = 200;

struct HeroNet {
    nodes: Vec<NetNode>,
    links: Vec<NetLink>,
    time: f64,
}

pub fn install(window: &Window, document: &Document) {
    let (canvas, ctx) = match dom::canvas_2d(document, HERO_CANVAS_ID) {
        Ok(v) => v,
        Err(_) => {
            log::warn!("hero canvas #{HERO_CANVAS_ID} missing; network sketch disabled");
            return;
        }
    };
    canvas.set_width(SIZE);
    canvas.set_height(SIZE);

    let mut rng = XorShift::new(0x6e65_7477);
    let nodes = (0..NODE_COUNT)
        .map(|i| NetNode::new(i, NODE_COUNT, rng.range(TAU)))
        .collect();
    let links = network::link_topology(NODE_COUNT)
        .into_iter()
        .map(|(a, b)| NetLink::new(a, b))
        .collect();
    let state = Rc::new(RefCell::new(HeroNet {
        nodes,
        links,
        time: 0.0,
    }));

    dom::start_raf_loop(window, move |_ts| {
        let mut s = state.borrow_mut();
        s.step();
        s.draw(&ctx);
    });
}

impl HeroNet {
    fn step(&mut self) {
        for (i, link) in self.links.iter_mut().enumerate() {
            link.drive(network::activation_wave(self.time, i));
            link.settle();
        }
        let t = self.time;
        for node in &mut self.nodes {
            node.update(t);
        }
        self.time += 0.02;
    }

    fn draw(&self, ctx: &CanvasRenderingContext2d) {
        let (w, h) = (SIZE as f64, SIZE as f64);
        ctx.clear_rect(0.0, 0.0, w, h);
        ctx.save();
        let _ = ctx.translate(w / 2.0, h / 2.0);

        for link in &self.links {
            if link.strength <= 0.01 {
                continue;
            }
            let (x1, y1) = self.nodes[link.a].position();
            let (x2, y2) = self.nodes[link.b].position();
            let flow = self.time * 2.0;
            let segments = 10;
            ctx.set_line_width(2.5 * link.strength);
            for s in 0..segments {
                let t1 = s as f64 / segments as f64;
                let t2 = (s + 1) as f64 / segments as f64;
                let hue = lerp(self.nodes[link.a].hue, self.nodes[link.b].hue, t1);
                let alpha = remap((t1 * TAU * 2.0 + flow).sin(), -1.0, 1.0, 80.0, 180.0)
                    * link.strength
                    / 255.0;
                set_stroke_style(ctx, &hsla(hue, 85.0, 60.0, alpha));
                ctx.begin_path();
                ctx.move_to(lerp(x1, x2, t1), lerp(y1, y2, t1));
                ctx.line_to(lerp(x1, x2, t2), lerp(y1, y2, t2));
                ctx.stroke();
            }
        }

        for node in &self.nodes {
            let (x, y) = node.position();

            ctx.set_line_width(2.0);
            set_stroke_style(ctx, &hsla(node.hue, 80.0, 60.0, 0.6));
            circle_stroke(ctx, x, y, node.pulse_diameter(self.time) / 2.0);

            set_fill_style(ctx, &hsla(node.hue, 70.0, 65.0, 0.3));
            circle_fill(ctx, x, y, node.size * 1.25);

            set_fill_style(ctx, &hsla(node.hue, 90.0, 55.0, 1.0));
            circle_fill(ctx, x, y, node.size / 2.0);

            set_fill_style(ctx, "rgba(255, 255, 255, 0.8)");
            circle_fill(ctx, x + 1.0, y - 1.0, node.size * 0.2);
        }

        // Convergence core, cycling through the rainbow.
        let core = 12.0 + 4.0 * (self.time * 3.0).sin();
        let hue = network::core_hue(self.time);
        for ring in (1..=3).rev() {
            set_fill_style(ctx, &hsla(hue, 85.0, 60.0, 0.27 / ring as f64));
            circle_fill(ctx, 0.0, 0.0, core * ring as f64 * 0.75);
        }
        set_fill_style(ctx, &hsla(hue, 90.0, 55.0, 1.0));
        circle_fill(ctx, 0.0, 0.0, core / 2.0);
        set_fill_style(ctx, "rgba(255, 255, 255, 0.94)");
        circle_fill(ctx, 0.0, 0.0, core / 4.0);

        ctx.restore();
    }
}

fn circle_fill(ctx: &CanvasRenderingContext2d, x: f64, y: f64, r: f64) {
    ctx.begin_path();
    let _ = ctx.arc(x, y, r, 0.0, TAU);
    ctx.fill();
}

fn circle_stroke(ctx: &CanvasRenderingContext2d, x: f64, y: f64, r: f64) {
    ctx.begin_path();
    let _ = ctx.arc(x, y, r, 0.0, TAU);
    ctx.stroke();
}

fn hsla(h: f64, s: f64, l: f64, a: f64) -> String {
    format!("hsla({h:.0}, {s:.0}%, {l:.0}%, {a:.3})")
}
