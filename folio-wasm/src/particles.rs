//! Particle overlay for the hero title: rigid-body circles rain down over
//! the heading, bouncing off per-letter colliders before falling out of the
//! canvas. Simulation by rapier2d; spawn and cull policy from sketch-core.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use rapier2d::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, Window};

use sketch_core::physics::{self, SpawnClock, SpawnPlan};
use sketch_core::rng::XorShift;

use crate::constants::HERO_TITLE_SELECTOR;
use crate::dom::{self, set_fill_style};

struct ParticleField {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    params: IntegrationParameters,
    gravity: Vector<Real>,
    live: Vec<(RigidBodyHandle, f64)>,
    clock: SpawnClock,
    rng: XorShift,
    last_ts: Option<f64>,
}

impl ParticleField {
    fn new() -> Self {
        ParticleField {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            params: IntegrationParameters::default(),
            gravity: vector![0.0, 540.0],
            live: Vec::new(),
            clock: SpawnClock::default(),
            rng: XorShift::new(0x7061_7274),
            last_ts: None,
        }
    }

    fn add_static_box(&mut self, cx: f64, cy: f64, hw: f64, hh: f64) {
        self.colliders.insert(
            ColliderBuilder::cuboid(hw as f32, hh as f32)
                .translation(vector![cx as f32, cy as f32])
                .restitution(0.9)
                .build(),
        );
    }

    fn spawn(&mut self, plan: SpawnPlan) {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![plan.x as f32, plan.y as f32])
            .build();
        let handle = self.bodies.insert(body);
        self.colliders.insert_with_parent(
            ColliderBuilder::ball(plan.radius as f32)
                .restitution(0.8)
                .friction(0.001)
                .density(0.001)
                .build(),
            handle,
            &mut self.bodies,
        );
        self.live.push((handle, plan.radius));
    }

    fn step(&mut self, ts: f64, width: f64, height: f64) {
        let dt_ms = match self.last_ts.replace(ts) {
            Some(last) => (ts - last).max(0.0),
            None => 0.0,
        };

        for _ in 0..self.clock.tick(dt_ms, self.live.len()) {
            let plan = physics::spawn_plan(&mut self.rng, width);
            self.spawn(plan);
        }

        self.params.dt = ((dt_ms / 1000.0).clamp(1.0 / 240.0, 1.0 / 30.0)) as f32;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            &(),
            &(),
        );

        // Retire particles that fell past the canvas.
        let mut i = 0;
        while i < self.live.len() {
            let (handle, _) = self.live[i];
            let done = self
                .bodies
                .get(handle)
                .is_none_or(|b| physics::expired(b.translation().y as f64, height));
            if done {
                self.bodies.remove(
                    handle,
                    &mut self.islands,
                    &mut self.colliders,
                    &mut self.impulse_joints,
                    &mut self.multibody_joints,
                    true,
                );
                self.live.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    fn draw(&self, ctx: &CanvasRenderingContext2d) {
        set_fill_style(ctx, "rgba(0, 217, 255, 0.8)");
        for (handle, radius) in &self.live {
            if let Some(body) = self.bodies.get(*handle) {
                let p = body.translation();
                ctx.begin_path();
                let _ = ctx.arc(p.x as f64, p.y as f64, *radius, 0.0, TAU);
                ctx.fill();
            }
        }
    }
}

pub fn install(window: &Window, document: &Document) {
    let title = document
        .query_selector(HERO_TITLE_SELECTOR)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    let Some(title) = title else {
        log::warn!("hero title missing; particle overlay disabled");
        return;
    };
    let Some(container) = title
        .parent_element()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        log::warn!("hero title has no container; particle overlay disabled");
        return;
    };

    // Pointer-transparent canvas stretched over the title's container.
    let Ok(canvas) = document
        .create_element("canvas")
        .map(|el| el.unchecked_into::<HtmlCanvasElement>())
    else {
        return;
    };
    let style = canvas.style();
    let _ = style.set_property("position", "absolute");
    let _ = style.set_property("top", "0");
    let _ = style.set_property("left", "0");
    let _ = style.set_property("width", "100%");
    let _ = style.set_property("height", "100%");
    let _ = style.set_property("pointer-events", "none");
    let _ = style.set_property("z-index", "5");
    let _ = container.style().set_property("position", "relative");
    if container.append_child(&canvas).is_err() {
        return;
    }
    canvas.set_width(container.offset_width().max(1) as u32);
    canvas.set_height(container.offset_height().max(1) as u32);

    let Ok(Some(ctx)) = canvas.get_context("2d") else {
        log::warn!("2D context unavailable; particle overlay disabled");
        return;
    };
    let ctx: CanvasRenderingContext2d = match ctx.dyn_into() {
        Ok(c) => c,
        Err(_) => return,
    };

    let mut field = ParticleField::new();
    add_letter_colliders(&mut field, window, &ctx, &title, &container);
    let (w, h) = (canvas.width() as f64, canvas.height() as f64);
    field.add_static_box(w / 2.0, h + 25.0, w / 2.0, 25.0);

    let field = Rc::new(RefCell::new(field));
    dom::start_raf_loop(window, move |ts| {
        let mut field = field.borrow_mut();
        let (w, h) = (canvas.width() as f64, canvas.height() as f64);
        field.step(ts, w, h);
        ctx.clear_rect(0.0, 0.0, w, h);
        field.draw(&ctx);
    });
}

/// One static collider per letter of the title, sized from the measured
/// character advances at the computed font.
fn add_letter_colliders(
    field: &mut ParticleField,
    window: &Window,
    ctx: &CanvasRenderingContext2d,
    title: &HtmlElement,
    container: &HtmlElement,
) {
    let text = title.inner_text();
    let mut size = 72.0;
    let mut family = String::from("Inter, sans-serif");
    if let Ok(Some(css)) = window.get_computed_style(title) {
        if let Ok(fs) = css.get_property_value("font-size")
            && let Some(px) = fs.strip_suffix("px").and_then(|v| v.parse::<f64>().ok())
        {
            size = px;
        }
        if let Ok(ff) = css.get_property_value("font-family")
            && !ff.is_empty()
        {
            family = ff;
        }
    }
    ctx.set_font(&format!("{size}px {family}"));

    let trect = title.get_bounding_client_rect();
    let crect = container.get_bounding_client_rect();
    let mut x = trect.left() - crect.left();
    let cy = trect.top() - crect.top() + trect.height() / 2.0;
    for ch in text.chars() {
        let advance = ctx
            .measure_text(&ch.to_string())
            .map(|m| m.width())
            .unwrap_or(size * 0.5);
        if !ch.is_whitespace() {
            field.add_static_box(x + advance / 2.0, cy, advance / 2.0, size / 2.0);
        }
        x += advance;
    }
}
