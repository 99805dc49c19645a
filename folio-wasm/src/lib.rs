//! Browser entry point for the portfolio's visual layer: scroll tinting,
//! the generative canvas sketches, and the project-embed dialog.
//!
//! Every feature degrades independently: a missing mount point logs a
//! warning and leaves the rest of the page working.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::Window;

use folio_core::ModalTiming;
use folio_core::catalog::{self, ProjectRecord};

mod constants;
mod dom;
mod footer;
mod hero;
pub mod modal;
mod particles;
mod tint;
mod title;
mod work;

const EMBEDDED_CATALOG: &str = include_str!("../../data/projects.json");

/// Shared, replaceable view of the project catalog. `rev` bumps whenever the
/// records are swapped so per-frame readers can cheaply notice the change.
pub struct Catalog {
    records: RefCell<Vec<ProjectRecord>>,
    rev: Cell<u64>,
}

impl Catalog {
    fn new(records: Vec<ProjectRecord>) -> Self {
        Catalog {
            records: RefCell::new(records),
            rev: Cell::new(1),
        }
    }

    pub fn records(&self) -> Ref<'_, Vec<ProjectRecord>> {
        self.records.borrow()
    }

    pub fn rev(&self) -> u64 {
        self.rev.get()
    }

    fn replace(&self, records: Vec<ProjectRecord>) {
        *self.records.borrow_mut() = records;
        self.rev.set(self.rev.get() + 1);
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let records = catalog::parse_catalog(EMBEDDED_CATALOG)
        .map_err(|e| JsValue::from_str(&format!("embedded catalog: {e}")))?;
    let catalog = Rc::new(Catalog::new(records));

    tint::install(&window, &document);
    hero::install(&window, &document);
    title::install(&window, &document);
    particles::install(&window, &document);
    footer::install(&window, &document);

    let modal = modal::init(&window, &document, ModalTiming::default());
    if modal.is_none() {
        log::error!("project dialog unavailable; embeds are disabled");
    }
    work::install(&window, &document, catalog.clone(), modal.clone());

    // Freshen the catalog from the network, then honor a deep link.
    wasm_bindgen_futures::spawn_local(async move {
        refresh_catalog(&window, &catalog).await;
        if let Some(modal) = &modal {
            open_deep_link(&window, &catalog, modal);
        }
    });
    Ok(())
}

async fn refresh_catalog(window: &Window, catalog: &Catalog) {
    let urls = [
        dom::asset_url(constants::CATALOG_PATH),
        format!("/{}", constants::CATALOG_PATH),
        constants::CATALOG_PATH.to_string(),
    ];
    let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
    let Some(text) = dom::fetch_text_with_fallbacks(window, &url_refs).await else {
        return;
    };
    match catalog::parse_catalog(&text) {
        Ok(records) if !records.is_empty() => {
            log::info!("catalog refreshed: {} projects", records.len());
            catalog.replace(records);
        }
        Ok(_) => log::warn!("fetched catalog is empty; keeping the bundled copy"),
        Err(e) => log::warn!("fetched catalog unreadable ({e}); keeping the bundled copy"),
    }
}

fn open_deep_link(window: &Window, catalog: &Catalog, modal: &modal::Shared) {
    let Ok(search) = window.location().search() else {
        return;
    };
    let Some(id) = dom::get_query_param(&search, constants::DEEP_LINK_PARAM) else {
        return;
    };
    let record = catalog::find(&catalog.records(), &id).cloned();
    match record {
        Some(record) => modal::open_project(modal, &record, None),
        None => log::warn!("deep link to unknown project {id:?}"),
    }
}
