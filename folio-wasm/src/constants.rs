//! DOM anchors and resource paths shared by the page features.

pub const MODAL_ROOT_ID: &str = "project-modal";
pub const HERO_CANVAS_ID: &str = "hero-shape-canvas";
pub const TITLE_HOST_ID: &str = "hero-title-3d";
pub const HERO_TITLE_SELECTOR: &str = ".hero-title";
pub const WORK_CANVAS_ID: &str = "work-path-canvas";
pub const FOOTER_CANVAS_ID: &str = "footer-canvas";
pub const SECTION_SELECTOR: &str = ".section";

pub const CATALOG_PATH: &str = "data/projects.json";
pub const DEEP_LINK_PARAM: &str = "project";
