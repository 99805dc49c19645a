//! DOM surface for the project-embed dialog.
//!
//! The lifecycle lives in [`folio_core::modal::EmbedModal`]; this module
//! caches the dialog's named regions, wires the concrete input events, and
//! executes the machine's effects: attribute toggles, region visibility, the
//! sandboxed iframe, `setTimeout` load/teardown timers, focus moves, and the
//! scroll lock.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, HtmlIFrameElement, KeyboardEvent, Window};

use folio_core::ProjectRecord;
use folio_core::modal::{
    Effect, EmbedModal, FrameSignal, FrameToken, ModalError, ModalTiming, UserInput,
};

use crate::constants::MODAL_ROOT_ID;

/// Delay before moving focus into the freshly shown dialog, letting the
/// open transition make the close control focusable.
const FOCUS_DELAY_MS: i32 = 100;

pub struct ModalController {
    window: Window,
    document: Document,
    machine: EmbedModal,
    root: HtmlElement,
    title_el: HtmlElement,
    loading_el: HtmlElement,
    embed_el: HtmlElement,
    close_el: HtmlElement,
    frame: Option<HtmlIFrameElement>,
    load_timer: Option<i32>,
    origin: Option<HtmlElement>,
}

pub type Shared = Rc<RefCell<ModalController>>;

/// Cache the dialog anchors and wire its input events. Returns `None` (and
/// logs) when the skeleton is missing, leaving the page otherwise working.
pub fn init(window: &Window, document: &Document, timing: ModalTiming) -> Option<Shared> {
    let Some(root) = crate::dom::html_element(document, MODAL_ROOT_ID) else {
        log::error!("modal root #{MODAL_ROOT_ID} not found in document");
        return None;
    };
    let backdrop = anchor(&root, ".modal-backdrop")?;
    let content = anchor(&root, ".modal-content")?;
    let close_el = anchor(&root, ".modal-close")?;
    let title_el = anchor(&root, ".modal-title")?;
    let loading_el = anchor(&root, ".modal-loading")?;
    let embed_el = anchor(&root, ".modal-embed")?;

    let controller = Rc::new(RefCell::new(ModalController {
        window: window.clone(),
        document: document.clone(),
        machine: EmbedModal::new(timing),
        root,
        title_el,
        loading_el,
        embed_el,
        close_el: close_el.clone(),
        frame: None,
        load_timer: None,
        origin: None,
    }));

    // Close control.
    {
        let rc = controller.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            dispatch_input(&rc, UserInput::CloseActivated);
        }));
        close_el
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())
            .ok()?;
        onclick.forget();
    }

    // Backdrop click.
    {
        let rc = controller.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            dispatch_input(&rc, UserInput::BackdropActivated);
        }));
        backdrop
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())
            .ok()?;
        onclick.forget();
    }

    // Clicks inside the dialog content must not reach the backdrop handler.
    {
        let contain = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(
            move |e: web_sys::Event| {
                e.stop_propagation();
            },
        ));
        content
            .add_event_listener_with_callback("click", contain.as_ref().unchecked_ref())
            .ok()?;
        contain.forget();
    }

    // Escape key. The machine no-ops while closed.
    {
        let rc = controller.clone();
        let onkey = Closure::<dyn FnMut(KeyboardEvent)>::wrap(Box::new(
            move |e: KeyboardEvent| {
                if e.key() == "Escape" {
                    dispatch_input(&rc, UserInput::EscapePressed);
                }
            },
        ));
        document
            .add_event_listener_with_callback("keydown", onkey.as_ref().unchecked_ref())
            .ok()?;
        onkey.forget();
    }

    Some(controller)
}

fn anchor(root: &HtmlElement, selector: &str) -> Option<HtmlElement> {
    let found = root
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    if found.is_none() {
        log::error!("modal region {selector} not found under #{MODAL_ROOT_ID}");
    }
    found
}

/// Open the dialog for `record`, remembering `origin` for focus return.
pub fn open_project(rc: &Shared, record: &ProjectRecord, origin: Option<HtmlElement>) {
    let result = rc.borrow_mut().machine.open(record);
    match result {
        Ok(effects) => {
            rc.borrow_mut().origin = origin;
            apply(rc, &effects);
        }
        // InvalidRequest is already logged by the machine; the trigger
        // surface simply should not have offered the action.
        Err(ModalError::InvalidRequest) => {}
        Err(ModalError::ReopenWhileClosing) => {
            log::warn!("open for {:?} ignored while it is still closing", record.id);
        }
    }
}

pub fn dispatch_input(rc: &Shared, input: UserInput) {
    let effects = rc.borrow_mut().machine.input(input);
    apply(rc, &effects);
}

pub fn dispatch_signal(rc: &Shared, signal: FrameSignal) {
    let effects = rc.borrow_mut().machine.signal(signal);
    apply(rc, &effects);
}

fn apply(rc: &Shared, effects: &[Effect]) {
    for effect in effects {
        let mut c = rc.borrow_mut();
        match effect {
            Effect::ShowDialog { title } => {
                c.title_el.set_inner_text(title);
                let _ = c.root.set_attribute("data-state", "open");
                let _ = c.root.set_attribute("aria-hidden", "false");
            }
            Effect::HideDialog => {
                let _ = c.root.set_attribute("data-state", "closed");
                let _ = c.root.set_attribute("aria-hidden", "true");
            }
            Effect::LockScroll => {
                if let Some(body) = c.document.body() {
                    let _ = body.style().set_property("overflow", "hidden");
                }
            }
            Effect::UnlockScroll => {
                if let Some(body) = c.document.body() {
                    let _ = body.style().remove_property("overflow");
                }
            }
            Effect::ShowLoading => set_display(&c.loading_el, "flex"),
            Effect::HideLoading => set_display(&c.loading_el, "none"),
            Effect::ShowEmbed => set_display(&c.embed_el, "block"),
            Effect::HideEmbed => set_display(&c.embed_el, "none"),
            Effect::CreateFrame {
                token,
                url,
                title,
                description,
            } => {
                if let Err(e) = create_frame(&mut c, rc, *token, url, title, description) {
                    log::error!("embed frame creation failed: {e:?}");
                    // Deliver the failure like a real frame event, after the
                    // rest of this effect list has been applied.
                    let rc2 = rc.clone();
                    let token = *token;
                    let cb = Closure::once(move || {
                        dispatch_signal(&rc2, FrameSignal::Failed(token));
                    });
                    let _ = c
                        .window
                        .set_timeout_with_callback_and_timeout_and_arguments_0(
                            cb.as_ref().unchecked_ref(),
                            0,
                        );
                    cb.forget();
                }
            }
            Effect::DestroyFrame => {
                if let Some(frame) = c.frame.take() {
                    frame.remove();
                }
            }
            Effect::StartLoadTimer { token, ms } => {
                if let Some(id) = c.load_timer.take() {
                    c.window.clear_timeout_with_handle(id);
                }
                let rc2 = rc.clone();
                let token = *token;
                let cb = Closure::once(move || {
                    dispatch_signal(&rc2, FrameSignal::TimedOut(token));
                });
                c.load_timer = c
                    .window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        cb.as_ref().unchecked_ref(),
                        *ms as i32,
                    )
                    .ok();
                cb.forget();
            }
            Effect::CancelLoadTimer => {
                if let Some(id) = c.load_timer.take() {
                    c.window.clear_timeout_with_handle(id);
                }
            }
            Effect::ScheduleTeardown { token, ms } => {
                // A teardown superseded by a fresh open still fires, but its
                // stale token no longer matches anything in the machine.
                let rc2 = rc.clone();
                let token = *token;
                let cb = Closure::once(move || {
                    dispatch_signal(&rc2, FrameSignal::TeardownElapsed(token));
                });
                let _ = c
                    .window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        cb.as_ref().unchecked_ref(),
                        *ms as i32,
                    );
                cb.forget();
            }
            Effect::ShowFailure { url } => {
                c.embed_el.set_inner_html(&failure_markup(url));
                set_display(&c.embed_el, "block");
                if let Ok(Some(btn)) = c.embed_el.query_selector(".embed-retry-btn") {
                    let rc2 = rc.clone();
                    let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
                        dispatch_input(&rc2, UserInput::RetryActivated);
                    }));
                    let _ = btn
                        .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref());
                    onclick.forget();
                }
            }
            Effect::ClearFailure => c.embed_el.set_inner_html(""),
            Effect::FocusCloseControl => {
                let close = c.close_el.clone();
                let cb = Closure::once(move || {
                    let _ = close.focus();
                });
                let _ = c
                    .window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        cb.as_ref().unchecked_ref(),
                        FOCUS_DELAY_MS,
                    );
                cb.forget();
            }
            Effect::RestoreFocus => {
                if let Some(el) = c.origin.take() {
                    let _ = el.focus();
                }
            }
        }
    }
}

fn create_frame(
    c: &mut ModalController,
    rc: &Shared,
    token: FrameToken,
    url: &str,
    title: &str,
    description: &str,
) -> Result<(), JsValue> {
    // The machine destroys the previous frame before asking for a new one;
    // drop any straggler anyway so two frames can never coexist.
    if let Some(old) = c.frame.take() {
        old.remove();
    }

    let iframe: HtmlIFrameElement = c.document.create_element("iframe")?.dyn_into()?;
    iframe.set_src(url);
    iframe.set_attribute("frameborder", "0")?;
    iframe.set_attribute("loading", "eager")?;
    iframe.set_attribute("allow", "fullscreen; accelerometer; gyroscope")?;
    // Capability boundary for third-party content: scripts, same-origin
    // storage, forms, and popups only; no parent navigation.
    iframe.set_attribute("sandbox", "allow-scripts allow-same-origin allow-forms allow-popups")?;
    iframe.set_attribute("title", &format!("{title} — interactive sketch"))?;
    iframe.set_attribute("aria-label", description)?;
    iframe.set_class_name("modal-iframe");

    {
        let rc2 = rc.clone();
        let onload = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            dispatch_signal(&rc2, FrameSignal::Loaded(token));
        }));
        iframe.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
        onload.forget();
    }
    {
        let rc2 = rc.clone();
        let onerror = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            dispatch_signal(&rc2, FrameSignal::Failed(token));
        }));
        iframe.add_event_listener_with_callback("error", onerror.as_ref().unchecked_ref())?;
        onerror.forget();
    }

    c.embed_el.append_child(&iframe)?;
    c.frame = Some(iframe);
    Ok(())
}

fn set_display(el: &HtmlElement, value: &str) {
    let _ = el.style().set_property("display", value);
}

fn failure_markup(url: &str) -> String {
    format!(
        r#"<div class="embed-error">
    <div class="embed-error-icon">&#9888;</div>
    <p class="embed-error-message">
        Unable to load this sketch. Check your connection or open it in a new tab.
    </p>
    <div class="embed-error-actions">
        <button class="embed-retry-btn" type="button">Try Again</button>
        <a href="{url}" target="_blank" rel="noopener noreferrer" class="embed-open-btn">
            Open in New Tab
        </a>
    </div>
</div>"#
    )
}
