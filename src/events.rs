use crate::core::{SceneContext, PARALLAX_LAYER};
use crate::dom;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

fn listen(target: &web::EventTarget, event: &str, handler: impl FnMut() + 'static) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        log::warn!("[scroll] could not listen for '{}': {:?}", event, e);
    }
    closure.forget();
}

/// Write the parallax layer's transform to the DOM if a tween changed it.
pub fn apply_parallax(ctx: &SceneContext, layer: Option<&web::HtmlElement>) {
    let Some(layer) = layer else {
        return;
    };
    let mut t = ctx.parallax.borrow_mut();
    if t.take_dirty() {
        dom::set_transform(layer, &t.css_transform());
    }
}

/// Re-measure every trigger against the current layout. The parallax layer's
/// own transform is lifted while measuring so it does not skew its range.
pub fn refresh_scroll(ctx: &Rc<RefCell<SceneContext>>) {
    let Some(window) = web::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let layer = dom::query_html(&document, PARALLAX_LAYER);
    if let Some(layer) = &layer {
        dom::set_transform(layer, "none");
    }
    let viewport = dom::viewport(&window);
    let mut ctx = ctx.borrow_mut();
    ctx.scroll.on_scroll(dom::scroll_y(&window));
    ctx.refresh_scroll(|selector| dom::element_box(&window, &document, selector), viewport.height);
    if let Some(layer) = &layer {
        dom::set_transform(layer, &ctx.parallax.borrow().css_transform());
    }
}

/// Feed window scroll offsets to the controller. Immediate bindings are
/// written here; smoothed ones catch up in the render loop.
pub fn wire_scroll(ctx: Rc<RefCell<SceneContext>>) {
    let Some(window) = web::window() else {
        return;
    };
    let w = window.clone();
    let ctx_scroll = ctx.clone();
    listen(&window, "scroll", move || {
        ctx_scroll.borrow_mut().scroll.on_scroll(dom::scroll_y(&w));
    });
    // late images and fonts move triggers around
    listen(&window, "load", move || refresh_scroll(&ctx));
}

/// Keep canvas, camera and trigger ranges in step with the window size.
pub fn wire_resize(ctx: Rc<RefCell<SceneContext>>, canvas: web::HtmlCanvasElement) {
    let Some(window) = web::window() else {
        return;
    };
    let w = window.clone();
    listen(&window, "resize", move || {
        let viewport = dom::viewport(&w);
        dom::size_canvas(&canvas, viewport);
        ctx.borrow_mut().resize(viewport);
        refresh_scroll(&ctx);
        log::debug!("[scene] resized to {}x{}", viewport.width, viewport.height);
    });
}
