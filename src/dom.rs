use crate::core::{ElementBox, Viewport};
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn viewport(window: &web::Window) -> Viewport {
    let dim = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(1.0) as f32
    };
    Viewport {
        width: dim(window.inner_width()),
        height: dim(window.inner_height()),
    }
}

#[inline]
pub fn scroll_y(window: &web::Window) -> f32 {
    window.scroll_y().unwrap_or(0.0) as f32
}

/// Create the render canvas and make it the first child of `<body>`.
pub fn insert_canvas(
    document: &web::Document,
    viewport: Viewport,
) -> anyhow::Result<web::HtmlCanvasElement> {
    let body = document
        .body()
        .ok_or_else(|| anyhow::anyhow!("document has no body"))?;
    let canvas: web::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    body.insert_before(&canvas, body.first_child().as_ref())
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    size_canvas(&canvas, viewport);
    Ok(canvas)
}

/// Size the canvas to the viewport in CSS pixels, backing store scaled by devicePixelRatio.
pub fn size_canvas(canvas: &web::HtmlCanvasElement, viewport: Viewport) {
    let dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0) as f32;
    canvas.set_width(((viewport.width * dpr) as u32).max(1));
    canvas.set_height(((viewport.height * dpr) as u32).max(1));
    let style = canvas.style();
    _ = style.set_property("width", &format!("{}px", viewport.width));
    _ = style.set_property("height", &format!("{}px", viewport.height));
}

pub fn query_html(document: &web::Document, selector: &str) -> Option<web::HtmlElement> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
}

/// Document-space box of the first element matching `selector`.
pub fn element_box(window: &web::Window, document: &web::Document, selector: &str) -> Option<ElementBox> {
    let el = document.query_selector(selector).ok().flatten()?;
    let rect = el.get_bounding_client_rect();
    Some(ElementBox {
        top: rect.top() as f32 + scroll_y(window),
        height: rect.height() as f32,
    })
}

#[inline]
pub fn set_transform(el: &web::HtmlElement, css: &str) {
    _ = el.style().set_property("transform", css);
}
