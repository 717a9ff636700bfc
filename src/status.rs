use crate::constants::STATUS_ELEMENT_ID;
use crate::core::LoadProgress;
use web_sys as web;

/// Show download progress in the page's status element, if it has one.
pub fn show_progress(document: &web::Document, progress: LoadProgress) {
    if let Some(el) = document.get_element_by_id(STATUS_ELEMENT_ID) {
        let text = match progress.fraction() {
            Some(f) => format!("Loading model… {:.0}%", f * 100.0),
            None => format!("Loading model… {} KB", progress.loaded / 1024),
        };
        el.set_text_content(Some(&text));
        _ = el.class_list().remove_1("hidden");
    }
}

/// Report a failure visibly, creating the status element when the page lacks one.
pub fn show_error(document: &web::Document, message: &str) {
    let el = match document.get_element_by_id(STATUS_ELEMENT_ID) {
        Some(el) => el,
        None => {
            let Ok(el) = document.create_element("div") else {
                return;
            };
            el.set_id(STATUS_ELEMENT_ID);
            _ = el.set_attribute(
                "style",
                "position:fixed;left:12px;bottom:12px;padding:8px 12px;border-radius:6px;\
                 background:rgba(40,10,10,0.85);color:#ffd9d9;font:13px system-ui;z-index:10",
            );
            if let Some(body) = document.body() {
                _ = body.append_child(&el);
            }
            el
        }
    };
    el.set_text_content(Some(&format!("Could not load the 3D model: {}", message)));
    let cl = el.class_list();
    _ = cl.remove_1("hidden");
    _ = cl.add_1("error");
}

#[inline]
pub fn hide(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(STATUS_ELEMENT_ID) {
        _ = el.class_list().add_1("hidden");
        // fallback for pages without a `.hidden` rule
        _ = el.set_attribute("style", "display:none");
    }
}
