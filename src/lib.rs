#![cfg(target_arch = "wasm32")]
use crate::core::{ModelAsset, SceneConfig, SceneContext, PARALLAX_LAYER};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod constants;
mod core;
mod dom;
mod events;
mod frame;
mod loader;
mod render;
mod status;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("scroll-scene starting");

    static STARTED: AtomicBool = AtomicBool::new(false);
    if STARTED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let config = SceneConfig::default();
    let viewport = dom::viewport(&window);
    let canvas = dom::insert_canvas(&document, viewport)?;
    let mut gpu = match frame::init_gpu(&canvas).await {
        Ok(g) => g,
        Err(e) => {
            status::show_error(&document, "WebGPU is not available in this browser");
            return Err(e);
        }
    };

    let ctx = Rc::new(RefCell::new(SceneContext::bootstrap(config.clone(), viewport)));

    let doc_progress = document.clone();
    let loaded = loader::fetch_bytes(&config.model_url, move |p| {
        status::show_progress(&doc_progress, p)
    })
    .await
    .and_then(|bytes| ModelAsset::from_glb(&bytes));

    {
        let mut c = ctx.borrow_mut();
        if let Err(e) = c.attach_model(loaded) {
            status::show_error(&document, &e.to_string());
            return Ok(());
        }
        if let Some(model) = c.scene.model() {
            gpu.upload_model(&model.asset);
        }
    }
    status::hide(&document);

    events::wire_scroll(ctx.clone());
    events::refresh_scroll(&ctx);
    if config.handle_resize {
        events::wire_resize(ctx.clone(), canvas.clone());
    }

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        ctx,
        gpu,
        canvas,
        layer: dom::query_html(&document, PARALLAX_LAYER),
        last_instant: Instant::now(),
    }));
    frame::start_loop(frame_ctx);
    log::info!("[scene] render loop started");
    Ok(())
}
