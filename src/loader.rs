use crate::core::{LoadError, LoadProgress};
use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn network(url: &str, err: impl std::fmt::Debug) -> LoadError {
    LoadError::Network {
        url: url.to_string(),
        reason: format!("{:?}", err),
    }
}

/// Fetch `url` as bytes, streaming the body so `on_progress` sees every chunk.
pub async fn fetch_bytes(
    url: &str,
    mut on_progress: impl FnMut(LoadProgress),
) -> Result<Vec<u8>, LoadError> {
    let window = web::window().ok_or_else(|| network(url, "no window"))?;
    let resp: web::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| network(url, e))?
        .dyn_into()
        .map_err(|e| network(url, e))?;
    if !resp.ok() {
        return Err(LoadError::Http {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    let total = resp
        .headers()
        .get("content-length")
        .ok()
        .flatten()
        .and_then(|v| v.parse::<u64>().ok());
    let mut progress = LoadProgress { loaded: 0, total };
    on_progress(progress);

    let Some(body) = resp.body() else {
        // no readable stream: take the whole body at once
        let promise = resp.array_buffer().map_err(|e| network(url, e))?;
        let buf = JsFuture::from(promise).await.map_err(|e| network(url, e))?;
        let bytes = Uint8Array::new(&buf).to_vec();
        progress.loaded = bytes.len() as u64;
        on_progress(progress);
        return Ok(bytes);
    };

    let reader: web::ReadableStreamDefaultReader =
        body.get_reader().dyn_into().map_err(|e| network(url, e))?;
    let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
    loop {
        let chunk = JsFuture::from(reader.read())
            .await
            .map_err(|e| network(url, e))?;
        let done = Reflect::get(&chunk, &JsValue::from_str("done"))
            .map_err(|e| network(url, e))?
            .as_bool()
            .unwrap_or(true);
        if done {
            break;
        }
        let value: Uint8Array = Reflect::get(&chunk, &JsValue::from_str("value"))
            .map_err(|e| network(url, e))?
            .dyn_into()
            .map_err(|e| network(url, e))?;
        bytes.extend_from_slice(&value.to_vec());
        progress.loaded = bytes.len() as u64;
        on_progress(progress);
    }
    log::info!("[loader] fetched {} ({} bytes)", url, bytes.len());
    Ok(bytes)
}
