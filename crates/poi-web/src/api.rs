//! Fetch-based REST client. Calls are one-shot: no retry, no timeout, no
//! cancellation; failures are reported to the caller, which decides what the
//! user sees.

use crate::dom::js_err;
use anyhow::anyhow;
use poi_core::links::{self, LinkSnapshot};
use poi_core::{CreatePoiResponse, ErrorResponse, PoiRecord, SceneSummary};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

async fn fetch(url: &str, init: &web::RequestInit) -> anyhow::Result<web::Response> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let resp = JsFuture::from(window.fetch_with_str_and_init(url, init))
        .await
        .map_err(js_err)?;
    resp.dyn_into::<web::Response>()
        .map_err(|e| anyhow!("fetch returned a non-Response: {e:?}"))
}

async fn response_text(resp: &web::Response) -> anyhow::Result<String> {
    let text = JsFuture::from(resp.text().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    text.as_string()
        .ok_or_else(|| anyhow!("response body is not text"))
}

/// Message for a non-2xx response: the backend's `detail` field when the
/// body parses, the HTTP status otherwise.
async fn error_detail(resp: &web::Response) -> String {
    let status = resp.status();
    match response_text(resp).await {
        Ok(body) => serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.detail)
            .unwrap_or_else(|| format!("request failed with status {status}")),
        Err(_) => format!("request failed with status {status}"),
    }
}

async fn get_json(url: &str) -> anyhow::Result<String> {
    let init = web::RequestInit::new();
    init.set_method("GET");
    let resp = fetch(url, &init).await?;
    if !resp.ok() {
        return Err(anyhow!(error_detail(&resp).await));
    }
    response_text(&resp).await
}

/// `GET /space/scenes/{space_id}`: link-target candidates.
pub async fn fetch_scenes(space_id: &str) -> anyhow::Result<Vec<SceneSummary>> {
    let body = get_json(&links::scenes_url(space_id)).await?;
    let parsed: poi_core::SceneListResponse = serde_json::from_str(&body)?;
    Ok(parsed.scenes)
}

/// `GET /space/pois/{scene_id}`: all POI records of the current scene.
pub async fn fetch_pois(scene_id: &str) -> anyhow::Result<Vec<PoiRecord>> {
    let body = get_json(&links::pois_url(scene_id)).await?;
    let parsed: poi_core::PoiListResponse = serde_json::from_str(&body)?;
    Ok(parsed.pois)
}

/// `POST /space/poi/create/{scene_id}` with an already-assembled multipart
/// form. The browser sets the multipart content type and boundary itself.
pub async fn create_poi(
    scene_id: &str,
    form: &web::FormData,
) -> anyhow::Result<CreatePoiResponse> {
    let init = web::RequestInit::new();
    init.set_method("POST");
    init.set_body(form.as_ref());
    let resp = fetch(&links::poi_create_url(scene_id), &init).await?;
    if !resp.ok() {
        return Err(anyhow!(error_detail(&resp).await));
    }
    let body = response_text(&resp).await?;
    Ok(serde_json::from_str(&body)?)
}

/// `DELETE /space/poi/delete/{scene_id}/{poi_id}`.
pub async fn delete_poi(scene_id: &str, poi_id: &str) -> anyhow::Result<()> {
    let init = web::RequestInit::new();
    init.set_method("DELETE");
    let resp = fetch(&links::poi_delete_url(scene_id, poi_id), &init).await?;
    if !resp.ok() {
        return Err(anyhow!(error_detail(&resp).await));
    }
    Ok(())
}

/// `PUT /space/scene/link/update/{space_id}` with the anchor snapshot.
pub async fn put_link_snapshot(space_id: &str, snapshot: &LinkSnapshot) -> anyhow::Result<()> {
    let body = snapshot.to_json()?;
    let headers = web::Headers::new().map_err(js_err)?;
    headers
        .set("Content-Type", "application/json; charset=utf-8")
        .map_err(js_err)?;
    let init = web::RequestInit::new();
    init.set_method("PUT");
    init.set_headers(headers.as_ref());
    init.set_body(&wasm_bindgen::JsValue::from_str(&body));
    let resp = fetch(&links::link_update_url(space_id), &init).await?;
    if !resp.ok() {
        return Err(anyhow!(error_detail(&resp).await));
    }
    Ok(())
}
