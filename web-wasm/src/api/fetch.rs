//! fetch APIによるHTTP通信

use narrato_common::{RawResponse, Transport, TransportError};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

#[derive(Clone, Copy, Default)]
pub struct FetchTransport;

fn js_error(value: JsValue) -> TransportError {
    TransportError(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}

impl FetchTransport {
    async fn send(&self, url: &str, body: String) -> Result<RawResponse, JsValue> {
        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&JsValue::from_str(&body));

        let request = Request::new_with_str_and_init(url, &opts)?;
        request.headers().set("Content-Type", "application/json")?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
        let resp: Response = resp_value.dyn_into()?;

        let status = resp.status();
        let content_type = resp.headers().get("content-type")?;
        let body = JsFuture::from(resp.text()?)
            .await?
            .as_string()
            .unwrap_or_default();

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

impl Transport for FetchTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<RawResponse, TransportError> {
        self.send(url, body).await.map_err(js_error)
    }
}
