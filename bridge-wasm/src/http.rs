//! `fetch`-backed [`HttpClient`].
//!
//! Requests go out in CORS mode. A per-request timeout races the fetch
//! against a timer and aborts it through an `AbortController` when the timer
//! wins.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpRequest, HttpResponse},
};
use bytes::Bytes;
use futures::future::{self, Either};
use gloo_timers::future::TimeoutFuture;
use js_sys::{Array, Uint8Array};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, AbortSignal, Headers, Request, RequestInit, RequestMode, Response, Window};

use crate::error::{js_error, js_message, WasmError};

/// Sends requests through `window.fetch`.
pub struct WasmHttpClient {
    window: Window,
}

impl WasmHttpClient {
    /// Fails outside a window context, e.g. in a worker.
    pub fn new() -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| WasmError::NotAvailable("window".to_string()))?;
        Ok(Self { window })
    }
}

#[async_trait(?Send)]
impl HttpClient for WasmHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = request.method.as_str(), url = %request.url, "fetch");

        let abort = match request.timeout {
            Some(timeout) => Some((
                AbortController::new().map_err(|e| js_error("AbortController", e))?,
                timeout,
            )),
            None => None,
        };
        let signal = abort.as_ref().map(|(controller, _)| controller.signal());
        let js_request = to_js_request(&request, signal.as_ref())?;

        let pending = JsFuture::from(self.window.fetch_with_request(&js_request));
        let settled = match abort {
            None => pending.await,
            Some((controller, timeout)) => {
                let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
                match future::select(pending, TimeoutFuture::new(millis)).await {
                    Either::Left((settled, _)) => settled,
                    Either::Right((_, pending)) => {
                        controller.abort();
                        // Let the fetch settle with its AbortError before returning.
                        pending.await.ok();
                        return Err(timed_out(timeout));
                    }
                }
            }
        };

        // fetch only rejects when no response arrived ("Failed to fetch").
        let response: Response = settled
            .map_err(|e| BridgeError::Transport(js_message(&e)))?
            .dyn_into()
            .map_err(|_| BridgeError::OperationFailed("fetch resolved to a non-Response".into()))?;

        let headers = response_headers(&response.headers())?;
        let body = response_body(&response).await?;
        debug!(status = response.status(), bytes = body.len(), "fetch settled");

        Ok(HttpResponse {
            status: response.status(),
            headers,
            body,
        })
    }
}

fn to_js_request(request: &HttpRequest, signal: Option<&AbortSignal>) -> Result<Request> {
    let headers = Headers::new().map_err(|e| js_error("Headers", e))?;
    for (name, value) in &request.headers {
        headers
            .append(name, value)
            .map_err(|e| js_error(&format!("header {}", name), e))?;
    }

    let init = RequestInit::new();
    init.set_method(request.method.as_str());
    init.set_mode(RequestMode::Cors);
    init.set_headers(&headers);
    init.set_signal(signal);
    if let Some(body) = &request.body {
        init.set_body(&Uint8Array::from(body.as_ref()).into());
    }

    Request::new_with_str_and_init(&request.url, &init).map_err(|e| js_error("Request", e))
}

async fn response_body(response: &Response) -> Result<Bytes> {
    let buffer = response
        .array_buffer()
        .map_err(|e| js_error("arrayBuffer", e))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|e| BridgeError::Transport(js_message(&e)))?;
    Ok(Bytes::from(Uint8Array::new(&buffer).to_vec()))
}

fn response_headers(headers: &Headers) -> Result<HashMap<String, String>> {
    let entries = js_sys::try_iter(headers.as_ref())
        .map_err(|e| js_error("Headers.entries", e))?
        .ok_or_else(|| BridgeError::OperationFailed("Headers are not iterable".into()))?;

    let mut map = HashMap::new();
    for entry in entries {
        let pair: Array = entry.map_err(|e| js_error("Headers.entries", e))?.into();
        if let (Some(name), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
            map.insert(name, value);
        }
    }
    Ok(map)
}

fn timed_out(timeout: Duration) -> BridgeError {
    BridgeError::Transport(format!("Request timed out after {} ms", timeout.as_millis()))
}
