use filter_engine::http::{endpoint_url, Transport};
use filter_engine::FetchError;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use market_common::query::CanonicalQuery;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// `window.fetch` against the marketplace API.
pub struct FetchTransport {
    api_base: String,
}

impl FetchTransport {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }
}

impl Transport for FetchTransport {
    fn get(&self, path: &str, query: &CanonicalQuery) -> LocalBoxFuture<'static, Result<String, FetchError>> {
        let url = endpoint_url(&self.api_base, path, query);
        let path = path.to_string();
        async move { fetch_text(&url, &path).await }.boxed_local()
    }
}

fn transport_error(e: JsValue) -> FetchError {
    FetchError::Transport(format!("{:?}", e))
}

async fn fetch_text(url: &str, path: &str) -> Result<String, FetchError> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::SameOrigin);

    let request = Request::new_with_str_and_init(url, &opts).map_err(transport_error)?;
    request
        .headers()
        .set("Accept", "application/json")
        .map_err(transport_error)?;

    let window = web_sys::window().ok_or_else(|| FetchError::Transport("no window".into()))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport_error)?;
    let resp: Response = resp_value.dyn_into().map_err(transport_error)?;

    if !resp.ok() {
        return Err(FetchError::Status {
            status: resp.status(),
            path: path.to_string(),
        });
    }

    let text = JsFuture::from(resp.text().map_err(transport_error)?)
        .await
        .map_err(transport_error)?;
    text.as_string().ok_or_else(|| FetchError::Decode {
        path: path.to_string(),
        message: "response body is not text".into(),
    })
}
