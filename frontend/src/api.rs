use async_trait::async_trait;
use futures_util::stream::{self, Stream, StreamExt};
use gloo_net::http::Request;
use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::ReadableStreamDefaultReader;

use portfolio_chat::{accept_response, ByteStream, ChatConfig, ChatError, ChatRequest, ChatTransport};

/// Streams chat replies through the browser's `fetch`.
///
/// The endpoint takes a POST body, so `EventSource` is out; the response
/// body is read chunk by chunk through a `ReadableStreamDefaultReader`.
#[derive(Clone)]
pub struct FetchTransport {
    endpoint: String,
}

impl FetchTransport {
    pub fn new(config: &ChatConfig) -> Self {
        Self { endpoint: config.chat_endpoint() }
    }
}

#[async_trait(?Send)]
impl ChatTransport for FetchTransport {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream, ChatError> {
        let body = serde_json::to_string(request)?;

        let resp = Request::post(&self.endpoint)
            .header("Content-Type", "application/json")
            .body(body)
            .map_err(|e| ChatError::network(format!("Request error: {e}")))?
            .send()
            .await
            .map_err(|e| ChatError::network(e.to_string()))?;

        let reader = accept_response(resp.status(), resp.body())?
            .get_reader()
            .dyn_into::<ReadableStreamDefaultReader>()
            .map_err(|_| ChatError::network("Failed to get body reader"))?;

        Ok(read_chunks(reader).boxed_local())
    }
}

fn read_chunks(reader: ReadableStreamDefaultReader) -> impl Stream<Item = Result<Vec<u8>, ChatError>> {
    stream::unfold(Some(reader), |reader| async move {
        let reader = reader?;
        match read_chunk(&reader).await {
            Ok(Some(chunk)) => Some((Ok(chunk), Some(reader))),
            Ok(None) => None,
            Err(e) => Some((Err(e), None)),
        }
    })
}

/// One `reader.read()`; `None` once the body is done.
async fn read_chunk(reader: &ReadableStreamDefaultReader) -> Result<Option<Vec<u8>>, ChatError> {
    let result = JsFuture::from(reader.read()).await.map_err(js_error)?;

    let done = Reflect::get(&result, &JsValue::from_str("done"))
        .map_err(js_error)?
        .as_bool()
        .unwrap_or(false);
    if done {
        return Ok(None);
    }

    let value = Reflect::get(&result, &JsValue::from_str("value")).map_err(js_error)?;
    if value.is_undefined() {
        return Ok(Some(Vec::new()));
    }
    let chunk: Uint8Array =
        value.dyn_into().map_err(|_| ChatError::network("Body chunk is not a Uint8Array"))?;
    Ok(Some(chunk.to_vec()))
}

fn js_error(err: JsValue) -> ChatError {
    ChatError::network(format!("{err:?}"))
}
