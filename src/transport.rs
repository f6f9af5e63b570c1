use async_trait::async_trait;
use futures_util::stream::LocalBoxStream;

use crate::errors::ChatError;
use crate::models::ChatRequest;

/// Response body as it arrives: raw chunks, or the error that cut it short.
pub type ByteStream = LocalBoxStream<'static, Result<Vec<u8>, ChatError>>;

/// Opens one streaming exchange with the chat API.
///
/// Implementations must turn a failed connection, a non-2xx status and a
/// response without a body into `Err`. Everything after that is delivered
/// through the returned stream.
#[async_trait(?Send)]
pub trait ChatTransport {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream, ChatError>;
}

/// Status and body checks shared by every transport: a non-2xx status wins
/// over a missing body, and only a 2xx response with a body is streamed.
pub fn accept_response<B>(status: u16, body: Option<B>) -> Result<B, ChatError> {
    if !(200..300).contains(&status) {
        return Err(ChatError::HttpStatus { status });
    }
    body.ok_or(ChatError::MissingBody)
}

#[cfg(not(target_arch = "wasm32"))]
pub use self::http::HttpTransport;

#[cfg(not(target_arch = "wasm32"))]
mod http {
    use futures_util::StreamExt;
    use tracing::debug;

    use super::*;
    use crate::config::ChatConfig;

    /// `reqwest`-backed transport for native clients.
    #[derive(Clone)]
    pub struct HttpTransport {
        client: reqwest::Client,
        endpoint: String,
    }

    impl HttpTransport {
        pub fn new(config: &ChatConfig) -> Self {
            Self { client: reqwest::Client::new(), endpoint: config.chat_endpoint() }
        }
    }

    #[async_trait(?Send)]
    impl ChatTransport for HttpTransport {
        async fn open(&self, request: &ChatRequest) -> Result<ByteStream, ChatError> {
            debug!("POST {} (session {})", self.endpoint, request.session_id);
            let resp = self.client.post(&self.endpoint).json(request).send().await?;
            let resp = accept_response(resp.status().as_u16(), Some(resp))?;

            let body = resp
                .bytes_stream()
                .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ChatError::from));
            Ok(body.boxed_local())
        }
    }
}
