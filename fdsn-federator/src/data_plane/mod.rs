//! Data-plane layer.
//!
//! Owns the upstream fetch seam, block re-chunking, per-endpoint accounting and
//! the streaming multiplexer that relays a resolved endpoint list as one body.
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use futures::{stream, StreamExt};
//! use fdsn_federator::data_plane::multiplexer::{MultiplexerConfig, StreamingMultiplexer};
//! use fdsn_federator::data_plane::upstream::{FetchError, UpstreamFetcher, UpstreamResponse};
//! use fdsn_federator::routing::request_merge::Endpoint;
//!
//! # struct EchoFetcher;
//! #
//! # #[async_trait]
//! # impl UpstreamFetcher for EchoFetcher {
//! #     async fn open(&self, url: &str) -> Result<UpstreamResponse, FetchError> {
//! #         let body = stream::iter(vec![Ok(Bytes::from(url.to_string()))]).boxed();
//! #         Ok(UpstreamResponse::new(200, body))
//! #     }
//! # }
//! #
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let multiplexer = StreamingMultiplexer::new(Arc::new(EchoFetcher), MultiplexerConfig::default());
//! let body = multiplexer.stream(vec![
//!     Endpoint::new("http://a/", "A * * * * *"),
//!     Endpoint::new("http://b/", "B * * * * *"),
//! ]);
//!
//! let relayed: Vec<Bytes> = body.collect().await;
//! assert_eq!(relayed.concat(), b"http://a/http://b/");
//! # });
//! ```

pub mod accounting;
pub mod block_buffer;
pub mod multiplexer;
pub mod upstream;
