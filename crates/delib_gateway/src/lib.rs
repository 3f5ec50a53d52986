//! delib_gateway — the Model Gateway contract (spec §6) and everything that
//! sits directly on top of raw model text before it becomes engine data:
//! response post-processing (spec §4.3, §9) and the ranking-JSON parser
//! cascade (spec §4.4, §9).
//!
//! The underlying language model itself is out of scope (spec §1); this
//! crate specifies only the gateway interface an implementation must honor,
//! plus one concrete implementation (`http`) for the NDJSON streaming
//! protocol spec §6 describes.

pub mod cancel;
pub mod gateway;
pub mod http;
pub mod parsing;
pub mod postprocess;

pub use cancel::CancelToken;
pub use gateway::{ChunkStream, CompletionRequest, GatewayError, ModelGateway};
pub use http::HttpModelGateway;
pub use parsing::{extract_ranking, ParseError};
pub use postprocess::{strip_reasoning_tags, PostProcessorChain};
