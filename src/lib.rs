//! Streaming decoders for VMAP and VAST ad documents.
//!
//! ```
//! let vast = vmap_parser::parse_vast(r#"<VAST version="3.0"><Ad id="1"/></VAST>"#).unwrap();
//! assert_eq!(vast.ads[0].id, "1");
//! ```

pub mod config;
pub mod duration;
pub mod entities;
pub mod error;
pub mod models;
pub mod offset;
pub mod parser;
pub mod pool;
pub mod tokenizer;

pub use config::DecoderConfig;
pub use error::{Result, VmapError};
pub use models::*;
pub use parser::{decode_vast, decode_vmap, parse_vast, parse_vmap, Decoder};

pub mod async_api {
    use crate::error::Result;
    use crate::models::{Vast, Vmap};

    pub async fn decode_vast(input: &[u8]) -> Result<Vast> {
        // Decoding is CPU-bound, so we can just wrap the sync version
        crate::parser::decode_vast(input)
    }

    pub async fn decode_vmap(input: &[u8]) -> Result<Vmap> {
        crate::parser::decode_vmap(input)
    }

    pub async fn parse_vast(xml: &str) -> Result<Vast> {
        crate::parser::parse_vast(xml)
    }

    pub async fn parse_vmap(xml: &str) -> Result<Vmap> {
        crate::parser::parse_vmap(xml)
    }
}
