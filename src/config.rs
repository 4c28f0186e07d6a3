use crate::pool::DEFAULT_POOL_CAPACITY;
use crate::tokenizer::DEFAULT_ATTR_CAPACITY;

/// Tuning knobs for a [`Decoder`](crate::parser::Decoder)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Idle scratch tokens kept for reuse; zero disables pooling
    pub pool_capacity: usize,

    /// Attribute slots preallocated per token
    pub attr_capacity: usize,
}

impl DecoderConfig {
    /// A configuration where every scratch token is freshly allocated
    pub fn without_pooling() -> Self {
        DecoderConfig {
            pool_capacity: 0,
            ..DecoderConfig::default()
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            attr_capacity: DEFAULT_ATTR_CAPACITY,
        }
    }
}
