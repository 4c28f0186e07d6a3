use std::num::ParseIntError;
use thiserror::Error;

/// Errors that can occur when decoding VMAP or VAST XML
#[derive(Error, Debug)]
pub enum VmapError {
    #[error("Failed to parse XML: {0}")]
    XmlParseError(#[from] quick_xml::Error),

    #[error("No {0} element found in document")]
    RootNotFound(&'static str),

    #[error("Unexpected end of input inside <{0}>")]
    UnexpectedEof(&'static str),

    #[error("Invalid {attribute} attribute on <{element}>: {value:?}")]
    InvalidNumber {
        attribute: &'static str,
        element: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Invalid duration format: {0:?}")]
    InvalidDuration(String),

    #[error("Invalid time offset: {value:?}")]
    InvalidTimeOffset {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

pub type Result<T> = std::result::Result<T, VmapError>;
