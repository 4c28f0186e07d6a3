//! XML entity decoding
//!
//! Resolves the five predefined entities (`&amp;` `&lt;` `&gt;` `&apos;` `&quot;`)
//! and numeric character references (`&#123;` `&#x7B;`) inside text and
//! attribute payloads.
//!
//! Decoding happens **in place**: [`unescape_in_place`] takes exclusive write
//! access to the slice it is given and compacts the decoded text towards the
//! front of it. Bytes past the returned length are garbage afterwards, so
//! callers must not keep or reuse the tail of the slice. A reference is never
//! shorter than the UTF-8 it decodes to, which is what keeps the write cursor
//! behind the read cursor.

use memchr::memchr;

/// Longest reference body (the bytes between `&` and `;`) that is resolved.
/// Leaves room for zero-padded character references like `&#x0001F600;`.
const MAX_REF_LEN: usize = 32;

/// Decode all references in `buf` and return the decoded length.
///
/// Unknown named entities and malformed numeric references decode to U+0000
/// instead of failing the document. An `&` that is not closed by a `;` within
/// [`MAX_REF_LEN`] bytes is copied through unchanged.
pub fn unescape_in_place(buf: &mut [u8]) -> usize {
    // Nothing to do without an ampersand
    let Some(first) = memchr(b'&', buf) else {
        return buf.len();
    };

    let mut read = first;
    let mut write = first;
    let mut scratch = [0u8; 4];

    while read < buf.len() {
        let b = buf[read];
        if b != b'&' {
            buf[write] = b;
            write += 1;
            read += 1;
            continue;
        }

        let body_start = read + 1;
        match reference_len(&buf[body_start..]) {
            Some(len) => {
                let ch = resolve_reference(&buf[body_start..body_start + len]);
                let encoded = ch.encode_utf8(&mut scratch).as_bytes();
                buf[write..write + encoded.len()].copy_from_slice(encoded);
                write += encoded.len();
                read = body_start + len + 1;
            }
            None => {
                buf[write] = b'&';
                write += 1;
                read += 1;
            }
        }
    }

    write
}

/// Decode all references in `buf`, truncating it to the decoded length.
pub fn unescape_vec(buf: &mut Vec<u8>) {
    let len = unescape_in_place(buf);
    buf.truncate(len);
}

/// Length of the reference body at the front of `rest`, if a `;` closes it
/// within [`MAX_REF_LEN`] bytes without whitespace or markup in between.
fn reference_len(rest: &[u8]) -> Option<usize> {
    let window = &rest[..rest.len().min(MAX_REF_LEN + 1)];
    let len = memchr(b';', window)?;
    window[..len]
        .iter()
        .all(|&b| !matches!(b, b'&' | b'<' | b' ' | b'\t' | b'\r' | b'\n'))
        .then_some(len)
}

/// Resolve the body of a single reference, e.g. `amp`, `#38` or `#x26`.
fn resolve_reference(body: &[u8]) -> char {
    match body {
        b"amp" => '&',
        b"lt" => '<',
        b"gt" => '>',
        b"apos" => '\'',
        b"quot" => '"',
        [b'#', b'x' | b'X', hex @ ..] => parse_code_point(hex, 16),
        [b'#', dec @ ..] => parse_code_point(dec, 10),
        _ => '\0',
    }
}

fn parse_code_point(digits: &[u8], radix: u32) -> char {
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| u32::from_str_radix(s, radix).ok())
        .and_then(char::from_u32)
        .unwrap_or('\0')
}
