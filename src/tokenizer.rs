//! Pull-style XML tokens for the element decoders.
//!
//! [`XmlTokenizer`] sits on top of `quick-xml` and hands out one short-lived
//! [`Token`] per start tag, self-closing tag or end tag. Character data that
//! directly follows a start tag is attached to that start token, so leaf
//! elements like `<AdTitle>` can be read from a single token.

use crate::entities::unescape_in_place;
use crate::error::Result;
use memchr::memchr;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Reader;

/// Attribute slots preallocated per token; VAST elements rarely carry more.
pub const DEFAULT_ATTR_CAPACITY: usize = 5;

/// A qualified name split at the namespace prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name {
    /// The prefix before `:`, empty if there is none
    pub prefix: Vec<u8>,

    /// The local part of the name
    pub local: Vec<u8>,
}

impl Name {
    fn assign(&mut self, qualified: &[u8]) {
        self.prefix.clear();
        self.local.clear();
        match memchr(b':', qualified) {
            Some(i) => {
                self.prefix.extend_from_slice(&qualified[..i]);
                self.local.extend_from_slice(&qualified[i + 1..]);
            }
            None => self.local.extend_from_slice(qualified),
        }
    }

    fn copy_from(&mut self, other: &Name) {
        assign_bytes(&mut self.prefix, &other.prefix);
        assign_bytes(&mut self.local, &other.local);
    }
}

/// A single attribute with its raw (still escaped) value
#[derive(Debug, Clone, Default)]
pub struct Attr {
    pub name: Name,
    pub value: Vec<u8>,
}

/// Identity of an element within one token stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementId(u64);

/// A start, self-closing or end tag together with its payload.
///
/// Buffers are kept between uses, so a token that is refilled or copied into
/// does not allocate once it has grown to fit the document.
#[derive(Debug, Default)]
pub struct Token {
    pub name: Name,
    attrs: Vec<Attr>,
    attr_len: usize,

    /// Character data following a start tag. Raw text unless `was_cdata` is set,
    /// in which case it is literal and already unescaped.
    pub data: Vec<u8>,

    pub self_closing: bool,
    pub is_end: bool,

    /// `data` contains CDATA sections and must be taken verbatim
    pub was_cdata: bool,

    element: ElementId,
}

impl Token {
    pub fn with_attr_capacity(capacity: usize) -> Self {
        Token {
            attrs: vec![Attr::default(); capacity],
            ..Token::default()
        }
    }

    pub fn local_name(&self) -> &[u8] {
        &self.name.local
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs[..self.attr_len]
    }

    pub fn attrs_mut(&mut self) -> &mut [Attr] {
        &mut self.attrs[..self.attr_len]
    }

    /// The element this start token opens, `None` for self-closing and end tokens.
    pub fn open_element(&self) -> Option<ElementId> {
        (!self.is_end && !self.self_closing).then_some(self.element)
    }

    /// Whether this is the end tag of the element identified by `id`.
    pub fn closes(&self, id: ElementId) -> bool {
        self.is_end && self.element == id
    }

    /// Whether this is the end tag closing the element `start` was opened by.
    ///
    /// Elements are matched by identity rather than by name, so siblings or
    /// nested elements sharing a local name are never confused.
    pub fn is_end_element_of(&self, start: &Token) -> bool {
        self.closes(start.element)
    }

    /// Make this token a copy of `other`, reusing the existing buffers.
    pub fn copy_from(&mut self, other: &Token) {
        self.name.copy_from(&other.name);
        self.attr_len = 0;
        for attr in other.attrs() {
            let slot = self.push_attr();
            slot.name.copy_from(&attr.name);
            slot.value.extend_from_slice(&attr.value);
        }
        assign_bytes(&mut self.data, &other.data);
        self.self_closing = other.self_closing;
        self.is_end = other.is_end;
        self.was_cdata = other.was_cdata;
        self.element = other.element;
    }

    /// Clear the token without releasing its buffers.
    pub fn reset(&mut self) {
        self.name.prefix.clear();
        self.name.local.clear();
        self.attr_len = 0;
        self.data.clear();
        self.self_closing = false;
        self.is_end = false;
        self.was_cdata = false;
        self.element = ElementId::default();
    }

    /// Append an empty attribute slot, reusing a previously used one if possible.
    fn push_attr(&mut self) -> &mut Attr {
        if self.attr_len == self.attrs.len() {
            self.attrs.push(Attr::default());
        }
        let slot = &mut self.attrs[self.attr_len];
        self.attr_len += 1;
        slot.name.prefix.clear();
        slot.name.local.clear();
        slot.value.clear();
        slot
    }
}

fn assign_bytes(dst: &mut Vec<u8>, src: &[u8]) {
    dst.clear();
    dst.extend_from_slice(src);
}

/// A source of XML tokens
pub trait TokenSource {
    /// Advance to the next token, or `None` at the end of input.
    ///
    /// The returned token is only valid until the next call; copy it if it
    /// has to outlive that.
    fn next_token(&mut self) -> Result<Option<&mut Token>>;
}

/// [`TokenSource`] over an in-memory XML document
pub struct XmlTokenizer<'a> {
    reader: Reader<&'a [u8]>,
    token: Token,

    /// Event read ahead while collecting character data
    pending: Option<Event<'a>>,

    /// Identities of the currently open elements, innermost last
    open: Vec<ElementId>,
    last_element: u64,

    /// Whitespace-only text seen after CDATA, kept until more content follows
    gap: Vec<u8>,
}

impl<'a> XmlTokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_attr_capacity(input, DEFAULT_ATTR_CAPACITY)
    }

    pub fn with_attr_capacity(input: &'a [u8], attr_capacity: usize) -> Self {
        XmlTokenizer {
            reader: Reader::from_reader(input),
            token: Token::with_attr_capacity(attr_capacity),
            pending: None,
            open: Vec::new(),
            last_element: 0,
            gap: Vec::new(),
        }
    }

    fn next_event(&mut self) -> Result<Event<'a>> {
        if let Some(event) = self.pending.take() {
            return Ok(event);
        }
        Ok(self.reader.read_event()?)
    }

    fn fill_start(&mut self, start: &BytesStart<'a>, self_closing: bool) -> Result<()> {
        let token = &mut self.token;
        token.reset();
        token.name.assign(start.name().as_ref());
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::InvalidAttr)?;
            let slot = token.push_attr();
            slot.name.assign(attr.key.as_ref());
            slot.value.extend_from_slice(&attr.value);
        }
        token.self_closing = self_closing;

        self.last_element += 1;
        token.element = ElementId(self.last_element);
        if !self_closing {
            self.open.push(token.element);
        }
        Ok(())
    }

    fn fill_end(&mut self, end: &BytesEnd<'a>) {
        let token = &mut self.token;
        token.reset();
        token.name.assign(end.name().as_ref());
        token.is_end = true;
        token.element = self.open.pop().unwrap_or_default();
    }

    /// Attach the character data following a start tag to the current token.
    ///
    /// Plain text stays raw until a CDATA section shows up. From then on the
    /// payload is literal: text segments are unescaped as they are appended,
    /// and whitespace-only text around the CDATA is dropped. Segments keep
    /// their document order.
    fn collect_char_data(&mut self) -> Result<()> {
        self.gap.clear();
        loop {
            match self.next_event()? {
                Event::Text(text) => {
                    let token = &mut self.token;
                    if !token.was_cdata {
                        token.data.extend_from_slice(&text);
                    } else if is_blank(&text) {
                        self.gap.extend_from_slice(&text);
                    } else {
                        token.data.append(&mut self.gap);
                        append_unescaped(&mut token.data, &text);
                    }
                }
                Event::CData(cdata) => {
                    let token = &mut self.token;
                    if !token.was_cdata {
                        token.was_cdata = true;
                        if is_blank(&token.data) {
                            token.data.clear();
                        } else {
                            let len = unescape_in_place(&mut token.data);
                            token.data.truncate(len);
                        }
                    } else if !token.data.is_empty() {
                        token.data.append(&mut self.gap);
                    }
                    self.gap.clear();
                    token.data.extend_from_slice(&cdata);
                }
                Event::Comment(_) | Event::PI(_) => {}
                other => {
                    self.pending = Some(other);
                    return Ok(());
                }
            }
        }
    }
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

fn append_unescaped(dst: &mut Vec<u8>, raw: &[u8]) {
    let from = dst.len();
    dst.extend_from_slice(raw);
    let len = unescape_in_place(&mut dst[from..]);
    dst.truncate(from + len);
}

impl TokenSource for XmlTokenizer<'_> {
    fn next_token(&mut self) -> Result<Option<&mut Token>> {
        loop {
            match self.next_event()? {
                Event::Start(start) => {
                    self.fill_start(&start, false)?;
                    self.collect_char_data()?;
                    return Ok(Some(&mut self.token));
                }
                Event::Empty(start) => {
                    self.fill_start(&start, true)?;
                    return Ok(Some(&mut self.token));
                }
                Event::End(end) => {
                    self.fill_end(&end);
                    return Ok(Some(&mut self.token));
                }
                Event::Eof => return Ok(None),
                // Declarations, comments and character data outside of a start tag
                _ => {}
            }
        }
    }
}
