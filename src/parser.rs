//! Streaming decoders for VMAP and VAST documents.
//!
//! Each element decoder receives the start token of its element plus the live
//! token source. It reads its attributes from the start token, then pulls
//! tokens until the end token of that same element shows up, handing known
//! children to nested decoders. Grouping elements such as `<Creatives>` or
//! `<TrackingEvents>` are walked through as if their children belonged to the
//! parent; any other unknown element is skipped together with its subtree.

use crate::config::DecoderConfig;
use crate::duration::parse_duration;
use crate::entities::unescape_vec;
use crate::error::{Result, VmapError};
use crate::models::*;
use crate::pool::{DEFAULT_POOL, TokenPool};
use crate::tokenizer::{ElementId, Token, TokenSource, XmlTokenizer};
use log::{debug, trace};

const VMAP: &str = "VMAP";
const AD_BREAK: &str = "AdBreak";
const VAST: &str = "VAST";
const AD: &str = "Ad";
const INLINE: &str = "InLine";
const CREATIVE: &str = "Creative";
const LINEAR: &str = "Linear";
const EXTENSION: &str = "Extension";
const MEDIA_FILE: &str = "MediaFile";

/// Decode a VAST document using the process-wide token pool
pub fn decode_vast(input: &[u8]) -> Result<Vast> {
    decode_vast_from(&mut XmlTokenizer::new(input), &DEFAULT_POOL)
}

/// Decode a VMAP document using the process-wide token pool
pub fn decode_vmap(input: &[u8]) -> Result<Vmap> {
    decode_vmap_from(&mut XmlTokenizer::new(input), &DEFAULT_POOL)
}

/// Parse a VAST XML string into a Vast struct
pub fn parse_vast(xml: &str) -> Result<Vast> {
    decode_vast(xml.as_bytes())
}

/// Parse a VMAP XML string into a Vmap struct
pub fn parse_vmap(xml: &str) -> Result<Vmap> {
    decode_vmap(xml.as_bytes())
}

/// A decoder with its own token pool and tuning
#[derive(Debug)]
pub struct Decoder {
    pool: TokenPool,
    attr_capacity: usize,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Decoder {
            pool: TokenPool::new(config.pool_capacity, config.attr_capacity),
            attr_capacity: config.attr_capacity,
        }
    }

    pub fn decode_vast(&self, input: &[u8]) -> Result<Vast> {
        let mut tok = XmlTokenizer::with_attr_capacity(input, self.attr_capacity);
        decode_vast_from(&mut tok, &self.pool)
    }

    pub fn decode_vmap(&self, input: &[u8]) -> Result<Vmap> {
        let mut tok = XmlTokenizer::with_attr_capacity(input, self.attr_capacity);
        decode_vmap_from(&mut tok, &self.pool)
    }

    pub fn pool(&self) -> &TokenPool {
        &self.pool
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new(DecoderConfig::default())
    }
}

/// Decode the first `<VAST>` element produced by `tok`.
///
/// A self-closing root yields an empty [`Vast`].
pub fn decode_vast_from<S: TokenSource>(tok: &mut S, pool: &TokenPool) -> Result<Vast> {
    loop {
        let Some(token) = tok.next_token()? else {
            return Err(VmapError::RootNotFound(VAST));
        };
        if token.is_end || token.local_name() != VAST.as_bytes() {
            continue;
        }

        debug!("found <VAST> root");
        if token.self_closing {
            return Ok(Vast::default());
        }
        let mut start = pool.copy_of(token);
        let vast = parse_vast_element(tok, pool, &mut start)?;
        debug!("decoded VAST {} with {} ads", vast.version, vast.ads.len());
        return Ok(vast);
    }
}

/// Decode the first `<VMAP>` element produced by `tok`.
///
/// A self-closing root yields an empty [`Vmap`].
pub fn decode_vmap_from<S: TokenSource>(tok: &mut S, pool: &TokenPool) -> Result<Vmap> {
    loop {
        let Some(token) = tok.next_token()? else {
            return Err(VmapError::RootNotFound(VMAP));
        };
        if token.is_end || token.local_name() != VMAP.as_bytes() {
            continue;
        }

        debug!("found <VMAP> root");
        if token.self_closing {
            return Ok(Vmap::default());
        }
        let mut start = pool.copy_of(token);
        let vmap = parse_vmap_element(tok, pool, &mut start)?;
        debug!("decoded VMAP {} with {} ad breaks", vmap.version, vmap.ad_breaks.len());
        return Ok(vmap);
    }
}

enum VmapChild {
    AdBreak,
    Unknown,
}

impl VmapChild {
    fn of(name: &[u8]) -> Self {
        match name {
            b"AdBreak" => VmapChild::AdBreak,
            _ => VmapChild::Unknown,
        }
    }
}

fn parse_vmap_element<S: TokenSource>(
    tok: &mut S,
    pool: &TokenPool,
    start: &mut Token,
) -> Result<Vmap> {
    let mut vmap = Vmap::default();
    vmap.xml_name.local = lossy(&start.name.local);

    // The root's namespace is declared by `xmlns:<prefix>`, or `xmlns` when unprefixed
    let prefix = std::mem::take(&mut start.name.prefix);
    for attr in start.attrs_mut() {
        let declares_root = if prefix.is_empty() {
            attr.name.prefix.is_empty() && attr.name.local == b"xmlns"
        } else {
            attr.name.prefix == b"xmlns" && attr.name.local == prefix
        };
        let field = match attr.name.local.as_slice() {
            b"version" => Some(&mut vmap.version),
            b"vmap" => Some(&mut vmap.namespace),
            _ => None,
        };
        if !declares_root && field.is_none() {
            continue;
        }

        let value = attr_text(&mut attr.value);
        if declares_root {
            vmap.xml_name.space = value.clone();
        }
        if let Some(field) = field {
            *field = value;
        }
    }

    loop {
        let Some(token) = tok.next_token()? else {
            return Err(unexpected_eof(VMAP));
        };
        if token.is_end_element_of(start) {
            return Ok(vmap);
        }
        if token.is_end {
            continue;
        }

        match VmapChild::of(token.local_name()) {
            VmapChild::AdBreak => {
                let mut child = pool.copy_of(token);
                vmap.ad_breaks.push(parse_ad_break(tok, pool, &mut child)?);
            }
            VmapChild::Unknown => {
                let open = skipped(token, VMAP);
                skip_element(tok, open, VMAP)?;
            }
        }
    }
}

enum AdBreakChild {
    Group,
    TrackingEvents,
    Tracking,
    Vast,
    Unknown,
}

impl AdBreakChild {
    fn of(name: &[u8]) -> Self {
        match name {
            b"AdSource" | b"VASTAdData" => AdBreakChild::Group,
            b"TrackingEvents" => AdBreakChild::TrackingEvents,
            b"Tracking" => AdBreakChild::Tracking,
            b"VAST" => AdBreakChild::Vast,
            _ => AdBreakChild::Unknown,
        }
    }
}

/// Parse an AdBreak element.
///
/// The returned break always has an ad source, even when no VAST was found.
pub fn parse_ad_break<S: TokenSource>(
    tok: &mut S,
    pool: &TokenPool,
    start: &mut Token,
) -> Result<AdBreak> {
    let mut ad_break = AdBreak::default();

    for attr in start.attrs_mut() {
        match attr.name.local.as_slice() {
            b"breakId" => ad_break.id = attr_text(&mut attr.value),
            b"breakType" => ad_break.break_type = attr_text(&mut attr.value),
            b"timeOffset" => {
                let text = attr_text(&mut attr.value);
                ad_break.time_offset = Some(TimeOffset::parse(&text)?);
            }
            _ => (),
        }
    }

    if start.self_closing {
        return Ok(ad_break);
    }

    loop {
        let Some(token) = tok.next_token()? else {
            return Err(unexpected_eof(AD_BREAK));
        };
        if token.is_end_element_of(start) {
            return Ok(ad_break);
        }
        if token.is_end {
            continue;
        }

        match AdBreakChild::of(token.local_name()) {
            AdBreakChild::Group => {}
            AdBreakChild::TrackingEvents => {
                ad_break.tracking_events.get_or_insert_with(Vec::new);
            }
            AdBreakChild::Tracking => {
                let tracking = parse_tracking(token);
                ad_break
                    .tracking_events
                    .get_or_insert_with(Vec::new)
                    .push(tracking);
            }
            AdBreakChild::Vast => {
                let mut child = pool.copy_of(token);
                let vast = parse_vast_element(tok, pool, &mut child)?;
                ad_break.ad_source.vast_data.vast = Some(vast);
            }
            AdBreakChild::Unknown => {
                let open = skipped(token, AD_BREAK);
                skip_element(tok, open, AD_BREAK)?;
            }
        }
    }
}

enum VastChild {
    Ad,
    Unknown,
}

impl VastChild {
    fn of(name: &[u8]) -> Self {
        match name {
            b"Ad" => VastChild::Ad,
            _ => VastChild::Unknown,
        }
    }
}

/// Parse a VAST element, standalone or embedded in an ad break
pub fn parse_vast_element<S: TokenSource>(
    tok: &mut S,
    pool: &TokenPool,
    start: &mut Token,
) -> Result<Vast> {
    let mut vast = Vast::default();

    for attr in start.attrs_mut() {
        match attr.name.local.as_slice() {
            b"version" => vast.version = attr_text(&mut attr.value),
            b"xsi" => vast.xsi = attr_text(&mut attr.value),
            b"noNamespaceSchemaLocation" => {
                vast.no_namespace_schema_location = attr_text(&mut attr.value)
            }
            _ => (),
        }
    }

    if start.self_closing {
        return Ok(vast);
    }

    loop {
        let Some(token) = tok.next_token()? else {
            return Err(unexpected_eof(VAST));
        };
        if token.is_end_element_of(start) {
            return Ok(vast);
        }
        if token.is_end {
            continue;
        }

        match VastChild::of(token.local_name()) {
            VastChild::Ad => {
                let mut child = pool.copy_of(token);
                vast.ads.push(parse_ad(tok, pool, &mut child)?);
            }
            VastChild::Unknown => {
                let open = skipped(token, VAST);
                skip_element(tok, open, VAST)?;
            }
        }
    }
}

enum AdChild {
    InLine,
    Unknown,
}

impl AdChild {
    fn of(name: &[u8]) -> Self {
        match name {
            b"InLine" => AdChild::InLine,
            _ => AdChild::Unknown,
        }
    }
}

/// Parse a single Ad element
pub fn parse_ad<S: TokenSource>(tok: &mut S, pool: &TokenPool, start: &mut Token) -> Result<Ad> {
    let mut ad = Ad::default();

    for attr in start.attrs_mut() {
        match attr.name.local.as_slice() {
            b"id" => ad.id = attr_text(&mut attr.value),
            b"sequence" => ad.sequence = Some(attr_number(&mut attr.value, "sequence", AD)?),
            _ => (),
        }
    }

    if start.self_closing {
        return Ok(ad);
    }

    loop {
        let Some(token) = tok.next_token()? else {
            return Err(unexpected_eof(AD));
        };
        if token.is_end_element_of(start) {
            return Ok(ad);
        }
        if token.is_end {
            continue;
        }

        match AdChild::of(token.local_name()) {
            AdChild::InLine => {
                let mut child = pool.copy_of(token);
                ad.inline = Some(parse_inline(tok, pool, &mut child)?);
            }
            AdChild::Unknown => {
                let open = skipped(token, AD);
                skip_element(tok, open, AD)?;
            }
        }
    }
}

enum InLineChild {
    Group,
    AdSystem,
    AdTitle,
    Impression,
    Error,
    Creative,
    Extension,
    Unknown,
}

impl InLineChild {
    fn of(name: &[u8]) -> Self {
        match name {
            b"Creatives" | b"Extensions" => InLineChild::Group,
            b"AdSystem" => InLineChild::AdSystem,
            b"AdTitle" => InLineChild::AdTitle,
            b"Impression" => InLineChild::Impression,
            b"Error" => InLineChild::Error,
            b"Creative" => InLineChild::Creative,
            b"Extension" => InLineChild::Extension,
            _ => InLineChild::Unknown,
        }
    }
}

/// Parse an InLine element
pub fn parse_inline<S: TokenSource>(
    tok: &mut S,
    pool: &TokenPool,
    start: &mut Token,
) -> Result<InLine> {
    let mut inline = InLine::default();

    if start.self_closing {
        return Ok(inline);
    }

    loop {
        let Some(token) = tok.next_token()? else {
            return Err(unexpected_eof(INLINE));
        };
        if token.is_end_element_of(start) {
            return Ok(inline);
        }
        if token.is_end {
            continue;
        }

        match InLineChild::of(token.local_name()) {
            InLineChild::Group => {}
            InLineChild::AdSystem => inline.ad_system = text_of(token),
            InLineChild::AdTitle => inline.ad_title = text_of(token),
            InLineChild::Impression => inline.impressions.push(parse_impression(token)),
            InLineChild::Error => inline.error = Some(text_of(token)),
            InLineChild::Creative => {
                let mut child = pool.copy_of(token);
                inline.creatives.push(parse_creative(tok, pool, &mut child)?);
            }
            InLineChild::Extension => {
                let mut child = pool.copy_of(token);
                inline.extensions.push(parse_extension(tok, pool, &mut child)?);
            }
            InLineChild::Unknown => {
                let open = skipped(token, INLINE);
                skip_element(tok, open, INLINE)?;
            }
        }
    }
}

enum CreativeChild {
    UniversalAdId,
    Linear,
    Unknown,
}

impl CreativeChild {
    fn of(name: &[u8]) -> Self {
        match name {
            b"UniversalAdId" => CreativeChild::UniversalAdId,
            b"Linear" => CreativeChild::Linear,
            _ => CreativeChild::Unknown,
        }
    }
}

/// Parse a Creative element
pub fn parse_creative<S: TokenSource>(
    tok: &mut S,
    pool: &TokenPool,
    start: &mut Token,
) -> Result<Creative> {
    let mut creative = Creative::default();

    for attr in start.attrs_mut() {
        match attr.name.local.as_slice() {
            b"id" => creative.id = attr_text(&mut attr.value),
            b"adId" => creative.ad_id = attr_text(&mut attr.value),
            b"sequence" => {
                creative.sequence = Some(attr_number(&mut attr.value, "sequence", CREATIVE)?)
            }
            _ => (),
        }
    }

    if start.self_closing {
        return Ok(creative);
    }

    loop {
        let Some(token) = tok.next_token()? else {
            return Err(unexpected_eof(CREATIVE));
        };
        if token.is_end_element_of(start) {
            return Ok(creative);
        }
        if token.is_end {
            continue;
        }

        match CreativeChild::of(token.local_name()) {
            CreativeChild::UniversalAdId => {
                creative.universal_ad_id = Some(parse_universal_ad_id(token));
            }
            CreativeChild::Linear => {
                let mut child = pool.copy_of(token);
                creative.linear = Some(parse_linear(tok, pool, &mut child)?);
            }
            CreativeChild::Unknown => {
                let open = skipped(token, CREATIVE);
                skip_element(tok, open, CREATIVE)?;
            }
        }
    }
}

enum LinearChild {
    Group,
    Duration,
    Tracking,
    MediaFile,
    ClickThrough,
    ClickTracking,
    CustomClick,
    Unknown,
}

impl LinearChild {
    fn of(name: &[u8]) -> Self {
        match name {
            b"TrackingEvents" | b"MediaFiles" | b"VideoClicks" => LinearChild::Group,
            b"Duration" => LinearChild::Duration,
            b"Tracking" => LinearChild::Tracking,
            b"MediaFile" => LinearChild::MediaFile,
            b"ClickThrough" => LinearChild::ClickThrough,
            b"ClickTracking" => LinearChild::ClickTracking,
            b"CustomClick" => LinearChild::CustomClick,
            _ => LinearChild::Unknown,
        }
    }
}

/// Parse a Linear element
pub fn parse_linear<S: TokenSource>(
    tok: &mut S,
    pool: &TokenPool,
    start: &mut Token,
) -> Result<Linear> {
    let mut linear = Linear::default();

    if start.self_closing {
        return Ok(linear);
    }

    loop {
        let Some(token) = tok.next_token()? else {
            return Err(unexpected_eof(LINEAR));
        };
        if token.is_end_element_of(start) {
            return Ok(linear);
        }
        if token.is_end {
            continue;
        }

        match LinearChild::of(token.local_name()) {
            LinearChild::Group => {}
            LinearChild::Duration => linear.duration = parse_duration(&text_of(token))?,
            LinearChild::Tracking => linear.tracking_events.push(parse_tracking(token)),
            LinearChild::MediaFile => linear.media_files.push(parse_media_file(token)?),
            LinearChild::ClickThrough => linear.click_through = Some(parse_video_click(token)),
            LinearChild::ClickTracking => linear.click_tracking.push(parse_video_click(token)),
            LinearChild::CustomClick => linear.custom_click.push(parse_video_click(token)),
            LinearChild::Unknown => {
                let open = skipped(token, LINEAR);
                skip_element(tok, open, LINEAR)?;
            }
        }
    }
}

enum ExtensionChild {
    Group,
    CreativeParameter,
    Unknown,
}

impl ExtensionChild {
    fn of(name: &[u8]) -> Self {
        match name {
            b"CreativeParameters" => ExtensionChild::Group,
            b"CreativeParameter" => ExtensionChild::CreativeParameter,
            _ => ExtensionChild::Unknown,
        }
    }
}

/// Parse an Extension element
pub fn parse_extension<S: TokenSource>(
    tok: &mut S,
    pool: &TokenPool,
    start: &mut Token,
) -> Result<Extension> {
    let mut extension = Extension::default();

    for attr in start.attrs_mut() {
        if attr.name.local == b"type" {
            extension.extension_type = attr_text(&mut attr.value);
        }
    }

    if start.self_closing {
        return Ok(extension);
    }

    loop {
        let Some(token) = tok.next_token()? else {
            return Err(unexpected_eof(EXTENSION));
        };
        if token.is_end_element_of(start) {
            return Ok(extension);
        }
        if token.is_end {
            continue;
        }

        match ExtensionChild::of(token.local_name()) {
            ExtensionChild::Group => {}
            ExtensionChild::CreativeParameter => {
                let parameter = parse_creative_parameter(token, &extension.extension_type);
                extension.creative_parameters.push(parameter);
            }
            ExtensionChild::Unknown => {
                let open = skipped(token, EXTENSION);
                skip_element(tok, open, EXTENSION)?;
            }
        }
    }
}

fn parse_tracking(token: &mut Token) -> TrackingEvent {
    let mut tracking = TrackingEvent::default();
    for attr in token.attrs_mut() {
        if attr.name.local == b"event" {
            tracking.event = attr_text(&mut attr.value);
        }
    }
    tracking.url = text_of(token);
    tracking
}

fn parse_impression(token: &mut Token) -> Impression {
    let mut impression = Impression::default();
    for attr in token.attrs_mut() {
        if attr.name.local == b"id" {
            impression.id = attr_text(&mut attr.value);
        }
    }
    impression.url = text_of(token);
    impression
}

fn parse_video_click(token: &mut Token) -> VideoClick {
    let mut click = VideoClick::default();
    for attr in token.attrs_mut() {
        if attr.name.local == b"id" {
            click.id = attr_text(&mut attr.value);
        }
    }
    click.url = text_of(token);
    click
}

fn parse_universal_ad_id(token: &mut Token) -> UniversalAdId {
    let mut universal_ad_id = UniversalAdId::default();
    for attr in token.attrs_mut() {
        if attr.name.local == b"idRegistry" {
            universal_ad_id.id_registry = attr_text(&mut attr.value);
        }
    }
    universal_ad_id.id = text_of(token);
    universal_ad_id
}

fn parse_media_file(token: &mut Token) -> Result<MediaFile> {
    let mut media_file = MediaFile::default();
    for attr in token.attrs_mut() {
        match attr.name.local.as_slice() {
            b"bitrate" => {
                media_file.bitrate = Some(attr_number(&mut attr.value, "bitrate", MEDIA_FILE)?)
            }
            b"width" => media_file.width = Some(attr_number(&mut attr.value, "width", MEDIA_FILE)?),
            b"height" => {
                media_file.height = Some(attr_number(&mut attr.value, "height", MEDIA_FILE)?)
            }
            b"delivery" => media_file.delivery = attr_text(&mut attr.value),
            b"type" => media_file.media_type = attr_text(&mut attr.value),
            b"codec" => media_file.codec = attr_text(&mut attr.value),
            _ => (),
        }
    }
    media_file.url = text_of(token);
    Ok(media_file)
}

fn parse_creative_parameter(token: &mut Token, extension_type: &str) -> CreativeParameter {
    let mut parameter = CreativeParameter::default();
    for attr in token.attrs_mut() {
        match attr.name.local.as_slice() {
            b"creativeId" => parameter.creative_id = attr_text(&mut attr.value),
            b"name" => parameter.name = attr_text(&mut attr.value),
            b"type" => parameter.parameter_type = attr_text(&mut attr.value),
            _ => (),
        }
    }
    if parameter.parameter_type.is_empty() {
        parameter.parameter_type = extension_type.to_string();
    }
    parameter.value = text_of(token);
    parameter
}

/// Consume tokens up to and including the end tag of `open`.
fn skip_element<S: TokenSource>(
    tok: &mut S,
    open: Option<ElementId>,
    parent: &'static str,
) -> Result<()> {
    let Some(id) = open else {
        return Ok(());
    };
    loop {
        match tok.next_token()? {
            Some(token) if token.closes(id) => return Ok(()),
            Some(_) => continue,
            None => return Err(unexpected_eof(parent)),
        }
    }
}

/// Note an unknown child and return the element to skip, if it has content.
fn skipped(token: &Token, parent: &'static str) -> Option<ElementId> {
    trace!(
        "skipping unknown <{}> inside <{}>",
        String::from_utf8_lossy(token.local_name()),
        parent
    );
    token.open_element()
}

/// The text payload of a leaf element; CDATA is taken as is, text is unescaped in place.
fn text_of(token: &mut Token) -> String {
    if !token.was_cdata {
        unescape_vec(&mut token.data);
    }
    lossy(&token.data)
}

fn attr_text(value: &mut Vec<u8>) -> String {
    unescape_vec(value);
    lossy(value)
}

fn attr_number(value: &mut Vec<u8>, attribute: &'static str, element: &'static str) -> Result<u32> {
    let text = attr_text(value);
    text.trim().parse::<u32>().map_err(|source| VmapError::InvalidNumber {
        attribute,
        element,
        value: text.clone(),
        source,
    })
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn unexpected_eof(element: &'static str) -> VmapError {
    VmapError::UnexpectedEof(element)
}
