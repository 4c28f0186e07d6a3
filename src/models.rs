use serde::{Deserialize, Serialize};

pub use crate::duration::Duration;
pub use crate::offset::TimeOffset;

/// A namespace-qualified element name
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct XmlName {
    /// The namespace URI the element's prefix resolves to
    pub space: String,

    /// The local element name
    pub local: String,
}

/// Represents a VMAP document (Video Multiple Ad Playlist)
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Vmap {
    /// The qualified name of the root element
    pub xml_name: XmlName,

    /// The VMAP namespace declared on the root (`xmlns:vmap`)
    pub namespace: String,

    /// The VMAP version (e.g., "1.0")
    pub version: String,

    /// The ad breaks, in playback order
    pub ad_breaks: Vec<AdBreak>,
}

/// Represents a scheduled ad break within a VMAP document
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdBreak {
    /// The break ID
    pub id: String,

    /// The break type (e.g., "linear", "nonlinear", "display")
    pub break_type: String,

    /// Where in the content the break is placed
    pub time_offset: Option<TimeOffset>,

    /// The ads played in this break
    pub ad_source: AdSource,

    /// Break-level tracking events, present once a `<TrackingEvents>` or
    /// `<Tracking>` element was seen
    pub tracking_events: Option<Vec<TrackingEvent>>,
}

/// Represents the ad payload of an ad break
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdSource {
    pub vast_data: VastData,
}

/// Inline VAST data of an ad source
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct VastData {
    /// The embedded VAST document, if the ad source carries one
    pub vast: Option<Vast>,
}

/// Represents a VAST document (Video Ad Serving Template)
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Vast {
    /// The XML Schema instance namespace (`xmlns:xsi`)
    pub xsi: String,

    /// The schema location (`xsi:noNamespaceSchemaLocation`)
    pub no_namespace_schema_location: String,

    /// The VAST version (e.g., "2.0", "3.0", "4.0", etc.)
    pub version: String,

    /// The Ad elements within the VAST document
    pub ads: Vec<Ad>,
}

/// Represents an Ad within a VAST document
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct Ad {
    /// The ad ID
    pub id: String,

    /// The ad sequence number (for ad pods)
    pub sequence: Option<u32>,

    /// The in-line ad details
    pub inline: Option<InLine>,
}

/// Represents an InLine ad, which contains all the media files and tracking information
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct InLine {
    /// The ad system name
    pub ad_system: String,

    /// The ad title
    pub ad_title: String,

    /// Impression tracking URLs
    pub impressions: Vec<Impression>,

    /// Creative elements
    pub creatives: Vec<Creative>,

    /// Extensions
    pub extensions: Vec<Extension>,

    /// Error tracking URL
    pub error: Option<String>,
}

/// Represents an impression tracking URL
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct Impression {
    /// The impression ID
    pub id: String,

    /// The impression tracking URL
    pub url: String,
}

/// Represents a creative element
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Creative {
    /// The creative ID
    pub id: String,

    /// The creative ad ID
    pub ad_id: String,

    /// The creative sequence number
    pub sequence: Option<u32>,

    /// The universal ad identifier
    pub universal_ad_id: Option<UniversalAdId>,

    /// Linear ad details
    pub linear: Option<Linear>,
}

/// Represents a universal ad identifier
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UniversalAdId {
    /// The registry the ID belongs to (e.g., "ad-id.org")
    pub id_registry: String,

    /// The identifier
    pub id: String,
}

/// Represents a linear ad
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Linear {
    /// The duration of the ad
    pub duration: Duration,

    /// Tracking events
    pub tracking_events: Vec<TrackingEvent>,

    /// Media files
    pub media_files: Vec<MediaFile>,

    /// The click-through URL
    pub click_through: Option<VideoClick>,

    /// Click tracking URLs
    pub click_tracking: Vec<VideoClick>,

    /// Custom click URLs
    pub custom_click: Vec<VideoClick>,
}

/// Represents a media file
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    /// The media file URL
    pub url: String,

    /// The media file bitrate
    pub bitrate: Option<u32>,

    /// The media file width
    pub width: Option<u32>,

    /// The media file height
    pub height: Option<u32>,

    /// The media file delivery type (progressive or streaming)
    pub delivery: String,

    /// The media file MIME type
    pub media_type: String,

    /// The media file codec
    pub codec: String,
}

/// Represents a click-through, click-tracking or custom click URL
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct VideoClick {
    /// The click ID
    pub id: String,

    /// The click URL
    pub url: String,
}

/// Represents a tracking event
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct TrackingEvent {
    /// The event type (e.g., "start", "firstQuartile", "midpoint", "thirdQuartile", "complete", etc.)
    pub event: String,

    /// The tracking URL
    pub url: String,
}

/// Represents a vendor extension
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    /// The extension type (e.g., "FreeWheel")
    pub extension_type: String,

    /// Creative parameters carried by the extension
    pub creative_parameters: Vec<CreativeParameter>,
}

/// Represents a name/value parameter for a creative
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreativeParameter {
    /// The creative the parameter applies to
    pub creative_id: String,

    /// The parameter name
    pub name: String,

    /// The parameter value
    pub value: String,

    /// The parameter type, inherited from the extension when not given
    pub parameter_type: String,
}
