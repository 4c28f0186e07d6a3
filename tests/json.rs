use std::path::Path;

use serde_json::json;
use vmap_parser::{TimeOffset, Vast, Vmap, decode_vast, decode_vmap, parse_vmap};

fn sample(name: &str) -> Vec<u8> {
    std::fs::read(Path::new(env!("CARGO_MANIFEST_DIR")).join("samples").join(name)).unwrap()
}

#[test]
fn vmap_survives_a_json_round_trip() {
    let vmap = decode_vmap(&sample("testVmap.xml")).unwrap();
    let text = serde_json::to_string(&vmap).unwrap();
    let back: Vmap = serde_json::from_str(&text).unwrap();
    assert_eq!(back, vmap);
}

#[test]
fn vast_survives_a_json_round_trip() {
    let vast = decode_vast(&sample("testVast.xml")).unwrap();
    let text = serde_json::to_string_pretty(&vast).unwrap();
    let back: Vast = serde_json::from_str(&text).unwrap();
    assert_eq!(back, vast);
}

#[test]
fn durations_and_offsets_are_written_as_text() {
    let vmap = decode_vmap(&sample("testVmap.xml")).unwrap();
    let value = serde_json::to_value(&vmap).unwrap();

    assert_eq!(value["version"], json!("1.0"));
    assert_eq!(value["adBreaks"][0]["timeOffset"], json!("start"));
    assert_eq!(value["adBreaks"][1]["timeOffset"], json!("00:05:00"));
    assert_eq!(
        value["adBreaks"][0]["adSource"]["vastData"]["vast"]["ads"][0]["inline"]["creatives"][0]
            ["linear"]["duration"],
        json!("00:00:15")
    );
}

#[test]
fn offsets_keep_their_form() {
    let vmap = parse_vmap(
        r##"<VMAP version="1.0">
            <AdBreak timeOffset="#2" breakId="a"/>
            <AdBreak timeOffset="25%" breakId="b"/>
            <AdBreak timeOffset="end" breakId="c"/>
            <AdBreak breakId="d"/>
        </VMAP>"##,
    )
    .unwrap();

    let offsets: Vec<_> = vmap.ad_breaks.iter().map(|b| b.time_offset).collect();
    assert_eq!(
        offsets,
        vec![
            Some(TimeOffset::Position(2)),
            Some(TimeOffset::Percent(0.25)),
            Some(TimeOffset::End),
            None,
        ]
    );

    let value = serde_json::to_value(&vmap).unwrap();
    assert_eq!(value["adBreaks"][0]["timeOffset"], json!("#2"));
    assert_eq!(value["adBreaks"][1]["timeOffset"], json!("25%"));
    assert_eq!(value["adBreaks"][3]["timeOffset"], json!(null));
    let back: Vmap = serde_json::from_value(value).unwrap();
    assert_eq!(back, vmap);
}
