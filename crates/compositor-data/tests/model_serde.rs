//! Serialization contract checks: tagged enums, defaults, and forward
//! compatibility of unknown kinds.

use compositor_data::model::{Interpolation, Layer, LayerContent, MergeMode, ShapeItem, TrimMode};
use serde_json::json;

#[test]
fn minimal_layer_fills_in_defaults() {
    let layer: Layer = serde_json::from_value(json!({ "name": "bare" })).unwrap();
    assert!(layer.visible);
    assert_eq!(layer.in_point, 0);
    assert_eq!(layer.out_point, i64::MAX);
    assert!(!layer.three_d);
    assert_eq!(layer.opacity.value, 100.0);
    assert!(matches!(layer.content, LayerContent::Null));
    assert_eq!(layer.transform.scale_x.value, 100.0);
}

#[test]
fn shape_items_deserialize_by_type_tag() {
    let items: Vec<ShapeItem> = serde_json::from_value(json!([
        { "type": "rectangle", "position": { "value": [0.0, 0.0] },
          "size": { "value": [10.0, 10.0] } },
        { "type": "trim", "mode": "individually" },
        { "type": "merge", "mode": "subtract" },
        { "type": "repeater" }
    ]))
    .unwrap();

    assert!(matches!(items[0], ShapeItem::Rectangle(_)));
    match &items[1] {
        ShapeItem::Trim(trim) => {
            assert_eq!(trim.mode, TrimMode::Individually);
            // Unspecified window defaults to the full path.
            assert_eq!(trim.start.value, 0.0);
            assert_eq!(trim.end.value, 100.0);
        }
        other => panic!("expected trim, got {other:?}"),
    }
    match &items[2] {
        ShapeItem::Merge(merge) => assert_eq!(merge.mode, MergeMode::Subtract),
        other => panic!("expected merge, got {other:?}"),
    }
    match &items[3] {
        ShapeItem::Repeater(repeater) => {
            assert_eq!(repeater.copies.value, 1.0);
            assert_eq!(repeater.transform.start_opacity.value, 100.0);
        }
        other => panic!("expected repeater, got {other:?}"),
    }
}

#[test]
fn unknown_shape_item_and_layer_kind_round_trip_as_unknown() {
    let item: ShapeItem =
        serde_json::from_value(json!({ "type": "chromaKey", "tolerance": 3 })).unwrap();
    assert!(matches!(item, ShapeItem::Unknown));

    let layer: Layer = serde_json::from_value(json!({
        "name": "hologram",
        "content": { "kind": "volumetric" }
    }))
    .unwrap();
    assert!(matches!(layer.content, LayerContent::Unknown));
}

#[test]
fn keyframe_interpolation_tags_are_lowercase() {
    let layer: Layer = serde_json::from_value(json!({
        "name": "eased",
        "opacity": {
            "value": 0.0,
            "animated": true,
            "keyframes": [
                { "frame": 0, "value": 0.0, "interpolation": "bezier",
                  "easing": { "out_handle": [0.3, 0.0], "in_handle": [0.7, 1.0] } },
                { "frame": 10, "value": 100.0, "interpolation": "hold" }
            ]
        }
    }))
    .unwrap();
    let kfs = &layer.opacity.keyframes;
    assert_eq!(kfs[0].interpolation, Interpolation::Bezier);
    assert_eq!(kfs[1].interpolation, Interpolation::Hold);
    assert_eq!(kfs[0].easing.unwrap().out_handle, [0.3, 0.0]);
}

#[test]
fn normalize_reaches_nested_group_items() {
    let mut layer: Layer = serde_json::from_value(json!({
        "name": "nested",
        "content": {
            "kind": "shape",
            "items": [
                { "type": "group", "items": [
                    { "type": "trim",
                      "start": {
                          "value": 0.0,
                          "animated": true,
                          "keyframes": [
                              { "frame": 8, "value": 50.0 },
                              { "frame": 2, "value": 10.0 }
                          ]
                      } }
                ] }
            ]
        }
    }))
    .unwrap();
    layer.normalize();

    let LayerContent::Shape { items } = &layer.content else {
        panic!("expected shape content");
    };
    let ShapeItem::Group(group) = &items[0] else {
        panic!("expected group");
    };
    let ShapeItem::Trim(trim) = &group.items[0] else {
        panic!("expected trim");
    };
    assert_eq!(trim.start.keyframes[0].frame, 2);
    assert_eq!(trim.start.keyframes[1].frame, 8);
}
