//! # Native Value Conversion
//!
//! Turns raw graph values into plain JSON, recursively. Identity and
//! label/type disclosure are controlled by [`Disclosure`] and apply at
//! every depth.
//!
//! ## Known limitation: integer narrowing
//!
//! Graph integers are 64-bit. JSON consumers read numbers as IEEE doubles,
//! so integers outside `±MAX_SAFE_INTEGER` are emitted as the nearest
//! double and lose precision. This is deliberate and matches what the
//! clients of this API would do anyway.

use base64::Engine;
use serde::Deserialize;
use serde_json::{Map, Number, Value};

use crate::graph::{GraphValue, Point, Properties, SRID_WGS84_2D, SRID_WGS84_3D};

/// Largest integer a double represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Which internal metadata of nodes and relationships is exposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Disclosure {
    /// Adds `_labels` to nodes and `_type` to relationships.
    #[serde(default)]
    pub labels_or_type: bool,
    /// Adds `_id` to nodes and relationships.
    #[serde(default)]
    pub identity: bool,
}

impl Disclosure {
    pub const HIDDEN: Disclosure = Disclosure {
        labels_or_type: false,
        identity: false,
    };

    pub const FULL: Disclosure = Disclosure {
        labels_or_type: true,
        identity: true,
    };
}

/// Converts one value, and everything it contains, to native JSON.
pub fn to_native(value: &GraphValue, disclosure: Disclosure) -> Value {
    match value {
        GraphValue::Null => Value::Null,
        GraphValue::ResultSet(set) => Value::Array(
            set.rows
                .iter()
                .map(|row| {
                    Value::Object(
                        set.columns
                            .iter()
                            .zip(row)
                            .map(|(column, cell)| (column.clone(), to_native(cell, disclosure)))
                            .collect(),
                    )
                })
                .collect(),
        ),
        GraphValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| to_native(item, disclosure))
                .collect(),
        ),
        GraphValue::Path(path) => Value::Array(
            path.segments()
                .iter()
                .map(|segment| to_native(segment, disclosure))
                .collect(),
        ),
        GraphValue::Node(node) => entity(
            &node.element_id,
            ("_labels", || {
                Value::Array(node.labels.iter().cloned().map(Value::String).collect())
            }),
            &node.properties,
            disclosure,
        ),
        GraphValue::Relationship(rel) => entity(
            &rel.element_id,
            ("_type", || Value::String(rel.rel_type.clone())),
            &rel.properties,
            disclosure,
        ),
        GraphValue::Integer(i) => integer(*i),
        GraphValue::Temporal(t) => Value::String(t.to_string()),
        GraphValue::Point(p) => point(p),
        GraphValue::Map(entries) => Value::Object(properties(entries, disclosure)),
        GraphValue::Boolean(b) => Value::Bool(*b),
        GraphValue::Float(f) => float(*f),
        GraphValue::String(s) => Value::String(s.clone()),
        GraphValue::Bytes(bytes) => {
            Value::String(base64::engine::general_purpose::STANDARD.encode(bytes))
        }
    }
}

/// Shared shape of nodes and relationships: optional metadata fields,
/// then the properties. A property of the same name wins over metadata.
fn entity<F>(
    element_id: &str,
    (meta_key, meta): (&str, F),
    props: &Properties,
    disclosure: Disclosure,
) -> Value
where
    F: FnOnce() -> Value,
{
    let mut out = Map::new();
    if disclosure.identity {
        out.insert("_id".to_string(), Value::String(element_id.to_string()));
    }
    if disclosure.labels_or_type {
        out.insert(meta_key.to_string(), meta());
    }
    out.extend(properties(props, disclosure));
    Value::Object(out)
}

fn properties(props: &Properties, disclosure: Disclosure) -> Map<String, Value> {
    props
        .iter()
        .map(|(key, value)| (key.clone(), to_native(value, disclosure)))
        .collect()
}

fn integer(value: i64) -> Value {
    if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&value) {
        Value::from(value)
    } else {
        float(value as f64)
    }
}

/// NaN and infinities have no JSON form and become `null`.
fn float(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Geographic points swap axes: `x` is latitude, `y` is longitude.
fn point(p: &Point) -> Value {
    let mut out = Map::new();
    match p.srid {
        SRID_WGS84_2D | SRID_WGS84_3D => {
            out.insert("longitude".into(), float(p.y));
            out.insert("latitude".into(), float(p.x));
            if p.srid == SRID_WGS84_3D {
                if let Some(z) = p.z {
                    out.insert("height".into(), float(z));
                }
            }
        }
        _ => {
            out.insert("x".into(), float(p.x));
            out.insert("y".into(), float(p.y));
            if let Some(z) = p.z {
                out.insert("z".into(), float(z));
            }
        }
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Duration, Node, Relationship, ResultSet, Temporal};
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use serde_json::json;

    fn user_node() -> Node {
        Node::new("4:abc:1", &["User"])
            .with_property("username", "alice")
            .with_property("age", 42i64)
    }

    #[test]
    fn null_maps_to_null() {
        assert_eq!(to_native(&GraphValue::Null, Disclosure::FULL), Value::Null);
    }

    #[test]
    fn node_hides_metadata_by_default() {
        let out = to_native(&GraphValue::Node(user_node()), Disclosure::HIDDEN);
        assert_eq!(out, json!({ "username": "alice", "age": 42 }));
    }

    #[test]
    fn node_metadata_follows_each_flag_independently() {
        let node = GraphValue::Node(user_node());

        let ids_only = to_native(
            &node,
            Disclosure {
                identity: true,
                labels_or_type: false,
            },
        );
        assert_eq!(ids_only["_id"], json!("4:abc:1"));
        assert!(ids_only.get("_labels").is_none());

        let labels_only = to_native(
            &node,
            Disclosure {
                identity: false,
                labels_or_type: true,
            },
        );
        assert_eq!(labels_only["_labels"], json!(["User"]));
        assert!(labels_only.get("_id").is_none());
    }

    #[test]
    fn relationship_uses_type_field() {
        let rel = Relationship {
            element_id: "5:abc:9".into(),
            start_element_id: "4:abc:1".into(),
            end_element_id: "4:abc:2".into(),
            rel_type: "FAVORITED".into(),
            properties: Properties::new(),
        };
        let out = to_native(&GraphValue::Relationship(rel), Disclosure::FULL);
        assert_eq!(out, json!({ "_id": "5:abc:9", "_type": "FAVORITED" }));
    }

    #[test]
    fn flags_reach_nested_nodes() {
        let nested = GraphValue::map([(
            "rows",
            GraphValue::List(vec![GraphValue::map([("who", GraphValue::Node(user_node()))])]),
        )]);

        let full = to_native(&nested, Disclosure::FULL);
        assert_eq!(full["rows"][0]["who"]["_labels"], json!(["User"]));

        let hidden = to_native(&nested, Disclosure::HIDDEN);
        assert!(hidden["rows"][0]["who"].get("_labels").is_none());
        assert!(hidden["rows"][0]["who"].get("_id").is_none());
    }

    #[test]
    fn property_wins_over_metadata_of_same_name() {
        let node = Node::new("4:abc:1", &["User"]).with_property("_id", "custom");
        let out = to_native(&GraphValue::Node(node), Disclosure::FULL);
        assert_eq!(out["_id"], json!("custom"));
    }

    #[test]
    fn result_set_rows_keep_declared_column_order() {
        let set = ResultSet::new(
            vec!["z".into(), "a".into()],
            vec![
                vec![GraphValue::Integer(1), GraphValue::from("x")],
                vec![GraphValue::Integer(2), GraphValue::Null],
            ],
        );
        let out = to_native(&GraphValue::ResultSet(set), Disclosure::HIDDEN);
        assert_eq!(out, json!([{ "z": 1, "a": "x" }, { "z": 2, "a": null }]));

        let keys: Vec<&String> = out[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn sequences_preserve_length_and_order() {
        let list = GraphValue::List(vec![
            GraphValue::Integer(3),
            GraphValue::Temporal(Temporal::Date(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap())),
            GraphValue::from("c"),
        ]);
        assert_eq!(to_native(&list, Disclosure::HIDDEN), json!([3, "2020-01-02", "c"]));
    }

    #[test]
    fn geographic_point_swaps_axes() {
        let p = Point {
            srid: 4326,
            x: 10.0,
            y: 20.0,
            z: None,
        };
        assert_eq!(
            to_native(&GraphValue::Point(p), Disclosure::HIDDEN),
            json!({ "longitude": 20.0, "latitude": 10.0 })
        );
    }

    #[test]
    fn geographic_3d_point_adds_height() {
        let p = Point {
            srid: 4979,
            x: 1.0,
            y: 2.0,
            z: Some(3.0),
        };
        assert_eq!(
            to_native(&GraphValue::Point(p), Disclosure::HIDDEN),
            json!({ "longitude": 2.0, "latitude": 1.0, "height": 3.0 })
        );
    }

    #[test]
    fn cartesian_point_is_identity_mapped() {
        let p = Point {
            srid: 9157,
            x: 1.0,
            y: 2.0,
            z: Some(3.0),
        };
        assert_eq!(
            to_native(&GraphValue::Point(p), Disclosure::HIDDEN),
            json!({ "x": 1.0, "y": 2.0, "z": 3.0 })
        );
    }

    #[test]
    fn duration_becomes_iso_string() {
        let d = GraphValue::Temporal(Temporal::Duration(Duration {
            days: 14,
            seconds: 16 * 3600 + 12 * 60,
            ..Default::default()
        }));
        assert_eq!(to_native(&d, Disclosure::HIDDEN), json!("P14DT16H12M"));
    }

    #[test]
    fn sub_minute_offset_survives_conversion() {
        let datetime = FixedOffset::east_opt(19 * 60 + 32)
            .and_then(|offset| offset.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).single())
            .unwrap();
        let zoned = GraphValue::Temporal(Temporal::ZonedDateTime {
            datetime,
            zone: "Europe/Amsterdam".into(),
        });
        assert_eq!(
            to_native(&zoned, Disclosure::HIDDEN),
            json!("1900-01-01T00:00:00+00:19:32[Europe/Amsterdam]")
        );
    }

    #[test]
    fn large_integers_narrow_to_doubles() {
        assert_eq!(
            to_native(&GraphValue::Integer(MAX_SAFE_INTEGER), Disclosure::HIDDEN),
            json!(MAX_SAFE_INTEGER)
        );

        let big = i64::MAX;
        let out = to_native(&GraphValue::Integer(big), Disclosure::HIDDEN);
        assert!(out.is_f64());
        assert_eq!(out.as_f64(), Some(big as f64));
    }

    #[test]
    fn bytes_become_base64() {
        let out = to_native(&GraphValue::Bytes(b"hi".to_vec()), Disclosure::HIDDEN);
        assert_eq!(out, json!("aGk="));
    }

    #[test]
    fn native_values_pass_through_unchanged() {
        let native = json!({
            "title": "Hello",
            "count": 3,
            "ratio": 0.5,
            "tags": ["a", "b"],
            "nested": { "ok": true, "none": null }
        });
        let out = to_native(&GraphValue::from(native.clone()), Disclosure::FULL);
        assert_eq!(out, native);
    }

    #[test]
    fn conversion_is_a_fixed_point() {
        let raw = GraphValue::map([
            ("author", GraphValue::Node(user_node())),
            ("big", GraphValue::Integer(i64::MIN)),
            (
                "where",
                GraphValue::Point(Point {
                    srid: 4326,
                    x: 10.0,
                    y: 20.0,
                    z: None,
                }),
            ),
        ]);
        let once = to_native(&raw, Disclosure::FULL);
        let twice = to_native(&GraphValue::from(once.clone()), Disclosure::FULL);
        assert_eq!(once, twice);
    }
}
