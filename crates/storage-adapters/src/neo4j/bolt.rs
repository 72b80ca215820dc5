//! Translation between the driver's [`BoltType`] and [`GraphValue`].
//!
//! Every Bolt structure maps onto exactly one [`GraphValue`] variant.
//! Parameters travel the other way through [`to_bolt`].

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use domains::graph::{Duration, Path, Point, Temporal};
use domains::{GraphValue, Node, Properties, Relationship, ResultSet, StoreError};
use neo4rs::{
    BoltDuration, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNode, BoltNull, BoltPath,
    BoltPoint2D, BoltPoint3D, BoltString, BoltType, BoltUnboundedRelation, Row,
};
use serde::de::IntoDeserializer;
use serde::Deserialize;

fn malformed(message: impl Into<String>) -> StoreError {
    StoreError::Decode(message.into())
}

/// Decodes a batch of rows. Bolt rows carry no field order through the
/// driver, so columns are named by the first row's keys in sorted order.
pub fn decode_rows(rows: Vec<Row>) -> Result<ResultSet, StoreError> {
    let mut columns: Vec<String> = Vec::new();
    let mut decoded = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells: HashMap<String, BoltType> = row
            .to_strict()
            .map_err(|e| malformed(format!("unreadable row: {e}")))?;
        if decoded.is_empty() {
            columns = cells.keys().cloned().collect();
            columns.sort();
        }
        if cells.len() != columns.len() {
            return Err(malformed(format!(
                "row has {} values for {} columns",
                cells.len(),
                columns.len()
            )));
        }
        let values = columns
            .iter()
            .map(|column| match cells.remove(column) {
                Some(cell) => decode_bolt(cell),
                None => Err(malformed(format!("row without column `{column}`"))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        decoded.push(values);
    }
    Ok(ResultSet::new(columns, decoded))
}

pub fn decode_bolt(value: BoltType) -> Result<GraphValue, StoreError> {
    let decoded = match value {
        BoltType::Null(_) => GraphValue::Null,
        BoltType::Boolean(b) => GraphValue::Boolean(b.value),
        BoltType::Integer(i) => GraphValue::Integer(i.value),
        BoltType::Float(f) => GraphValue::Float(f.value),
        BoltType::String(s) => GraphValue::String(s.value),
        BoltType::Bytes(b) => GraphValue::Bytes(b.value.to_vec()),
        BoltType::List(items) => GraphValue::List(list(items)?),
        BoltType::Map(entries) => GraphValue::Map(properties(entries)?),
        BoltType::Node(n) => GraphValue::Node(node(n)?),
        BoltType::Relation(r) => GraphValue::Relationship(Relationship {
            element_id: r.id.value.to_string(),
            start_element_id: r.start_node_id.value.to_string(),
            end_element_id: r.end_node_id.value.to_string(),
            rel_type: r.typ.value,
            properties: properties(r.properties)?,
        }),
        BoltType::UnboundedRelation(r) => GraphValue::Relationship(unbounded(r)?),
        BoltType::Path(p) => GraphValue::Path(path(p)?),
        BoltType::Point2D(p) => GraphValue::Point(Point {
            srid: srid(p.sr_id.value)?,
            x: p.x.value,
            y: p.y.value,
            z: None,
        }),
        BoltType::Point3D(p) => GraphValue::Point(Point {
            srid: srid(p.sr_id.value)?,
            x: p.x.value,
            y: p.y.value,
            z: Some(p.z.value),
        }),
        BoltType::Duration(d) => GraphValue::Temporal(Temporal::Duration(duration(d)?)),
        BoltType::Date(d) => GraphValue::Temporal(Temporal::Date(
            NaiveDate::try_from(&d).map_err(|_| malformed("date out of range"))?,
        )),
        BoltType::Time(t) => {
            let (time, offset) = <(NaiveTime, FixedOffset)>::from(&t);
            GraphValue::Temporal(Temporal::Time { time, offset })
        }
        BoltType::LocalTime(t) => GraphValue::Temporal(Temporal::LocalTime(NaiveTime::from(&t))),
        BoltType::DateTime(dt) => GraphValue::Temporal(Temporal::DateTime(
            DateTime::<FixedOffset>::try_from(&dt)
                .map_err(|_| malformed("datetime out of range"))?,
        )),
        BoltType::LocalDateTime(dt) => GraphValue::Temporal(Temporal::LocalDateTime(
            NaiveDateTime::try_from(&dt).map_err(|_| malformed("local datetime out of range"))?,
        )),
        BoltType::DateTimeZoneId(dt) => {
            let zone = dt.tz_id().to_string();
            let datetime = DateTime::<FixedOffset>::try_from(&dt)
                .map_err(|_| malformed(format!("unresolvable zoned datetime in `{zone}`")))?;
            GraphValue::Temporal(Temporal::ZonedDateTime { datetime, zone })
        }
    };
    Ok(decoded)
}

fn list(items: BoltList) -> Result<Vec<GraphValue>, StoreError> {
    items.value.into_iter().map(decode_bolt).collect()
}

fn properties(entries: BoltMap) -> Result<Properties, StoreError> {
    entries
        .value
        .into_iter()
        .map(|(key, value)| Ok((key.value, decode_bolt(value)?)))
        .collect()
}

fn node(n: BoltNode) -> Result<Node, StoreError> {
    let labels = n
        .labels
        .value
        .into_iter()
        .map(|label| match label {
            BoltType::String(s) => Ok(s.value),
            _ => Err(malformed("node label is not a string")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Node {
        element_id: n.id.value.to_string(),
        labels,
        properties: properties(n.properties)?,
    })
}

/// Endpoints are filled in by [`path`], which knows the walk direction.
fn unbounded(r: BoltUnboundedRelation) -> Result<Relationship, StoreError> {
    Ok(Relationship {
        element_id: r.id.value.to_string(),
        rel_type: r.typ.value,
        properties: properties(r.properties)?,
        ..Relationship::default()
    })
}

/// A Bolt path ships unique nodes and relationships plus an index walk:
/// pairs of (1-based relationship index, node index), where a negative
/// relationship index means it is traversed against its direction.
fn path(p: BoltPath) -> Result<Path, StoreError> {
    let nodes = p
        .nodes
        .value
        .into_iter()
        .map(|value| match value {
            BoltType::Node(n) => node(n),
            _ => Err(malformed("path node is not a node")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let rels = p
        .rels
        .value
        .into_iter()
        .map(|value| match value {
            BoltType::UnboundedRelation(r) => unbounded(r),
            _ => Err(malformed("path relationship is not a relationship")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let indices = p
        .indices
        .value
        .into_iter()
        .map(|value| match value {
            BoltType::Integer(i) => Ok(i.value),
            _ => Err(malformed("path index is not an integer")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    if indices.len() % 2 != 0 {
        return Err(malformed("path indices do not pair up"));
    }

    let first = nodes.first().ok_or_else(|| malformed("path without nodes"))?;
    let mut walk = Path {
        nodes: vec![first.clone()],
        relationships: Vec::with_capacity(indices.len() / 2),
    };
    for step in indices.chunks_exact(2) {
        let (rel_index, node_index) = (step[0], step[1]);
        let next = usize::try_from(node_index)
            .ok()
            .and_then(|i| nodes.get(i))
            .ok_or_else(|| malformed(format!("path node index {node_index} out of range")))?;
        let mut rel = usize::try_from(rel_index.unsigned_abs())
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| rels.get(i))
            .cloned()
            .ok_or_else(|| malformed(format!("path relationship index {rel_index} out of range")))?;
        let previous = walk.nodes.last().map(|n| n.element_id.clone()).unwrap_or_default();
        if rel_index > 0 {
            rel.start_element_id = previous;
            rel.end_element_id = next.element_id.clone();
        } else {
            rel.start_element_id = next.element_id.clone();
            rel.end_element_id = previous;
        }
        walk.relationships.push(rel);
        walk.nodes.push(next.clone());
    }
    Ok(walk)
}

fn srid(raw: i64) -> Result<u32, StoreError> {
    u32::try_from(raw).map_err(|_| malformed(format!("invalid srid {raw}")))
}

/// The driver folds months and days into seconds (a month counts as
/// 2 629 800 s), so calendar components do not survive the trip.
fn duration(d: BoltDuration) -> Result<Duration, StoreError> {
    let value = BoltType::Duration(d);
    let (seconds, nanoseconds) = <(i64, i64)>::deserialize((&value).into_deserializer())
        .map_err(|e| malformed(format!("unreadable duration: {e}")))?;
    Ok(Duration {
        months: 0,
        days: 0,
        seconds,
        nanoseconds: i32::try_from(nanoseconds)
            .map_err(|_| malformed(format!("duration nanoseconds {nanoseconds} out of range")))?,
    })
}

/// Encodes a parameter. Parameters are plain values in practice; graph
/// entities go out as their property maps.
pub fn to_bolt(value: &GraphValue) -> BoltType {
    match value {
        GraphValue::Null => BoltType::Null(BoltNull),
        GraphValue::Boolean(b) => BoltType::from(*b),
        GraphValue::Integer(i) => BoltType::from(*i),
        GraphValue::Float(f) => BoltType::from(*f),
        GraphValue::String(s) => BoltType::from(s.as_str()),
        GraphValue::Bytes(b) => BoltType::from(b.clone()),
        GraphValue::List(items) => {
            BoltType::List(items.iter().map(to_bolt).collect::<Vec<_>>().into())
        }
        GraphValue::Map(entries) => BoltType::Map(bolt_map(entries)),
        GraphValue::Node(n) => BoltType::Map(bolt_map(&n.properties)),
        GraphValue::Relationship(r) => BoltType::Map(bolt_map(&r.properties)),
        GraphValue::Path(p) => BoltType::List(
            p.segments().iter().map(to_bolt).collect::<Vec<_>>().into(),
        ),
        GraphValue::Point(p) => match p.z {
            None => BoltType::Point2D(BoltPoint2D {
                sr_id: BoltInteger::new(i64::from(p.srid)),
                x: BoltFloat::new(p.x),
                y: BoltFloat::new(p.y),
            }),
            Some(z) => BoltType::Point3D(BoltPoint3D {
                sr_id: BoltInteger::new(i64::from(p.srid)),
                x: BoltFloat::new(p.x),
                y: BoltFloat::new(p.y),
                z: BoltFloat::new(z),
            }),
        },
        GraphValue::Temporal(t) => temporal_to_bolt(t),
        GraphValue::ResultSet(set) => BoltType::List(
            set.rows
                .iter()
                .map(|row| {
                    let entries: Properties =
                        set.columns.iter().cloned().zip(row.iter().cloned()).collect();
                    BoltType::Map(bolt_map(&entries))
                })
                .collect::<Vec<_>>()
                .into(),
        ),
    }
}

fn bolt_map(entries: &Properties) -> BoltMap {
    entries
        .iter()
        .map(|(key, value)| (BoltString::from(key.as_str()), to_bolt(value)))
        .collect()
}

fn temporal_to_bolt(t: &Temporal) -> BoltType {
    match t {
        Temporal::Date(d) => BoltType::from(*d),
        Temporal::Time { time, offset } => BoltType::from((*time, *offset)),
        Temporal::LocalTime(time) => BoltType::from(*time),
        Temporal::DateTime(dt) => BoltType::from(*dt),
        Temporal::LocalDateTime(dt) => BoltType::from(*dt),
        Temporal::ZonedDateTime { datetime, zone } => {
            BoltType::from((datetime.naive_local(), zone.as_str()))
        }
        Temporal::Duration(d) => BoltType::Duration(BoltDuration::new(
            BoltInteger::new(d.months),
            BoltInteger::new(d.days),
            BoltInteger::new(d.seconds),
            BoltInteger::new(i64::from(d.nanoseconds)),
        )),
    }
}
