//! # Raw Graph Values
//!
//! The closed set of value shapes a graph query can hand back. Storage
//! adapters classify whatever their wire format carries into exactly one
//! of these variants; the converter in [`crate::convert`] then turns them
//! into plain JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset};

/// Property bag of a node, a relationship or a plain map value.
pub type Properties = BTreeMap<String, GraphValue>;

/// Query parameters, bound by name.
pub type Params = BTreeMap<String, GraphValue>;

/// A single value as produced by the graph database.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GraphValue {
    #[default]
    Null,
    Boolean(bool),
    /// 64-bit integer. See [`crate::convert::MAX_SAFE_INTEGER`] for how it
    /// leaves the system.
    Integer(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<GraphValue>),
    Map(Properties),
    Node(Node),
    Relationship(Relationship),
    Path(Path),
    Temporal(Temporal),
    Point(Point),
    ResultSet(ResultSet),
}

impl GraphValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GraphValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GraphValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            GraphValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            GraphValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_node(self) -> Option<Node> {
        match self {
            GraphValue::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<GraphValue>> {
        match self {
            GraphValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Builds a map value from `(key, value)` pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<GraphValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        GraphValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<bool> for GraphValue {
    fn from(value: bool) -> Self {
        GraphValue::Boolean(value)
    }
}

impl From<i64> for GraphValue {
    fn from(value: i64) -> Self {
        GraphValue::Integer(value)
    }
}

impl From<u32> for GraphValue {
    fn from(value: u32) -> Self {
        GraphValue::Integer(i64::from(value))
    }
}

impl From<f64> for GraphValue {
    fn from(value: f64) -> Self {
        GraphValue::Float(value)
    }
}

impl From<&str> for GraphValue {
    fn from(value: &str) -> Self {
        GraphValue::String(value.to_string())
    }
}

impl From<String> for GraphValue {
    fn from(value: String) -> Self {
        GraphValue::String(value)
    }
}

impl From<&String> for GraphValue {
    fn from(value: &String) -> Self {
        GraphValue::String(value.clone())
    }
}

impl<T: Into<GraphValue>> From<Option<T>> for GraphValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(GraphValue::Null, Into::into)
    }
}

impl<T: Into<GraphValue>> From<Vec<T>> for GraphValue {
    fn from(value: Vec<T>) -> Self {
        GraphValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<Properties> for GraphValue {
    fn from(value: Properties) -> Self {
        GraphValue::Map(value)
    }
}

impl From<Node> for GraphValue {
    fn from(value: Node) -> Self {
        GraphValue::Node(value)
    }
}

impl From<Relationship> for GraphValue {
    fn from(value: Relationship) -> Self {
        GraphValue::Relationship(value)
    }
}

impl From<Temporal> for GraphValue {
    fn from(value: Temporal) -> Self {
        GraphValue::Temporal(value)
    }
}

impl From<Point> for GraphValue {
    fn from(value: Point) -> Self {
        GraphValue::Point(value)
    }
}

impl From<ResultSet> for GraphValue {
    fn from(value: ResultSet) -> Self {
        GraphValue::ResultSet(value)
    }
}

/// Lifts an already-native JSON value back into the graph model. Together
/// with [`crate::convert::to_native`] this makes conversion a fixed point.
impl From<serde_json::Value> for GraphValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => GraphValue::Null,
            Value::Bool(b) => GraphValue::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => GraphValue::Integer(i),
                None => GraphValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => GraphValue::String(s),
            Value::Array(items) => GraphValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(entries) => GraphValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, GraphValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// A labeled entity record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub element_id: String,
    pub labels: Vec<String>,
    pub properties: Properties,
}

impl Node {
    pub fn new(element_id: impl Into<String>, labels: &[&str]) -> Self {
        Self {
            element_id: element_id.into(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties: Properties::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<GraphValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&GraphValue> {
        self.properties.get(key)
    }

    /// String property, `None` when missing, null or of another type.
    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(GraphValue::as_str)
    }
}

/// A directed, typed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relationship {
    pub element_id: String,
    pub start_element_id: String,
    pub end_element_id: String,
    pub rel_type: String,
    pub properties: Properties,
}

/// An alternating walk `node (rel node)*`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub nodes: Vec<Node>,
    pub relationships: Vec<Relationship>,
}

impl Path {
    /// Nodes and relationships interleaved in walk order.
    pub fn segments(&self) -> Vec<GraphValue> {
        let mut out = Vec::with_capacity(self.nodes.len() + self.relationships.len());
        let mut rels = self.relationships.iter();
        for node in &self.nodes {
            out.push(GraphValue::Node(node.clone()));
            if let Some(rel) = rels.next() {
                out.push(GraphValue::Relationship(rel.clone()));
            }
        }
        out
    }
}

/// Spatial point. `srid` selects the coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub srid: u32,
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

/// WGS-84 2D.
pub const SRID_WGS84_2D: u32 = 4326;
/// WGS-84 3D.
pub const SRID_WGS84_3D: u32 = 4979;

/// Temporal values. `Display` renders the canonical ISO-8601 form.
#[derive(Debug, Clone, PartialEq)]
pub enum Temporal {
    Date(NaiveDate),
    Time { time: NaiveTime, offset: FixedOffset },
    LocalTime(NaiveTime),
    DateTime(DateTime<FixedOffset>),
    ZonedDateTime { datetime: DateTime<FixedOffset>, zone: String },
    LocalDateTime(NaiveDateTime),
    Duration(Duration),
}

/// Calendar-aware duration, stored the way the database stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Duration {
    pub months: i64,
    pub days: i64,
    pub seconds: i64,
    pub nanoseconds: i32,
}

fn write_offset(f: &mut fmt::Formatter<'_>, offset: &FixedOffset) -> fmt::Result {
    let secs = offset.fix().local_minus_utc();
    if secs == 0 {
        return f.write_str("Z");
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.abs();
    write!(f, "{}{:02}:{:02}", sign, secs / 3600, (secs % 3600) / 60)?;
    // Historical zones such as Amsterdam's +00:19:32 carry seconds.
    if secs % 60 != 0 {
        write!(f, ":{:02}", secs % 60)?;
    }
    Ok(())
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const TIME: &str = "%H:%M:%S%.f";
        const LOCAL_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S%.f";
        match self {
            Temporal::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Temporal::LocalTime(time) => write!(f, "{}", time.format(TIME)),
            Temporal::Time { time, offset } => {
                write!(f, "{}", time.format(TIME))?;
                write_offset(f, offset)
            }
            Temporal::LocalDateTime(dt) => write!(f, "{}", dt.format(LOCAL_DATE_TIME)),
            Temporal::DateTime(dt) => {
                write!(f, "{}", dt.naive_local().format(LOCAL_DATE_TIME))?;
                write_offset(f, dt.offset())
            }
            Temporal::ZonedDateTime { datetime, zone } => {
                write!(f, "{}", datetime.naive_local().format(LOCAL_DATE_TIME))?;
                write_offset(f, datetime.offset())?;
                write!(f, "[{}]", zone)
            }
            Temporal::Duration(d) => fmt::Display::fmt(d, f),
        }
    }
}

impl fmt::Display for Duration {
    /// `P{y}Y{m}M{d}DT{h}H{m}M{s}S`, zero components omitted, `PT0S` when empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let years = self.months / 12;
        let months = self.months % 12;
        let total_nanos = i128::from(self.seconds) * 1_000_000_000 + i128::from(self.nanoseconds);
        let negative = total_nanos < 0;
        let abs = total_nanos.unsigned_abs();
        let hours = abs / 3_600_000_000_000;
        let minutes = (abs % 3_600_000_000_000) / 60_000_000_000;
        let secs = (abs % 60_000_000_000) / 1_000_000_000;
        let frac = abs % 1_000_000_000;
        let sign = if negative { "-" } else { "" };

        f.write_str("P")?;
        if years != 0 {
            write!(f, "{}Y", years)?;
        }
        if months != 0 {
            write!(f, "{}M", months)?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }
        if abs == 0 {
            if years == 0 && months == 0 && self.days == 0 {
                f.write_str("T0S")?;
            }
            return Ok(());
        }
        f.write_str("T")?;
        if hours != 0 {
            write!(f, "{}{}H", sign, hours)?;
        }
        if minutes != 0 {
            write!(f, "{}{}M", sign, minutes)?;
        }
        if secs != 0 || frac != 0 {
            write!(f, "{}{}", sign, secs)?;
            if frac != 0 {
                let digits = format!("{:09}", frac);
                write!(f, ".{}", digits.trim_end_matches('0'))?;
            }
            f.write_str("S")?;
        }
        Ok(())
    }
}

/// A whole query result: named columns in declaration order plus rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<GraphValue>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<GraphValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consumes the set into owned records.
    pub fn into_records(self) -> impl Iterator<Item = Record> {
        let columns: Arc<[String]> = self.columns.into();
        self.rows.into_iter().map(move |values| Record {
            columns: Arc::clone(&columns),
            values,
        })
    }

    /// First record, if any.
    pub fn into_first(self) -> Option<Record> {
        self.into_records().next()
    }
}

/// One owned row of a [`ResultSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<GraphValue>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&GraphValue> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.values.get(index)
    }

    /// Moves a cell out of the record, leaving `Null` behind.
    pub fn take(&mut self, column: &str) -> GraphValue {
        match self.columns.iter().position(|c| c == column) {
            Some(index) => self
                .values
                .get_mut(index)
                .map(std::mem::take)
                .unwrap_or_default(),
            None => GraphValue::Null,
        }
    }

    pub fn into_value(mut self, column: &str) -> GraphValue {
        self.take(column)
    }
}

/// A map value read as a record, one column per key.
impl From<Properties> for Record {
    fn from(entries: Properties) -> Self {
        let (columns, values): (Vec<String>, Vec<GraphValue>) = entries.into_iter().unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn date_and_time_render_iso() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Temporal::Date(date).to_string(), "2024-02-29");

        let time = NaiveTime::from_hms_milli_opt(12, 50, 35, 556).unwrap();
        assert_eq!(Temporal::LocalTime(time).to_string(), "12:50:35.556");

        let offset = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(
            Temporal::Time { time, offset }.to_string(),
            "12:50:35.556+01:00"
        );
    }

    #[test]
    fn utc_datetime_uses_z_suffix() {
        let dt = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2015, 11, 21, 21, 40, 32)
            .unwrap();
        assert_eq!(Temporal::DateTime(dt).to_string(), "2015-11-21T21:40:32Z");
    }

    #[test]
    fn zoned_datetime_keeps_zone_id() {
        let dt = FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2020, 1, 1, 8, 0, 0)
            .unwrap();
        let zoned = Temporal::ZonedDateTime {
            datetime: dt,
            zone: "America/New_York".into(),
        };
        assert_eq!(zoned.to_string(), "2020-01-01T08:00:00-05:00[America/New_York]");
    }

    #[test]
    fn offset_seconds_are_rendered() {
        let dt = FixedOffset::east_opt(19 * 60 + 32)
            .unwrap()
            .with_ymd_and_hms(1900, 1, 1, 0, 0, 0)
            .unwrap();
        let zoned = Temporal::ZonedDateTime {
            datetime: dt,
            zone: "Europe/Amsterdam".into(),
        };
        assert_eq!(zoned.to_string(), "1900-01-01T00:00:00+00:19:32[Europe/Amsterdam]");

        let time = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let offset = FixedOffset::west_opt(3600 + 30).unwrap();
        assert_eq!(Temporal::Time { time, offset }.to_string(), "12:00:00-01:00:30");
    }

    #[test]
    fn record_from_map_reads_by_key() {
        let entries: Properties = [
            ("slug".to_string(), GraphValue::from("hello")),
            ("favorited".to_string(), GraphValue::Boolean(true)),
        ]
        .into_iter()
        .collect();
        let mut record = Record::from(entries);
        assert_eq!(record.get("favorited"), Some(&GraphValue::Boolean(true)));
        assert_eq!(record.take("slug"), GraphValue::from("hello"));
    }

    #[test]
    fn duration_omits_zero_components() {
        let d = Duration {
            months: 14,
            days: 3,
            seconds: 3 * 3600 + 61,
            nanoseconds: 500_000_000,
        };
        assert_eq!(d.to_string(), "P1Y2M3DT3H1M1.5S");
        assert_eq!(Duration::default().to_string(), "PT0S");
        assert_eq!(
            Duration { days: 14, ..Default::default() }.to_string(),
            "P14D"
        );
    }

    #[test]
    fn negative_duration_signs_each_time_component() {
        let d = Duration {
            seconds: -90,
            ..Default::default()
        };
        assert_eq!(d.to_string(), "PT-1M-30S");
    }

    #[test]
    fn record_take_moves_value_out() {
        let rs = ResultSet::new(
            vec!["a".into(), "b".into()],
            vec![vec![GraphValue::Integer(1), GraphValue::from("x")]],
        );
        let mut record = rs.into_first().unwrap();
        assert_eq!(record.take("b"), GraphValue::from("x"));
        assert_eq!(record.get("b"), Some(&GraphValue::Null));
        assert_eq!(record.take("missing"), GraphValue::Null);
    }

    #[test]
    fn path_segments_interleave() {
        let a = Node::new("1", &["User"]);
        let b = Node::new("2", &["Article"]);
        let rel = Relationship {
            element_id: "r".into(),
            rel_type: "POSTED".into(),
            ..Default::default()
        };
        let path = Path {
            nodes: vec![a.clone(), b.clone()],
            relationships: vec![rel.clone()],
        };
        assert_eq!(
            path.segments(),
            vec![GraphValue::Node(a), GraphValue::Relationship(rel), GraphValue::Node(b)]
        );
    }
}
