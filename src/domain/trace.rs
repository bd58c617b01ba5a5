//! Trace domain model.
//!
//! A [`Trace`] is the timed record of one instrumented function invocation: the
//! function's name and arguments, the wall-clock instant it started, and an
//! append-only timeline of [`Event`]s. Events are either plain annotated points or
//! complete child traces embedded verbatim, so a serialized trace is a
//! self-contained tree with no cross-record references.
//!
//! # Wire Format
//!
//! ```json
//! {
//!   "function_name": "compute_total",
//!   "function_args": {"n": 3},
//!   "time_start": 1718000000.25,
//!   "events": [
//!     {"type": "event", "name": "start", "time_delta_ms": 0},
//!     {"type": "event", "name": "validated", "time_delta_ms": 2},
//!     {"type": "trace", "name": "fetch_price", "time_delta_ms": 9, "trace": {"...": "..."}}
//!   ]
//! }
//! ```
//!
//! Trees read from JSON are adopted as they are: key order, the presence or
//! absence of `type`, the exact `time_start` number and any keys this crate does
//! not know about all survive a round trip unchanged.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;

use super::error::Result;

/// Name of the sentinel event seeded into every new trace.
pub const START_EVENT: &str = "start";

const TYPE_KEY: &str = "type";
const NAME_KEY: &str = "name";
const DELTA_KEY: &str = "time_delta_ms";
const DATA_KEY: &str = "data";
const TRACE_KEY: &str = "trace";

const FUNCTION_NAME_KEY: &str = "function_name";
const FUNCTION_ARGS_KEY: &str = "function_args";
const TIME_START_KEY: &str = "time_start";
const EVENTS_KEY: &str = "events";

/// What an event carries besides its name and offset.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A named point in time with optional attached data (`"type": "event"`).
    Point { data: Option<Value> },

    /// A complete child trace, attached when it was added to the parent
    /// (`"type": "trace"`).
    Trace(Box<Trace>),
}

/// One entry in a trace's timeline.
///
/// The `type` field is the discriminator: `"event"` for a plain point and
/// `"trace"` for an embedded child trace. Records without a `type` field are
/// read as plain events and written back without one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Event {
    name: String,
    time_delta_ms: i64,
    kind: EventKind,
    /// Keys in serialization order.
    layout: Vec<String>,
    /// Keys with no meaning here, kept for the round trip.
    extra: Map<String, Value>,
}

impl Event {
    fn point(name: String, time_delta_ms: i64, data: Option<Value>) -> Self {
        let mut layout = vec![TYPE_KEY.to_string(), NAME_KEY.to_string(), DELTA_KEY.to_string()];
        if data.is_some() {
            layout.push(DATA_KEY.to_string());
        }
        Self {
            name,
            time_delta_ms,
            kind: EventKind::Point { data },
            layout,
            extra: Map::new(),
        }
    }

    fn with_subtrace(child: Trace, time_delta_ms: i64) -> Self {
        Self {
            name: child.function_name.clone(),
            time_delta_ms,
            kind: EventKind::Trace(Box::new(child)),
            layout: [TYPE_KEY, NAME_KEY, DELTA_KEY, TRACE_KEY].map(String::from).to_vec(),
            extra: Map::new(),
        }
    }

    /// Returns the event name (the child's function name for sub-traces).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Milliseconds elapsed between the trace start and this event.
    #[must_use]
    pub const fn time_delta_ms(&self) -> i64 {
        self.time_delta_ms
    }

    #[must_use]
    pub const fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Data attached to a plain event, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        match &self.kind {
            EventKind::Point { data } => data.as_ref(),
            EventKind::Trace(_) => None,
        }
    }

    /// The embedded child trace, for sub-trace events.
    #[must_use]
    pub fn subtrace(&self) -> Option<&Trace> {
        match &self.kind {
            EventKind::Point { .. } => None,
            EventKind::Trace(trace) => Some(trace),
        }
    }

    const fn type_name(&self) -> &'static str {
        match self.kind {
            EventKind::Point { .. } => "event",
            EventKind::Trace(_) => "trace",
        }
    }
}

impl TryFrom<Map<String, Value>> for Event {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        let mut kind = None;
        let mut name = None;
        let mut time_delta_ms = None;
        let mut data = None;
        let mut body = None;
        let mut layout = Vec::with_capacity(map.len());
        let mut extra = Map::new();

        for (key, value) in map {
            match key.as_str() {
                TYPE_KEY => match value {
                    Value::String(s) => kind = Some(s),
                    other => return Err(format!("event `type` must be a string, got {other}")),
                },
                NAME_KEY => name = Some(expect_string(value, "event `name`")?),
                DELTA_KEY => {
                    time_delta_ms = Some(value.as_i64().ok_or_else(|| {
                        format!("event `time_delta_ms` must be an integer, got {value}")
                    })?);
                }
                DATA_KEY => data = Some(value),
                TRACE_KEY => body = Some(value),
                _ => {
                    extra.insert(key.clone(), value);
                }
            }
            layout.push(key);
        }

        let name = name.ok_or("event is missing `name`")?;
        let time_delta_ms = time_delta_ms.ok_or_else(|| format!("event `{name}` is missing `time_delta_ms`"))?;

        let kind = match kind.as_deref() {
            None | Some("event") => {
                if let Some(body) = body {
                    extra.insert(TRACE_KEY.to_string(), body);
                }
                EventKind::Point { data }
            }
            Some("trace") => {
                let child = match body {
                    Some(Value::Object(tree)) => Trace::try_from(tree)?,
                    Some(other) => return Err(format!("trace event `{name}` has a non-object body: {other}")),
                    None => return Err(format!("trace event `{name}` has no `trace` body")),
                };
                if let Some(data) = data {
                    extra.insert(DATA_KEY.to_string(), data);
                }
                EventKind::Trace(Box::new(child))
            }
            Some(other) => return Err(format!("unknown event type `{other}`")),
        };

        Ok(Self {
            name,
            time_delta_ms,
            kind,
            layout,
            extra,
        })
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.layout.len()))?;
        for key in &self.layout {
            match (key.as_str(), &self.kind) {
                (TYPE_KEY, _) => map.serialize_entry(key, self.type_name())?,
                (NAME_KEY, _) => map.serialize_entry(key, &self.name)?,
                (DELTA_KEY, _) => map.serialize_entry(key, &self.time_delta_ms)?,
                (DATA_KEY, EventKind::Point { data: Some(data) }) => map.serialize_entry(key, data)?,
                (TRACE_KEY, EventKind::Trace(trace)) => map.serialize_entry(key, trace)?,
                (other, _) => {
                    if let Some(value) = self.extra.get(other) {
                        map.serialize_entry(key, value)?;
                    }
                }
            }
        }
        map.end()
    }
}

/// The timed record of one instrumented function invocation.
///
/// Fields are private: a trace is only ever extended by appending events, so
/// the timeline keeps its observation order and its leading `start` sentinel.
///
/// # Examples
///
/// ```
/// use tracelog::Trace;
///
/// let mut child = Trace::new("fetch_price");
/// child.record_event("cache_miss", None);
///
/// let mut trace = Trace::with_args("compute_total", serde_json::json!({"n": 3}).as_object().cloned().unwrap_or_default());
/// trace.record_event("validated", None);
/// trace.attach_subtrace(child);
///
/// assert_eq!(trace.events().len(), 3);
/// assert_eq!(trace.events()[2].subtrace().map(|t| t.events().len()), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Trace {
    function_name: String,
    function_args: Map<String, Value>,
    time_start: Number,
    events: Vec<Event>,
    layout: Vec<String>,
    extra: Map<String, Value>,
}

impl Trace {
    /// Starts a trace with no arguments.
    #[must_use]
    pub fn new(function_name: impl Into<String>) -> Self {
        Self::with_args(function_name, Map::new())
    }

    /// Starts a trace, stamping `time_start` with the current time and seeding
    /// the `start` sentinel at offset zero.
    #[must_use]
    pub fn with_args(function_name: impl Into<String>, function_args: Map<String, Value>) -> Self {
        Self {
            function_name: function_name.into(),
            function_args,
            time_start: Number::from_f64(now_seconds()).unwrap_or_else(|| Number::from(0)),
            events: vec![Event::point(START_EVENT.to_string(), 0, None)],
            layout: [FUNCTION_NAME_KEY, FUNCTION_ARGS_KEY, TIME_START_KEY, EVENTS_KEY]
                .map(String::from)
                .to_vec(),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    #[must_use]
    pub const fn function_args(&self) -> &Map<String, Value> {
        &self.function_args
    }

    /// Start instant in fractional seconds since the Unix epoch.
    #[must_use]
    pub fn time_start(&self) -> f64 {
        self.time_start.as_f64().unwrap_or_default()
    }

    /// Start instant exactly as it appears on the wire (`1718000000` stays an
    /// integer, `1718000000.25` a float).
    #[must_use]
    pub const fn time_start_number(&self) -> &Number {
        &self.time_start
    }

    /// The timeline, in observation order. Never empty for traces built here.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Appends a plain event stamped with the elapsed time since start.
    ///
    /// `data` is attached only when it carries something: `None`, `null`,
    /// `false`, `0`, `""`, `[]` and `{}` all leave the event without a `data`
    /// key.
    pub fn record_event(&mut self, name: impl Into<String>, data: Option<Value>) {
        let time_delta_ms = self.offset_at(now_seconds());
        self.push(Event::point(name.into(), time_delta_ms, data.filter(carries_data)));
    }

    /// Appends `child` as a sub-trace event stamped with the current offset.
    ///
    /// The child keeps its own `time_start`, so its internal timeline stays
    /// relative to when the child itself began.
    pub fn attach_subtrace(&mut self, child: Self) {
        let time_delta_ms = self.offset_at(now_seconds());
        self.push(Event::with_subtrace(child, time_delta_ms));
    }

    /// Serializes the trace into a JSON tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be built.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Adopts a JSON tree verbatim as a trace.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree does not have the trace shape.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serializes the trace as compact JSON text.
    ///
    /// # Errors
    ///
    /// See [`Trace::to_value`].
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a trace from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON trace tree.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Renders the trace for humans. Diagnostic only; not a wire format.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn offset_at(&self, now: f64) -> i64 {
        #[allow(clippy::cast_possible_truncation)]
        let millis = ((now - self.time_start()) * 1000.0).trunc() as i64;
        millis
    }

    fn push(&mut self, event: Event) {
        if let Some(last) = self.events.last() {
            if event.time_delta_ms() < last.time_delta_ms() {
                tracing::warn!(
                    function_name = %self.function_name,
                    event = %event.name(),
                    previous_ms = last.time_delta_ms(),
                    current_ms = event.time_delta_ms(),
                    "clock went backwards while recording trace"
                );
            }
        }
        self.events.push(event);
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        let args = serde_json::to_string(&self.function_args).map_err(|_| fmt::Error)?;
        writeln!(
            f,
            "{prefix}Trace for {} at {}",
            self.function_name,
            format_timestamp(self.time_start())
        )?;
        writeln!(f, "{prefix}Arguments: {args}")?;
        writeln!(f, "{prefix}Events:")?;

        let nested = format!("{prefix}|  | ");
        for event in &self.events {
            writeln!(f, "{prefix}|")?;
            writeln!(f, "{prefix}|- {}ms: {}", event.time_delta_ms(), event.name())?;
            match event.kind() {
                EventKind::Point { data: Some(data) } => writeln!(f, "{nested}{data}")?,
                EventKind::Point { data: None } => {}
                EventKind::Trace(trace) => trace.write_tree(f, &nested)?,
            }
        }

        writeln!(f, "{prefix}End of trace")
    }
}

impl TryFrom<Map<String, Value>> for Trace {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        let mut function_name = None;
        let mut function_args = None;
        let mut time_start = None;
        let mut events = None;
        let mut layout = Vec::with_capacity(map.len());
        let mut extra = Map::new();

        for (key, value) in map {
            match key.as_str() {
                FUNCTION_NAME_KEY => function_name = Some(expect_string(value, "`function_name`")?),
                FUNCTION_ARGS_KEY => match value {
                    Value::Object(args) => function_args = Some(args),
                    other => return Err(format!("`function_args` must be an object, got {other}")),
                },
                TIME_START_KEY => match value {
                    Value::Number(number) => time_start = Some(number),
                    other => return Err(format!("`time_start` must be a number, got {other}")),
                },
                EVENTS_KEY => match value {
                    Value::Array(items) => {
                        let parsed = items
                            .into_iter()
                            .map(|item| match item {
                                Value::Object(event) => Event::try_from(event),
                                other => Err(format!("event must be an object, got {other}")),
                            })
                            .collect::<std::result::Result<Vec<_>, _>>()?;
                        events = Some(parsed);
                    }
                    other => return Err(format!("`events` must be an array, got {other}")),
                },
                _ => {
                    extra.insert(key.clone(), value);
                }
            }
            layout.push(key);
        }

        Ok(Self {
            function_name: function_name.ok_or("trace is missing `function_name`")?,
            function_args: function_args.unwrap_or_default(),
            time_start: time_start.ok_or("trace is missing `time_start`")?,
            events: events.ok_or("trace is missing `events`")?,
            layout,
            extra,
        })
    }
}

impl Serialize for Trace {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.layout.len()))?;
        for key in &self.layout {
            match key.as_str() {
                FUNCTION_NAME_KEY => map.serialize_entry(key, &self.function_name)?,
                FUNCTION_ARGS_KEY => map.serialize_entry(key, &self.function_args)?,
                TIME_START_KEY => map.serialize_entry(key, &self.time_start)?,
                EVENTS_KEY => map.serialize_entry(key, &self.events)?,
                other => {
                    if let Some(value) = self.extra.get(other) {
                        map.serialize_entry(key, value)?;
                    }
                }
            }
        }
        map.end()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, "")
    }
}

fn expect_string(value: Value, what: &str) -> std::result::Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(format!("{what} must be a string, got {other}")),
    }
}

/// Whether `data` is worth attaching: empty and zero-like values are dropped.
fn carries_data(data: &Value) -> bool {
    match data {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Current wall-clock time in fractional seconds, microsecond resolution.
fn now_seconds() -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let micros = Utc::now().timestamp_micros() as f64;
    micros / 1_000_000.0
}

fn format_timestamp(seconds: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let datetime = {
        let whole = seconds.floor();
        let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
        DateTime::<Utc>::from_timestamp(whole as i64, nanos)
    };

    datetime.map_or_else(
        || seconds.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S%.6f UTC").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn point(name: &str, time_delta_ms: i64) -> Event {
        Event::point(name.to_string(), time_delta_ms, None)
    }

    #[test]
    fn new_trace_has_only_start_sentinel() {
        let trace = Trace::new("compute_total");

        assert_eq!(trace.events().len(), 1);
        assert_eq!(trace.events()[0].name(), START_EVENT);
        assert_eq!(trace.events()[0].time_delta_ms(), 0);
        assert!(trace.function_args().is_empty());
        assert!(trace.time_start() > 0.0);
    }

    #[test]
    fn recorded_events_append_in_order_with_non_decreasing_offsets() {
        let mut trace = Trace::new("loop");
        for i in 0..5 {
            trace.record_event(format!("step-{i}"), None);
        }

        assert_eq!(trace.events().len(), 6);
        let names: Vec<_> = trace.events().iter().map(Event::name).collect();
        assert_eq!(names, ["start", "step-0", "step-1", "step-2", "step-3", "step-4"]);
        assert!(trace
            .events()
            .windows(2)
            .all(|pair| pair[0].time_delta_ms() <= pair[1].time_delta_ms()));
    }

    #[test]
    fn offsets_truncate_instead_of_rounding() {
        let mut trace = Trace::new("f");
        trace.time_start = Number::from(100);

        assert_eq!(trace.offset_at(100.0019), 1);
        assert_eq!(trace.offset_at(100.9999), 999);
        assert_eq!(trace.offset_at(102.5), 2500);
    }

    #[test]
    fn backwards_clock_is_recorded_not_rejected() {
        let mut trace = Trace::new("f");
        trace.push(point("late", 50));
        trace.push(point("early", 10));

        assert_eq!(trace.events().len(), 3);
        assert_eq!(trace.events()[2].time_delta_ms(), 10);
    }

    #[test]
    fn data_is_absent_when_not_provided() {
        let mut trace = Trace::new("f");
        trace.record_event("bare", None);
        trace.record_event("with_data", Some(json!({"rows": 12})));

        let value = trace.to_value().unwrap();
        let events = value["events"].as_array().unwrap();
        assert!(events[1].get("data").is_none());
        assert_eq!(events[2]["data"], json!({"rows": 12}));
        assert_eq!(events[2]["type"], "event");
    }

    #[test]
    fn empty_data_is_not_attached() {
        let mut trace = Trace::new("f");
        for empty in [json!({}), json!([]), json!(null), json!(""), json!(0), json!(false)] {
            trace.record_event("empty", Some(empty));
        }
        trace.record_event("kept", Some(json!({"rows": 0})));

        assert!(trace.events()[1..7].iter().all(|event| event.data().is_none()));
        assert_eq!(trace.events()[7].data(), Some(&json!({"rows": 0})));
        let value = trace.to_value().unwrap();
        assert!(value["events"][1].get("data").is_none());
    }

    #[test]
    fn subtrace_embeds_child_verbatim() {
        let mut child = Trace::new("fetch_price");
        child.record_event("cache_miss", None);
        let child_tree = child.to_value().unwrap();

        let mut parent = Trace::with_args("compute_total", args(json!({"n": 3})));
        parent.attach_subtrace(child);

        let value = parent.to_value().unwrap();
        let embedded = &value["events"][1];
        assert_eq!(embedded["type"], "trace");
        assert_eq!(embedded["name"], "fetch_price");
        assert_eq!(embedded["trace"], child_tree);
    }

    #[test]
    fn round_trip_is_lossless() {
        let mut child = Trace::new("inner");
        child.record_event("tick", Some(json!([1, 2, 3])));
        let mut trace = Trace::with_args("outer", args(json!({"z": 1, "a": {"nested": true}})));
        trace.record_event("validated", None);
        trace.attach_subtrace(child);

        let json = trace.to_json().unwrap();
        let restored = Trace::from_json(&json).unwrap();

        assert_eq!(restored, trace);
        assert_eq!(restored.to_json().unwrap(), json);
    }

    #[test]
    fn argument_key_order_survives_round_trip() {
        let input = r#"{"function_name":"f","function_args":{"zeta":1,"alpha":2},"time_start":1718000000.25,"events":[{"type":"event","name":"start","time_delta_ms":0}]}"#;
        let trace = Trace::from_json(input).unwrap();
        assert_eq!(trace.to_json().unwrap(), input);
    }

    #[test]
    fn untyped_events_round_trip_without_gaining_a_type() {
        let input = r#"{"function_name":"f","function_args":{},"time_start":1718000000.5,"events":[{"name":"start","time_delta_ms":0},{"name":"validated","time_delta_ms":2,"type":"event"}]}"#;

        let trace = Trace::from_json(input).unwrap();

        assert!(matches!(trace.events()[0].kind(), EventKind::Point { data: None }));
        assert_eq!(trace.to_json().unwrap(), input);
    }

    #[test]
    fn foreign_trees_are_adopted_verbatim() {
        let input = r#"{"time_start":1718000000,"function_name":"f","events":[{"time_delta_ms":0,"name":"start","host":"a"},{"type":"trace","name":"g","time_delta_ms":3,"trace":{"function_name":"g","function_args":{},"time_start":1718000000.003,"events":[]},"attempt":2}],"host":"a"}"#;

        let trace = Trace::from_json(input).unwrap();

        assert_eq!(trace.time_start_number().as_u64(), Some(1_718_000_000));
        assert!(trace.function_args().is_empty());
        assert_eq!(trace.events()[1].subtrace().map(Trace::function_name), Some("g"));
        assert_eq!(trace.to_json().unwrap(), input);
    }

    #[test]
    fn explicit_null_data_is_kept() {
        let input = r#"{"function_name":"f","function_args":{},"time_start":1.5,"events":[{"type":"event","name":"start","time_delta_ms":0,"data":null}]}"#;
        let trace = Trace::from_json(input).unwrap();
        assert_eq!(trace.to_json().unwrap(), input);
    }

    #[test]
    fn missing_function_args_default_to_empty() {
        let trace = Trace::from_value(json!({
            "function_name": "f",
            "time_start": 1.0,
            "events": [{"type": "event", "name": "start", "time_delta_ms": 0}]
        }))
        .unwrap();
        assert!(trace.function_args().is_empty());
        assert!(trace.to_value().unwrap().get("function_args").is_none());
    }

    #[test]
    fn malformed_trees_are_rejected() {
        let unknown = json!({
            "function_name": "f",
            "time_start": 1.0,
            "events": [{"type": "span", "name": "x", "time_delta_ms": 0}]
        });
        assert!(Trace::from_value(unknown).is_err());

        let bodiless = json!({
            "function_name": "f",
            "time_start": 1.0,
            "events": [{"type": "trace", "name": "x", "time_delta_ms": 0}]
        });
        assert!(Trace::from_value(bodiless).is_err());

        let textual_start = json!({"function_name": "f", "time_start": "now", "events": []});
        assert!(Trace::from_value(textual_start).is_err());

        let fractional_offset = json!({
            "function_name": "f",
            "time_start": 1.0,
            "events": [{"name": "start", "time_delta_ms": 0.5}]
        });
        assert!(Trace::from_value(fractional_offset).is_err());

        assert!(Trace::from_value(json!({"function_name": "f"})).is_err());
    }

    #[test]
    fn render_lists_events_and_nested_traces() {
        let mut child = Trace::new("fetch_price");
        child.record_event("cache_miss", None);
        let mut trace = Trace::with_args("compute_total", args(json!({"n": 3})));
        trace.time_start = Number::from(0);
        trace.record_event("validated", Some(json!({"ok": true})));
        trace.attach_subtrace(child);

        let text = trace.render();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Trace for compute_total at 1970-01-01 00:00:00.000000 UTC");
        assert_eq!(lines[1], "Arguments: {\"n\":3}");
        assert!(lines.contains(&"|- 0ms: start"));
        assert!(lines.contains(&"|  | {\"ok\":true}"));
        assert!(lines.iter().any(|l| l.starts_with("|  | Trace for fetch_price at ")));
        assert!(lines.iter().any(|l| l.ends_with("ms: cache_miss") && l.starts_with("|  | |- ")));
        assert_eq!(lines.last(), Some(&"End of trace"));
    }
}
