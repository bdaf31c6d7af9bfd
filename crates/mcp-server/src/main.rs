use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use spanline::layout::Frame;
use spanline::relations::{self, AggregateOptions};
use spanline::{
    BoundaryPolicy, FractionMode, FractionalDate, LayoutConfig, LayoutSession, SpanId, SpanRecord,
    SpanStore, StoredConnection, Tab, Viewport, VisibleRange,
};
use spanline_timeline::{Timeline, TimelineAssembler};
use std::env;
use std::io::{self, BufRead, BufReader, Write};

const MAX_MESSAGE_BYTES: usize = 1_048_576; // 1 MiB
const MAX_ID_BYTES: usize = 512;
const MAX_NAME_BYTES: usize = 4 * 1024;
const MAX_RELATED_IDS: usize = 32;
const MAX_VIEWPORT_WIDTH: f64 = 100_000.0;
const DEFAULT_VIEWPORT_WIDTH: f64 = 800.0;
const MAX_TICKS: usize = 10;

struct AppState {
    store: SpanStore,
    runtime: tokio::runtime::Runtime,
    config: LayoutConfig,
}

impl AppState {
    fn open() -> Result<Self> {
        let db_path =
            env::var("SPANLINE_MCP_DB_PATH").unwrap_or_else(|_| "./spanline-mcp.redb".to_string());
        let store = SpanStore::open(&db_path)?;
        tracing::info!(path = %db_path, "span store opened");
        Self::with_store(store)
    }

    fn with_store(store: SpanStore) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        Ok(Self {
            store,
            runtime,
            config: LayoutConfig::default(),
        })
    }
}

fn main() -> Result<()> {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let state = AppState::open().context("failed to open spanline store")?;
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    loop {
        let maybe = match read_message(&mut reader) {
            Ok(m) => m,
            Err(e) => {
                // Bad framing answers -32700 and keeps the server alive.
                tracing::warn!(error = %e, "unreadable message");
                let err_resp = json!({
                    "jsonrpc": "2.0",
                    "id": null,
                    "error": { "code": -32700, "message": format!("Parse error: {e}") }
                });
                write_message(&mut writer, &err_resp)?;
                continue;
            }
        };
        let Some(request) = maybe else {
            break;
        };
        if let Some(response) = handle_request(&state, &request) {
            write_message(&mut writer, &response)?;
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

fn read_message<R: BufRead>(reader: &mut R) -> Result<Option<JsonValue>> {
    let mut content_length: Option<usize> = None;

    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }

        if let Some((name, value)) = trimmed.split_once(':') {
            if name.eq_ignore_ascii_case("Content-Length") {
                content_length = Some(
                    value
                        .trim()
                        .parse::<usize>()
                        .context("invalid Content-Length")?,
                );
            }
        }
    }

    let len = content_length.context("missing Content-Length header")?;
    if len > MAX_MESSAGE_BYTES {
        anyhow::bail!(
            "Content-Length {} exceeds max allowed {} bytes",
            len,
            MAX_MESSAGE_BYTES
        );
    }
    let mut payload = vec![0_u8; len];
    reader.read_exact(&mut payload)?;
    let value: JsonValue = serde_json::from_slice(&payload).context("invalid JSON payload")?;
    Ok(Some(value))
}

fn write_message<W: Write>(writer: &mut W, value: &JsonValue) -> Result<()> {
    let payload = serde_json::to_vec(value)?;
    write!(writer, "Content-Length: {}\r\n\r\n", payload.len())?;
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}

fn handle_request(state: &AppState, req: &JsonValue) -> Option<JsonValue> {
    let id = req.get("id").cloned();
    let method = req.get("method").and_then(JsonValue::as_str)?;
    tracing::debug!(method, "request");

    match method {
        "initialize" => id.map(|id_val| {
            json!({
                "jsonrpc": "2.0",
                "id": id_val,
                "result": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": { "tools": {} },
                    "serverInfo": { "name": "spanline-mcp", "version": env!("CARGO_PKG_VERSION") }
                }
            })
        }),
        "notifications/initialized" => None,
        "tools/list" => id.map(|id_val| {
            json!({
                "jsonrpc": "2.0",
                "id": id_val,
                "result": {
                    "tools": tools_schema()
                }
            })
        }),
        "tools/call" => id.map(|id_val| {
            let result = call_tool(state, req.get("params"));
            match result {
                Ok(tool_result) => json!({
                    "jsonrpc": "2.0",
                    "id": id_val,
                    "result": tool_result
                }),
                Err(err) => {
                    tracing::warn!(error = %format!("{err:#}"), "tool call failed");
                    json!({
                        "jsonrpc": "2.0",
                        "id": id_val,
                        "result": {
                            "content": [{ "type": "text", "text": format!("tool error: {err:#}") }],
                            "isError": true
                        }
                    })
                }
            }
        }),
        "ping" => id.map(|id_val| json!({ "jsonrpc": "2.0", "id": id_val, "result": {} })),
        _ => id.map(|id_val| {
            json!({
                "jsonrpc": "2.0",
                "id": id_val,
                "error": {
                    "code": -32601,
                    "message": format!("method not found: {method}")
                }
            })
        }),
    }
}

fn date_fields_schema() -> JsonValue {
    json!({
        "type": "object",
        "properties": {
            "start_year": {"type": "integer"},
            "start_month": {"type": "integer", "minimum": 0, "maximum": 12},
            "start_day": {"type": "integer", "minimum": 0, "maximum": 31},
            "end_year": {"type": "integer"},
            "end_month": {"type": "integer", "minimum": 0, "maximum": 12},
            "end_day": {"type": "integer", "minimum": 0, "maximum": 31}
        }
    })
}

fn tools_schema() -> Vec<JsonValue> {
    let state = json!({"type": "string", "enum": ["placeholder", "draft", "complete"]});
    let policy = json!({"type": "string", "enum": ["extent", "midpoint"]});
    vec![
        json!({
            "name": "put_span",
            "description": "Create or replace a dated span (person, place, event, ...).",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "name": {"type": "string"},
                    "kind": {
                        "type": "string",
                        "enum": ["person", "organisation", "place", "event", "thing", "connection", "phase"]
                    },
                    "dates": date_fields_schema(),
                    "state": state
                },
                "required": ["id", "name", "kind"]
            }
        }),
        json!({
            "name": "connect",
            "description": "Create or replace a connection between two spans, optionally as a phase of another connection.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "connection_type": {"type": "string"},
                    "parent": {"type": "string"},
                    "child": {"type": "string"},
                    "forward_predicate": {"type": "string"},
                    "inverse_predicate": {"type": "string"},
                    "dates": date_fields_schema(),
                    "phase_of": {"type": "string"},
                    "state": state
                },
                "required": ["id", "connection_type", "parent", "child", "forward_predicate"]
            }
        }),
        json!({
            "name": "temporal_relations",
            "description": "Classify a span's connections, or a connection's phases, by how they sit in time relative to it. Give span_id or connection_id.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "span_id": {"type": "string"},
                    "connection_id": {"type": "string"},
                    "policy": policy,
                    "tab": {
                        "type": "object",
                        "description": "{\"tab\":\"all\"}, {\"tab\":\"relation\",\"value\":\"during\"} or {\"tab\":\"predicate\",\"value\":\"lived in\"}"
                    }
                }
            }
        }),
        json!({
            "name": "timeline_layout",
            "description": "Lay out a span's swimlane timeline, plus any related spans' timelines.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "span_id": {"type": "string"},
                    "related_ids": {"type": "array", "items": {"type": "string"}, "maxItems": MAX_RELATED_IDS},
                    "width": {"type": "number", "exclusiveMinimum": 0, "maximum": MAX_VIEWPORT_WIDTH},
                    "now": {"type": "string", "description": "YYYY-MM-DD, defaults to today"},
                    "relative_axis": {"type": "boolean"},
                    "policy": policy,
                    "session": {"type": "object"},
                    "config": {"type": "object"}
                },
                "required": ["span_id"]
            }
        }),
    ]
}

fn call_tool(state: &AppState, params: Option<&JsonValue>) -> Result<JsonValue> {
    let name = params
        .and_then(|v| v.get("name"))
        .and_then(JsonValue::as_str)
        .context("missing tool name")?;
    let args = params
        .and_then(|v| v.get("arguments"))
        .cloned()
        .unwrap_or_else(|| json!({}));

    match name {
        "put_span" => put_span(state, args),
        "connect" => connect(state, args),
        "temporal_relations" => temporal_relations(state, &args),
        "timeline_layout" => timeline_layout(state, &args),
        _ => anyhow::bail!("unknown tool: {name}"),
    }
}

fn put_span(state: &AppState, args: JsonValue) -> Result<JsonValue> {
    let span: SpanRecord = serde_json::from_value(args).context("invalid span arguments")?;
    check_len("id", span.id.as_str(), MAX_ID_BYTES)?;
    check_len("name", &span.name, MAX_NAME_BYTES)?;
    state.store.put_span(&span)?;
    Ok(json!({
        "content": [{ "type": "text", "text": format!("stored span {}", span.id) }],
        "structuredContent": { "span_id": span.id, "state": span.state() }
    }))
}

fn connect(state: &AppState, args: JsonValue) -> Result<JsonValue> {
    let connection: StoredConnection =
        serde_json::from_value(args).context("invalid connection arguments")?;
    for (field, value) in [
        ("id", connection.id.as_str()),
        ("parent", connection.parent.as_str()),
        ("child", connection.child.as_str()),
        ("connection_type", connection.connection_type.as_str()),
    ] {
        check_len(field, value, MAX_ID_BYTES)?;
    }
    check_len("forward_predicate", &connection.forward_predicate, MAX_NAME_BYTES)?;
    if let Some(inverse) = &connection.inverse_predicate {
        check_len("inverse_predicate", inverse, MAX_NAME_BYTES)?;
    }
    state.store.put_connection(&connection)?;
    Ok(json!({
        "content": [{
            "type": "text",
            "text": format!(
                "connected {} -[{}]-> {}",
                connection.parent, connection.forward_predicate, connection.child
            )
        }],
        "structuredContent": { "connection_id": connection.id }
    }))
}

fn temporal_relations(state: &AppState, args: &JsonValue) -> Result<JsonValue> {
    let policy: BoundaryPolicy = optional(args, "policy")?.unwrap_or_default();
    let tab: Tab = optional(args, "tab")?.unwrap_or(Tab::All);
    let options = AggregateOptions { policy };

    // A connection subject relates its own phases; a span relates its connections.
    let (subject_id, subject_name, set) = match args.get("connection_id") {
        Some(_) => {
            let connection_id = SpanId::new(required_str(args, "connection_id")?);
            let connection = state.store.stored_connection(&connection_id)?;
            let phases = state.store.phase_records(&connection_id)?;
            let set = relations::aggregate_phases(&connection, &phases, options);
            let child = state.store.span(&connection.child)?;
            let name = format!("{} {}", connection.forward_predicate, child.name);
            (connection_id, name, set)
        }
        None => {
            let span_id = SpanId::new(required_str(args, "span_id")?);
            let subject = state.store.span(&span_id)?;
            let connections = state.store.connections_of(&span_id)?;
            let set = relations::aggregate(&subject.dates, &connections, options);
            (span_id, subject.name, set)
        }
    };

    let selected = set.select(&tab);
    let mut text = format!("{} relation(s) for {}", selected.len(), subject_name);
    for relation in &selected {
        text.push_str(&format!(
            "\n{}: {} {} ({})",
            relation.display, relation.predicate, relation.related.name, relation.range
        ));
    }
    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": {
            "subject_id": subject_id,
            "tab": tab,
            "relations": selected,
            "relation_tabs": set.relation_tabs().collect::<Vec<_>>(),
            "predicate_tabs": set.predicate_tabs().collect::<Vec<_>>()
        }
    }))
}

fn timeline_layout(state: &AppState, args: &JsonValue) -> Result<JsonValue> {
    let span_id = SpanId::new(required_str(args, "span_id")?);
    let related_ids: Vec<SpanId> = optional(args, "related_ids")?.unwrap_or_default();
    if related_ids.len() > MAX_RELATED_IDS {
        anyhow::bail!("related_ids exceeds max allowed count ({MAX_RELATED_IDS})");
    }
    let width: f64 = optional(args, "width")?.unwrap_or(DEFAULT_VIEWPORT_WIDTH);
    if !(width > 0.0 && width <= MAX_VIEWPORT_WIDTH) {
        anyhow::bail!("width must be in (0, {MAX_VIEWPORT_WIDTH}]");
    }
    let now = match args.get("now").and_then(JsonValue::as_str) {
        Some(s) => FractionalDate::from_naive(
            NaiveDate::parse_from_str(s, "%Y-%m-%d").context("now must be YYYY-MM-DD")?,
        ),
        None => FractionalDate::today(),
    };
    let relative: bool = optional(args, "relative_axis")?.unwrap_or(false);
    let policy: BoundaryPolicy = optional(args, "policy")?.unwrap_or_default();
    let session: LayoutSession = optional(args, "session")?.unwrap_or_default();
    let config: LayoutConfig = optional(args, "config")?.unwrap_or(state.config);

    let assembler = TimelineAssembler::new(&state.store).with_options(AggregateOptions { policy });
    let assembly = state
        .runtime
        .block_on(assembler.assemble(&span_id, &related_ids))?;

    let view = |timeline: &Timeline| {
        let mut session = session.clone();
        if relative {
            session.axis = timeline.relative_axis().unwrap_or_default();
        }
        let frame = timeline.frame(width, now).unwrap_or_else(|| {
            // Nothing dated: centre a one-year window on now.
            let at = now.to_fractional(FractionMode::Start);
            Frame {
                viewport: Viewport::new(0.0, width),
                visible: VisibleRange::new(at - 0.5, at + 0.5),
                now,
            }
        });
        let layout = timeline.layout(&session, &frame, &config);
        json!({
            "span_id": timeline.subject.id,
            "name": timeline.subject.name,
            "ticks": layout.ticks(MAX_TICKS),
            "layout": layout
        })
    };

    let subject = view(&assembly.subject);
    let related: Vec<JsonValue> = assembly.related.iter().map(view).collect();
    let lanes = subject
        .get("layout")
        .and_then(|l| l.get("lane_count"))
        .and_then(JsonValue::as_u64)
        .unwrap_or(0);
    Ok(json!({
        "content": [{
            "type": "text",
            "text": format!(
                "{} lane(s) for {}, {} related timeline(s), {} failed",
                lanes,
                assembly.subject.subject.name,
                related.len(),
                assembly.failures.len()
            )
        }],
        "structuredContent": {
            "subject": subject,
            "related": related,
            "failures": assembly.failures
        }
    }))
}

fn required_str<'a>(args: &'a JsonValue, key: &str) -> Result<&'a str> {
    let value = args
        .get(key)
        .and_then(JsonValue::as_str)
        .with_context(|| format!("{key} is required"))?;
    check_len(key, value, MAX_ID_BYTES)?;
    Ok(value)
}

fn optional<T: DeserializeOwned>(args: &JsonValue, key: &str) -> Result<Option<T>> {
    match args.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .with_context(|| format!("invalid {key}")),
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        anyhow::bail!("{field} exceeds max allowed size ({max} bytes)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn temp_state() -> AppState {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().to_string();
        AppState::with_store(SpanStore::open(&path).unwrap()).unwrap()
    }

    fn call(state: &AppState, name: &str, arguments: JsonValue) -> Result<JsonValue> {
        call_tool(state, Some(&json!({ "name": name, "arguments": arguments })))
    }

    fn seed(state: &AppState) {
        call(
            state,
            "put_span",
            json!({ "id": "ada", "name": "Ada", "kind": "person",
                    "dates": { "start_year": 1990, "start_month": 1, "start_day": 1 } }),
        )
        .unwrap();
        call(state, "put_span", json!({ "id": "leeds", "name": "Leeds", "kind": "place" })).unwrap();
        call(
            state,
            "put_span",
            json!({ "id": "acme", "name": "Acme", "kind": "organisation",
                    "dates": { "start_year": 1950 } }),
        )
        .unwrap();
        call(
            state,
            "connect",
            json!({ "id": "home", "connection_type": "residence", "parent": "ada",
                    "child": "leeds", "forward_predicate": "lived in",
                    "dates": { "start_year": 1995, "end_year": 1998 } }),
        )
        .unwrap();
        call(
            state,
            "connect",
            json!({ "id": "job", "connection_type": "employment", "parent": "ada",
                    "child": "acme", "forward_predicate": "worked at",
                    "inverse_predicate": "employed",
                    "dates": { "start_year": 1997, "start_month": 3, "start_day": 1,
                               "end_year": 2000, "end_month": 7, "end_day": 15 } }),
        )
        .unwrap();
    }

    fn structured(out: &JsonValue) -> &JsonValue {
        out.get("structuredContent").unwrap()
    }

    #[test]
    fn relations_classify_connections() {
        let state = temp_state();
        seed(&state);
        let out = call(&state, "temporal_relations", json!({ "span_id": "ada" })).unwrap();
        let relations = structured(&out)["relations"].as_array().unwrap();
        assert_eq!(relations.len(), 2);
        assert_eq!(relations[0]["connection_id"], "home");
        assert_eq!(relations[0]["display"], "during");
        assert_eq!(relations[1]["display"], "during");

        let tabs = structured(&out)["predicate_tabs"].as_array().unwrap();
        assert_eq!(tabs, &vec![json!("lived in"), json!("worked at")]);
    }

    #[test]
    fn relations_of_a_connection_cover_its_phases() {
        let state = temp_state();
        seed(&state);
        call(
            &state,
            "connect",
            json!({ "id": "job-lead", "connection_type": "role", "parent": "ada",
                    "child": "acme", "forward_predicate": "led a team at", "phase_of": "job",
                    "dates": { "start_year": 1998, "end_year": 1999 } }),
        )
        .unwrap();

        let out = call(&state, "temporal_relations", json!({ "connection_id": "job" })).unwrap();
        assert_eq!(structured(&out)["subject_id"], "job");
        let relations = structured(&out)["relations"].as_array().unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0]["connection_id"], "job-lead");
        assert_eq!(relations[0]["raw"], "during");
        assert_eq!(relations[0]["display"], "contains");

        // Seen from the person the same phase is plain "during".
        let out = call(&state, "temporal_relations", json!({ "span_id": "ada" })).unwrap();
        let lead = structured(&out)["relations"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["connection_id"] == "job-lead")
            .cloned()
            .unwrap();
        assert_eq!(lead["display"], "during");
    }

    #[test]
    fn relations_can_select_a_tab() {
        let state = temp_state();
        seed(&state);
        let out = call(
            &state,
            "temporal_relations",
            json!({ "span_id": "ada", "tab": { "tab": "predicate", "value": "worked at" } }),
        )
        .unwrap();
        let relations = structured(&out)["relations"].as_array().unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0]["related"]["name"], "Acme");
    }

    #[test]
    fn layout_puts_life_then_connections() {
        let state = temp_state();
        seed(&state);
        let out = call(
            &state,
            "timeline_layout",
            json!({ "span_id": "ada", "now": "2026-10-18", "width": 1000 }),
        )
        .unwrap();
        let bars = structured(&out)["subject"]["layout"]["bars"].as_array().unwrap();
        let lane = |id: &str| {
            bars.iter()
                .find(|b| b["swimlane_id"] == id)
                .and_then(|b| b["lane"].as_u64())
        };
        assert_eq!(lane("ada"), Some(0));
        assert_eq!(lane("home"), Some(1));
        assert_eq!(lane("job"), Some(2));
        assert!(!structured(&out)["subject"]["ticks"].as_array().unwrap().is_empty());
    }

    #[test]
    fn layout_reports_failed_related_fetches() {
        let state = temp_state();
        seed(&state);
        let out = call(
            &state,
            "timeline_layout",
            json!({ "span_id": "ada", "related_ids": ["acme", "ghost"], "now": "2026-10-18" }),
        )
        .unwrap();
        let related = structured(&out)["related"].as_array().unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0]["span_id"], "acme");
        let failures = structured(&out)["failures"].as_array().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0]["id"], "ghost");
    }

    #[test]
    fn layout_for_missing_subject_is_a_tool_error() {
        let state = temp_state();
        let resp = handle_request(
            &state,
            &json!({
                "jsonrpc": "2.0", "id": 7, "method": "tools/call",
                "params": { "name": "timeline_layout", "arguments": { "span_id": "ghost" } }
            }),
        )
        .unwrap();
        assert_eq!(resp["result"]["isError"], true);
        assert!(resp["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("not found"));
    }

    #[test]
    fn layout_rejects_bad_now() {
        let state = temp_state();
        seed(&state);
        let err = call(&state, "timeline_layout", json!({ "span_id": "ada", "now": "soon" }))
            .expect_err("bad date must fail");
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn put_span_rejects_oversized_id() {
        let state = temp_state();
        let err = call(
            &state,
            "put_span",
            json!({ "id": "x".repeat(MAX_ID_BYTES + 1), "name": "X", "kind": "thing" }),
        )
        .expect_err("oversized id must fail");
        assert!(err.to_string().contains("id exceeds max"));
    }

    #[test]
    fn put_span_rejects_inverted_dates() {
        let state = temp_state();
        let err = call(
            &state,
            "put_span",
            json!({ "id": "x", "name": "X", "kind": "event",
                    "dates": { "start_year": 2005, "end_year": 2001 } }),
        )
        .expect_err("inverted range must fail");
        assert!(err.to_string().contains("invalid range"));
    }

    #[test]
    fn connect_requires_existing_endpoints() {
        let state = temp_state();
        seed(&state);
        let err = call(
            &state,
            "connect",
            json!({ "id": "c", "connection_type": "friendship", "parent": "ada",
                    "child": "nobody", "forward_predicate": "knows" }),
        )
        .expect_err("unknown endpoint must fail");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn read_message_rejects_oversized_frame() {
        let raw = format!("Content-Length: {}\r\n\r\n", MAX_MESSAGE_BYTES + 1);
        let mut cursor = Cursor::new(raw.into_bytes());
        let err = read_message(&mut cursor).expect_err("oversized frame must fail");
        assert!(err.to_string().contains("exceeds max allowed"));
    }

    #[test]
    fn unknown_method_is_reported() {
        let state = temp_state();
        let resp = handle_request(
            &state,
            &json!({ "jsonrpc": "2.0", "id": 1, "method": "resources/list" }),
        )
        .unwrap();
        assert_eq!(resp["error"]["code"], -32601);
    }
}
