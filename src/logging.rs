//! Structured logging for the storefront core.
//!
//! Every record is one JSON line with a run id, a process-wide sequence
//! number and a domain tag, so a session can be filtered and replayed:
//! 1. Multi-level granularity (TRACE → FATAL)
//! 2. Domain categories for filtering (`LOG_DOMAINS`)
//! 3. Optional file sink per run (`LOG_DIR`), stdout otherwise

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            Ok("fatal") => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Catalog, // Filtering, sorting, paging
    Journey, // Event log and journey graphs
    Store,   // Key-value persistence
    Cart,    // Cart, wishlist, checkout
    Admin,   // Dashboard metrics, filter configuration
    Session, // Login/logout
    System,  // Startup, seeding, reset
    Profile, // Timing scopes
    Audit,   // Digests of persisted state
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Catalog => "catalog",
            Domain::Journey => "journey",
            Domain::Store => "store",
            Domain::Cart => "cart",
            Domain::Admin => "admin",
            Domain::Session => "session",
            Domain::System => "system",
            Domain::Profile => "profile",
            Domain::Audit => "audit",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS is a comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    events: Option<Mutex<BufWriter<File>>>,
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let events = std::env::var("LOG_DIR").ok().and_then(|base| {
            let mut run_dir = PathBuf::from(base);
            run_dir.push(&run_id);
            if let Err(err) = create_dir_all(&run_dir) {
                eprintln!("[log] failed to create run dir: {}", err);
                return None;
            }
            match File::create(run_dir.join("events.jsonl")) {
                Ok(file) => Some(Mutex::new(BufWriter::new(file))),
                Err(err) => {
                    eprintln!("[log] failed to create events log: {}", err);
                    None
                }
            }
        });
        RunContext { run_id, events }
    })
}

fn split_fields(mut fields: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut top = Map::new();
    for key in ["user_id", "product_id", "order_id", "msg"] {
        if let Some(value) = fields.remove(key) {
            top.insert(key.to_string(), value);
        }
    }
    (top, fields)
}

fn write_line(writer: &Mutex<BufWriter<File>>, line: &str) {
    if let Ok(mut w) = writer.lock() {
        let _ = writeln!(w, "{}", line);
        let _ = w.flush();
    }
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Epoch milliseconds, the unit of every stored timestamp
pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    let min_level = Level::from_env();
    if level < min_level || !domain.is_enabled() {
        return;
    }
    emit_record(level, domain.as_str(), event, fields);
}

fn emit_record(level: Level, component: &str, event: &str, fields: Map<String, Value>) {
    let ctx = ensure_run_context();
    let (mut top, data) = split_fields(fields);

    let msg = top.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(ctx.run_id.clone()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    for (k, v) in top {
        entry.insert(k, v);
    }
    entry.insert("data".to_string(), Value::Object(data));

    let line = Value::Object(entry).to_string();
    match &ctx.events {
        Some(writer) => write_line(writer, &line),
        None => println!("{}", line),
    }
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_view_derived(input: usize, output: usize, sort: &str, category: &str) {
    log(
        Level::Debug,
        Domain::Catalog,
        "view_derived",
        obj(&[
            ("input", json!(input)),
            ("output", json!(output)),
            ("sort", v_str(sort)),
            ("category", v_str(category)),
        ]),
    );
}

pub fn log_page_advanced(visible: usize, total: usize) {
    log(
        Level::Trace,
        Domain::Catalog,
        "page_advanced",
        obj(&[("visible", json!(visible)), ("total", json!(total))]),
    );
}

pub fn log_event_recorded(user_id: &str, event_type: &str, ts: u64, log_len: usize) {
    log(
        Level::Debug,
        Domain::Journey,
        "event_recorded",
        obj(&[
            ("user_id", v_str(user_id)),
            ("event_type", v_str(event_type)),
            ("event_ts", json!(ts)),
            ("log_len", json!(log_len)),
        ]),
    );
}

pub fn log_journey(user_id: &str, nodes: usize, edges: usize) {
    log(
        Level::Debug,
        Domain::Journey,
        "journey_built",
        obj(&[
            ("user_id", v_str(user_id)),
            ("nodes", json!(nodes)),
            ("edges", json!(edges)),
        ]),
    );
}

pub fn log_store_write(key: &str, bytes: usize) {
    log(
        Level::Trace,
        Domain::Store,
        "put",
        obj(&[("key", v_str(key)), ("bytes", json!(bytes))]),
    );
}

pub fn log_checkout(user_id: &str, order_id: &str, items: usize, total: f64) {
    log(
        Level::Info,
        Domain::Cart,
        "checkout",
        obj(&[
            ("user_id", v_str(user_id)),
            ("order_id", v_str(order_id)),
            ("items", json!(items)),
            ("total", v_num(total)),
        ]),
    );
}

/// Log a digest of persisted state for later comparison
pub fn log_audit(subject: &str, digest: &str, count: usize) {
    log(
        Level::Info,
        Domain::Audit,
        subject,
        obj(&[("digest", v_str(digest)), ("count", json!(count))]),
    );
}

// =============================================================================
// Utility Functions
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Profiling scope that emits structured timing on drop.
pub struct ProfileScope {
    label: &'static str,
    context: Option<Map<String, Value>>,
    started: Instant,
}

impl ProfileScope {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            context: None,
            started: Instant::now(),
        }
    }

    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        Self {
            label,
            context: Some(obj(fields)),
            started: Instant::now(),
        }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = self.context.take().unwrap_or_default();
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_obj_helper() {
        let m = obj(&[("key", v_str("value")), ("num", v_num(42.0))]);
        assert_eq!(m.get("key").unwrap(), "value");
        assert_eq!(m.get("num").unwrap(), 42.0);
    }

    #[test]
    fn test_split_fields_lifts_ids() {
        let fields = obj(&[("user_id", v_str("u-1")), ("nodes", json!(3))]);
        let (top, data) = split_fields(fields);
        assert_eq!(top.get("user_id").unwrap(), "u-1");
        assert!(data.contains_key("nodes"));
        assert!(!data.contains_key("user_id"));
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }
}
