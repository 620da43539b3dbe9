//! Walk-through of the exterr API, logged through `tracing`.
//!
//! Run with `RUST_LOG=debug cargo run -p exterr-demo` to also see the
//! library's own debug events.

use exterr::policy::TracingPolicy;
use exterr::{ErrorPolicy, ExtError, PrettyDebug, ResultExt, add_trace, ext_err};
use tracing::info;

const INTERNAL_ERROR_TYPE: i64 = 1;

/// Install a basic tracing subscriber if none is set yet. Honors RUST_LOG-like env filters.
fn init_tracing_once() -> bool {
    use tracing_subscriber::{EnvFilter, fmt};
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .is_ok()
}

// is simple to create
fn new() -> ExtError {
    ExtError::new("i am an extended error")
}

// can have an alternative message
fn new_with_alt() -> ExtError {
    ExtError::with_alt("this is main message", "this is alt message")
}

// can have a type identifier and be handled differently
fn new_with_type() -> ExtError {
    ExtError::with_type("sql no rows", "user not found", INTERNAL_ERROR_TYPE)
}

// can be used like a standard error
fn like_err() -> Result<(), Box<dyn std::error::Error>> {
    Err(Box::new(ExtError::new("can be used like standard error")))
}

// if the error is just passed up you can add trace manually
fn add_trace_example() -> ExtError {
    f1().add_trace()
}

fn f1() -> ExtError {
    add_trace!(f2())
}

fn f2() -> ExtError {
    f3().add_trace()
}

fn f3() -> ExtError {
    ext_err!("trace me")
}

fn read_config() -> Result<String, ExtError> {
    use exterr::IntoExtError;
    std::fs::read_to_string("/definitely/not/here.toml").ext_context("read config")
}

fn main() {
    init_tracing_once();

    info!(error = %new(), "plain");

    let alt = new_with_alt();
    info!(error = %alt, alt = %alt.alt_message(), "with alt");

    let typed = new_with_type();
    if typed.code() == INTERNAL_ERROR_TYPE {
        info!(alt = %typed.alt_message(), front = %typed.front_json(), "typed");
    }

    if let Err(e) = like_err() {
        info!(error = %e, "as std error");
    }

    let traced = add_trace_example();
    info!(error = %traced, trace = %traced.trace_tagged(), "add trace");

    let wrapped = ExtError::new("wrapping err").wrap(ExtError::new("wrap me!"));
    info!(error = %wrapped, trace = %wrapped.trace_tagged(), "wrap");

    info!(json = %traced.trace_json(), "flat json");
    info!(json = %traced.trace_nested_json(), "nested json");

    let (code, payload) = typed.response();
    info!(code, payload = %payload.to_json(), "response");

    let _ = read_config().prefix_err("startup").emit_error(&TracingPolicy);

    if let Some(pretty) = wrapped.pretty_json() {
        println!("{pretty}");
    }
    TracingPolicy.emit(&wrapped);
}
