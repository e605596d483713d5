//! proxy-check - run a single HTTP call-and-assert step against a local port.

use anyhow::{anyhow, Result};
use clap::Parser;
use proxy_driver::{load_call, ExecutionContext, HttpCall, Step};
use std::path::PathBuf;
use std::process::exit;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Issue one request to 127.0.0.1 and assert on status, body and headers.
#[derive(Parser, Debug)]
#[command(name = "proxy-check", version, about)]
struct Cli {
    /// YAML file describing the call. Flags below override its fields.
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Target port on 127.0.0.1.
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,

    /// HTTP method.
    #[arg(short = 'X', long = "method")]
    method: Option<String>,

    /// Expected response body.
    #[arg(short = 'b', long = "body")]
    body: Option<String>,

    /// Request header as `name:value`. Repeatable.
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Expected response header as `name:value`, where value may be `*`
    /// (any) or `-` (absent). Repeatable.
    #[arg(short = 'e', long = "expect-header")]
    expect_headers: Vec<String>,

    /// Timeout in milliseconds.
    #[arg(short = 't', long = "timeout-ms", env = "PROXY_CHECK_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Enable verbose logging.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    if std::env::var_os("RUST_LOG").is_none() {
        let level = if verbose { "debug" } else { "info" };
        std::env::set_var("RUST_LOG", level);
    }

    if tracing::dispatcher::has_been_set() {
        return;
    }

    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_level(true)
        .try_init();
}

fn split_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("header must be name:value, got {raw:?}"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn build_call(args: Cli) -> Result<HttpCall> {
    let mut call = match (&args.file, args.port) {
        (Some(path), _) => load_call(path)?,
        (None, Some(port)) => HttpCall::new("GET", port),
        (None, None) => return Err(anyhow!("either --file or --port is required")),
    };

    if let Some(port) = args.port {
        call.port = port;
    }
    if let Some(method) = args.method {
        call.method = method;
    }
    if let Some(body) = args.body {
        call.body = body;
    }
    for raw in &args.headers {
        let (name, value) = split_header(raw)?;
        call.request_headers.insert(name, value);
    }
    for raw in &args.expect_headers {
        let (name, value) = split_header(raw)?;
        call.response_headers.insert(name, value);
    }
    if let Some(ms) = args.timeout_ms {
        call.timeout = Some(Duration::from_millis(ms));
    }

    Ok(call)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let mut call = build_call(args)?;
    let mut ctx = ExecutionContext::new();

    let start = Instant::now();
    let outcome = call.run(&mut ctx).await;
    call.cleanup().await;
    let elapsed = start.elapsed().as_millis();

    match outcome {
        Ok(()) => {
            info!("\x1b[32mPASS\x1b[0m {} :{} ({} ms)", call.method, call.port, elapsed);
            Ok(())
        }
        Err(e) => {
            let kind = if e.is_assertion() { "assertion" } else { "error" };
            error!(
                "\x1b[31mFAIL\x1b[0m {} :{} ({} ms) {}: {}",
                call.method, call.port, elapsed, kind, e
            );
            exit(1);
        }
    }
}
