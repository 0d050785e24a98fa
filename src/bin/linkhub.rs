use linkhub::HubInstance;
use linkhub::codec::decode_collection;
use linkhub::config::{DEFAULT_ADMIN_PASSWORD, HubConfig};
use linkhub::http::build_router;
use linkhub::record::{Event, Link, StoredRecord};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return Err("missing command".into());
    }
    match args[1].as_str() {
        "serve" => cmd_serve(&args[2..]),
        "check" => cmd_check(&args[2..]),
        other => {
            print_usage();
            Err(format!("unknown command: {other}"))
        }
    }
}

fn print_usage() {
    eprintln!("usage: linkhub <command>");
    eprintln!("  serve [--data DIR] [--port PORT]   run the HTTP server");
    eprintln!("  check [--data DIR]                 strict-decode the stored collections");
    eprintln!();
    eprintln!("env: DATA_DIR, PORT, ADMIN_PASSWORD, SESSION_TTL_SECS,");
    eprintln!("     SMTP_HOST, SMTP_USER, SMTP_PASS, SMTP_PORT, SMTP_FROM, BOOKING_EMAIL");
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn data_dir(args: &[String]) -> PathBuf {
    parse_flag_value(args, "--data")
        .or_else(|| env::var("DATA_DIR").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn config_from_env() -> HubConfig {
    let password = env::var("ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());
    HubConfig {
        admin_password: Arc::new(Zeroizing::new(password)),
        session_ttl_secs: env_u64("SESSION_TTL_SECS", 2 * 60 * 60),
        ..HubConfig::default()
    }
}

fn cmd_serve(args: &[String]) -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = data_dir(args);
    let port = parse_flag_value(args, "--port")
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or_else(|| env_u64("PORT", 3000) as u16);
    let config = config_from_env();

    let runtime = tokio::runtime::Runtime::new().map_err(|e| format!("runtime failed: {e}"))?;
    runtime.block_on(async move {
        let hub = Arc::new(HubInstance::open(config, &dir).map_err(|e| e.to_string())?);
        let router = build_router(hub);
        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(|e| format!("bind failed: {e}"))?;
        info!(port, "linkhub listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .map_err(|e| format!("server failed: {e}"))
    })
}

fn cmd_check(args: &[String]) -> Result<(), String> {
    let dir = data_dir(args);
    check_collection::<Link>(&dir, "links.json")?;
    check_collection::<Event>(&dir, "events.json")?;
    Ok(())
}

/// Strict decode: any unreadable file fails the check even though the
/// serving path would recover. Also verifies the id invariants.
fn check_collection<R: StoredRecord>(dir: &Path, file_name: &str) -> Result<(), String> {
    let path = dir.join(file_name);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            println!("{file_name}: absent (0 records)");
            return Ok(());
        }
        Err(err) => return Err(format!("read {}: {err}", path.display())),
    };
    let records: Vec<R> =
        decode_collection(&bytes).map_err(|e| format!("{file_name}: {e}"))?;

    let mut seen = HashSet::new();
    for record in &records {
        let id = record.record_id();
        if id == 0 {
            return Err(format!("{file_name}: record with id 0"));
        }
        if !seen.insert(id) {
            return Err(format!("{file_name}: duplicate id {id}"));
        }
    }
    println!("{file_name}: {} records, ids unique", records.len());
    Ok(())
}
