//! finview-runner: headless host for the finview query layer.
//!
//! Usage:
//!   finview-runner --service accounts --data-dir ./data/seed
//!   finview-runner --service all --ipc-mode < requests.jsonl
//!
//! In IPC mode each stdin line is one JSON message, either
//!   {"headers": {"X-User-ID": "user-001"}, "request": {"op": "list_accounts"}}
//! or
//!   {"admin": {"cmd": "set_flag", "flag": "mask_amounts", "enabled": true}}
//! and each reply is one stdout line: {"status": 200, "body": ...}.

use anyhow::Result;
use finview_core::{
    access::RequestHeaders,
    app::App,
    config::ServiceConfig,
    error::{QueryError, QueryResult},
    request::{AdminCommand, Reply, Request},
};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::{self, BufRead, Write};
use uuid::Uuid;

#[derive(Deserialize)]
#[serde(untagged)]
enum IpcMessage {
    Admin {
        admin: AdminCommand,
    },
    Query {
        #[serde(default)]
        headers: RequestHeaders,
        request: Request,
    },
}

#[derive(Serialize)]
struct IpcResponse {
    status: u16,
    body:   serde_json::Value,
}

impl IpcResponse {
    fn from_result(result: QueryResult<Reply>) -> Self {
        match result.and_then(|reply| {
            serde_json::to_value(&reply).map_err(|e| QueryError::Internal(e.to_string()))
        }) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::error(&e),
        }
    }

    fn error(e: &QueryError) -> Self {
        Self {
            status: e.status_code(),
            body: serde_json::json!({ "error": e.code(), "message": e.public_message() }),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config = ServiceConfig::from_env()?.with_args(&args)?;

    if !ipc_mode {
        println!("finview-runner");
        println!("  service:   {}", config.service);
        println!("  data_dir:  {}", config.data_dir.display());
        println!();
    }

    let app = App::build(&config)?;

    if ipc_mode {
        run_ipc_loop(&app)?;
    } else {
        print_summary(&app)?;
    }

    Ok(())
}

fn run_ipc_loop(app: &App) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request_id = Uuid::new_v4();
        let response = match serde_json::from_str::<IpcMessage>(&buffer) {
            Ok(message) => handle_message(app, message, &request_id),
            Err(e) => {
                log::warn!("Malformed request: request_id={request_id} {e}");
                IpcResponse::error(&QueryError::invalid("request", e.to_string()))
            }
        };

        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_message(app: &App, message: IpcMessage, request_id: &Uuid) -> IpcResponse {
    let response = match &message {
        IpcMessage::Admin { admin } => {
            log::info!("Admin command: request_id={request_id} {admin:?}");
            IpcResponse::from_result(app.admin(admin))
        }
        IpcMessage::Query { headers, request } => {
            log::debug!("Request: request_id={request_id} op={}", request.op_name());
            IpcResponse::from_result(app.handle(headers, request))
        }
    };
    log::debug!("Response: request_id={request_id} status={}", response.status);
    response
}

fn print_summary(app: &App) -> Result<()> {
    let counts = app.store().counts()?;
    let flags = app.flags().snapshot()?;

    println!("=== LOAD SUMMARY ===");
    println!("  users:          {}", counts.users);
    println!("  accounts:       {}", counts.accounts);
    println!("  transactions:   {}", counts.transactions);
    println!("  insights:       {}", counts.insights);
    println!("  alerts:         {}", counts.alerts);

    println!();
    println!("=== FEATURE FLAGS ===");
    for (flag, enabled) in flags.effective() {
        println!("  {:<20} {}", flag.as_str(), if enabled { "on" } else { "off" });
    }
    Ok(())
}
