//! GSX Language Server binary.
//!
//! Usage:
//!   gsx-lsp \[options\]
//!
//! Options:
//!   --stdio              Use stdio for communication (default, and only transport)
//!   --host-server <path>  Override PATH lookup for the host-language server
//!   --log <path>          Write a debug log to <path> (see GSX_LSP_DEBUG_LOG)
//!   --version             Show version information
//!   --help                Show this help message

use std::env;
use std::process::ExitCode;

use gsx_lsp::{util::debug_log, LspServer, ServerOptions};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    let mut options = ServerOptions::default();
    let mut log_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stdio" => {}
            "--host-server" => {
                if i + 1 < args.len() {
                    options.host_server = Some(args[i + 1].clone());
                    i += 1;
                } else {
                    eprintln!("--host-server requires a path argument");
                    return ExitCode::FAILURE;
                }
            }
            "--log" => {
                if i + 1 < args.len() {
                    log_path = Some(args[i + 1].clone());
                    i += 1;
                } else {
                    eprintln!("--log requires a path argument");
                    return ExitCode::FAILURE;
                }
            }
            "--version" => {
                println!("gsx-lsp {}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            "--help" | "-h" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_help();
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    match log_path {
        Some(path) => debug_log::init_at(Some(path.into())),
        None => debug_log::init(),
    }

    let mut server = LspServer::new(options);
    if let Err(e) = server.run() {
        eprintln!("gsx-lsp: transport error: {e}");
        return ExitCode::FAILURE;
    }

    if server.shutdown_received() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_help() {
    println!("GSX Language Server");
    println!();
    println!("Usage: gsx-lsp [options]");
    println!();
    println!("Options:");
    println!("  --stdio                Use stdio for communication (default, and only transport)");
    println!("  --host-server <path>   Override PATH lookup for the host-language server");
    println!("  --log <path>           Write a debug log to <path> (see GSX_LSP_DEBUG_LOG)");
    println!("  --version              Show version information");
    println!("  --help                 Show this help message");
}
