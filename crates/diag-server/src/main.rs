use std::env;
use std::path::PathBuf;

use diag_server::{ServerConfig, run};

fn value_of(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i + 1) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {flag} requires a value");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = ServerConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--host" => {
                config.host = value_of(&args, i, "--host");
                i += 2;
            }
            "--port" => {
                config.port = value_of(&args, i, "--port").parse().unwrap_or_else(|_| {
                    eprintln!("Error: Invalid port number");
                    std::process::exit(1);
                });
                i += 2;
            }
            "--timeout" => {
                config.request_timeout_secs =
                    value_of(&args, i, "--timeout").parse().unwrap_or_else(|_| {
                        eprintln!("Error: Invalid timeout");
                        std::process::exit(1);
                    });
                i += 2;
            }
            "--config" => {
                config.engine_config_path = Some(PathBuf::from(value_of(&args, i, "--config")));
                i += 2;
            }
            "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Error: Unknown argument '{}'", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    run(config).await
}

fn print_help() {
    println!("Matrix diagonalization server");
    println!("Usage: diag-server [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --host <HOST>       Server host address (default: 127.0.0.1)");
    println!("  --port <PORT>       Server port (default: 5000)");
    println!("  --timeout <SECS>    Per-request computation timeout (default: 10)");
    println!("  --config <FILE>     Engine configuration JSON (default: built-in)");
    println!("  --help              Show this help message");
    println!();
    println!("Endpoint: POST http://<host>:<port>/api/diagonalize");
    println!("Health check: http://<host>:<port>/health");
}
