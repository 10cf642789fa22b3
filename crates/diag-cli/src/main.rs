use std::io::Read;
use std::process::ExitCode;

use diag_engine::{DiagonalizationEngine, EngineConfig};
use diag_io::{handle_request, load_config};
use log::debug;

fn usage() {
    eprintln!("usage: diag-cli diagonalize [--config <engine.json>] <request.json | ->");
    eprintln!("       diag-cli print-config");
}

fn read_body(source: &str) -> std::io::Result<Vec<u8>> {
    if source == "-" {
        let mut body = Vec::new();
        std::io::stdin().read_to_end(&mut body)?;
        Ok(body)
    } else {
        std::fs::read(source)
    }
}

fn print_json(value: &impl serde::Serialize) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("serialization error: {err}");
            ExitCode::from(1)
        }
    }
}

fn diagonalize(args: &[String]) -> ExitCode {
    let (config, source) = match args {
        [source] => (EngineConfig::default(), source),
        [flag, path, source] if flag == "--config" => match load_config(path) {
            Ok(config) => {
                debug!("engine config loaded from {path}");
                (config, source)
            }
            Err(err) => {
                eprintln!("config error ({path}): {err}");
                return ExitCode::from(1);
            }
        },
        _ => {
            usage();
            return ExitCode::from(2);
        }
    };

    let body = match read_body(source) {
        Ok(body) => body,
        Err(err) => {
            eprintln!("read error ({source}): {err}");
            return ExitCode::from(1);
        }
    };

    let engine = DiagonalizationEngine::new(config);
    let response = handle_request(&body, &engine);
    let printed = print_json(&response.body);
    if response.is_success() {
        printed
    } else {
        eprintln!("status: {}", response.status);
        ExitCode::from(1)
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("diagonalize") => diagonalize(&args[2..]),
        Some("print-config") if args.len() == 2 => print_json(&EngineConfig::default()),
        _ => {
            usage();
            ExitCode::from(2)
        }
    }
}
