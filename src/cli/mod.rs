mod daemon;
mod seed;

use anyhow::{Result, anyhow};

fn print_help() {
    println!("scholarhunt - autonomous scholarship hunting agent\n");
    println!("Commands:");
    println!("  serve    Start the agent daemon and dashboard API (default)");
    println!("  seed     Load sample scholarships into the store");
    println!("  help     Show this message\n");
    println!("Flags for serve:");
    println!("  --api-host <host>   Bind address (default from config)");
    println!("  --api-port <port>   Bind port (default from config)\n");
    println!("Usage: scholarhunt <command> [flags]");
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("serve");

    match command {
        "serve" => {
            let (host, port) = parse_api_server_flags(&args, 2);
            daemon::run(host, port).await
        }
        "seed" => seed::run().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        other => {
            print_help();
            Err(anyhow!("unknown command: {}", other))
        }
    }
}

pub(crate) fn parse_api_server_flags(args: &[String], start: usize) -> (Option<String>, Option<u16>) {
    let mut api_host = None;
    let mut api_port = None;
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--api-host" => {
                if i + 1 < args.len() {
                    api_host = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--api-port" => {
                if i + 1 < args.len() {
                    api_port = args[i + 1].parse().ok();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    (api_host, api_port)
}
