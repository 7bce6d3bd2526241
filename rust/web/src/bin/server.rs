//! Standalone room server binary
//!
//! Usage: cargo run -p jokerdraw_web --bin jokerdraw-web-server

use jokerdraw_web::{ServerConfig, WebServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    jokerdraw_web::init_logging();

    let args: Vec<String> = std::env::args().collect();
    let mut host = "127.0.0.1".to_string();
    let mut port = 8080u16;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--host" | "-h" => {
                if i + 1 < args.len() {
                    host = args[i + 1].clone();
                    i += 2;
                } else {
                    eprintln!("Error: --host requires a value");
                    std::process::exit(1);
                }
            }
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    port = args[i + 1].parse().unwrap_or_else(|_| {
                        eprintln!("Error: invalid port number");
                        std::process::exit(1);
                    });
                    i += 2;
                } else {
                    eprintln!("Error: --port requires a value");
                    std::process::exit(1);
                }
            }
            "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    let config = ServerConfig::new(host, port);
    let server = WebServer::new(config);
    let handle = server.start().await?;

    tracing::info!(address = %handle.address(), "jokerdraw room server running");
    println!("Server running at http://{}", handle.address());
    println!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    tracing::info!("shutting down");
    handle.shutdown().await?;
    tracing::info!("server stopped cleanly");

    Ok(())
}

fn print_help() {
    println!("jokerdraw room server");
    println!();
    println!("Usage: jokerdraw-web-server [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --host, -h <HOST>   Host to bind to (default: 127.0.0.1)");
    println!("  --port, -p <PORT>   Port to bind to (default: 8080)");
    println!("  --help              Show this help message");
}
