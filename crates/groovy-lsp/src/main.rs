use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use groovy_core::diagnostic::Severity;
use groovy_lsp::Backend;
use tower_lsp_server::{LspService, Server};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "groovy-lsp", version, about = "Language Server for Groovy")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the language server.
    Serve {
        #[command(subcommand)]
        transport: Option<Transport>,
    },
    /// Invoke a registered workspace command outside of a running session.
    Execute { command: String, args: Vec<String> },
    /// Compile each file as a standalone context and print its diagnostics.
    Check { files: Vec<PathBuf> },
    /// Print version information.
    Version,
}

#[derive(Subcommand)]
enum Transport {
    Stdio,
    Socket { port: u16 },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve { transport: None }) {
        Command::Serve { transport } => {
            serve(transport.unwrap_or(Transport::Stdio)).await;
            ExitCode::SUCCESS
        }
        Command::Execute { command, args } => execute(&command, &args),
        Command::Check { files } => check(&files).await,
        Command::Version => {
            println!("groovy-lsp {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
    }
}

/// Logging is file-based when a home directory log file can be opened for
/// append, so stdout stays free for protocol traffic under `serve`; falls
/// back to stderr otherwise.
fn init_logging() {
    let log_file = dirs::home_dir().map(|h| h.join(".groovy-lsp.log")).and_then(|path| OpenOptions::new().create(true).append(true).open(&path).ok());

    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(file) = log_file {
        tracing_subscriber::fmt().with_env_filter(filter()).with_writer(file).with_ansi(false).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter()).with_writer(std::io::stderr).init();
    }
}

async fn serve(transport: Transport) {
    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    match transport {
        Transport::Stdio => {
            let stdin = tokio::io::stdin();
            let stdout = tokio::io::stdout();
            let (service, socket) = LspService::new(|client| Backend::new(client, root.clone()));
            Server::new(stdin, stdout, socket).serve(service).await;
        }
        Transport::Socket { port } => {
            let listener = match tokio::net::TcpListener::bind(("127.0.0.1", port)).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!(port, error = %err, "failed to bind socket transport");
                    return;
                }
            };
            let Ok((stream, _)) = listener.accept().await else {
                tracing::error!(port, "failed to accept socket connection");
                return;
            };
            let (read, write) = tokio::io::split(stream);
            let (service, socket) = LspService::new(|client| Backend::new(client, root.clone()));
            Server::new(read, write, socket).serve(service).await;
        }
    }
}

/// No `workspace/executeCommand` commands are registered by this engine
/// (spec.md §7 "no fabricated behavior"), so every invocation reports
/// the command as unknown rather than silently succeeding.
fn execute(command: &str, _args: &[String]) -> ExitCode {
    eprintln!("groovy-lsp: unknown command '{command}'");
    ExitCode::FAILURE
}

async fn check(files: &[PathBuf]) -> ExitCode {
    if files.is_empty() {
        eprintln!("groovy-lsp: check requires at least one file");
        return ExitCode::FAILURE;
    }

    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let engine = groovy_workspace::WorkspaceEngine::new(root);
    let mut had_error = false;

    for path in files {
        let Ok(uri) = tower_lsp_server::lsp_types::Uri::from_file_path(path) else {
            eprintln!("groovy-lsp: not a valid file path: {}", path.display());
            had_error = true;
            continue;
        };

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) => {
                eprintln!("groovy-lsp: failed to read {}: {err}", path.display());
                had_error = true;
                continue;
            }
        };

        match engine.update_file(uri.clone(), content).await {
            Ok(by_uri) => {
                for (file_uri, diagnostics) in by_uri {
                    for diagnostic in diagnostics.iter() {
                        println!(
                            "{}:{}:{}: {}",
                            file_uri.as_str(),
                            diagnostic.range.start.line,
                            diagnostic.range.start.column,
                            diagnostic.message
                        );
                        if diagnostic.severity == Severity::Error {
                            had_error = true;
                        }
                    }
                }
            }
            Err(err) => {
                eprintln!("groovy-lsp: failed to compile {}: {err}", path.display());
                had_error = true;
            }
        }
    }

    if had_error { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
