// ABOUTME: Command-line entry point: an interactive chat with the orchestrator,
// ABOUTME: or `serve` to host every built-in tool over stdio JSON-RPC.

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use orchestra::prelude::*;

const USAGE: &str = "usage: orchestra-cli [chat|serve]";

/// Logs go to stderr; stdout carries JSON-RPC in serve mode.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn serve(config: &Config) -> Result<()> {
    let server = McpServer::new(default_tools(config)).with_tool_timeout(config.tool_timeout);
    info!(tools = server.tools().count(), "serving tools on stdio");
    server.serve_stdio().await?;
    Ok(())
}

async fn chat(config: &Config) -> Result<()> {
    let mut agent = Orchestrator::from_config(config)?;
    let mut rl = DefaultEditor::new()?;

    println!("Orchestra - /tools lists tools, /reset clears memory, /quit exits.\n");

    loop {
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line);

        match line {
            "/quit" | "/exit" | "quit" | "exit" => break,
            "/reset" => {
                agent.reset_memory();
                println!("Memory cleared.\n");
            }
            "/tools" => {
                for tool in agent.tools().descriptors() {
                    println!("  {} - {}", tool.name, tool.description);
                }
                println!();
            }
            message => match agent.chat(message).await {
                Ok(reply) => println!("\n{}\n", reply),
                Err(e) => {
                    eprintln!("\nError: {}", e);
                    if let Some(partial) = e.partial_text() {
                        eprintln!("Partial response:\n{}", partial);
                    }
                    println!();
                }
            },
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    match std::env::args().nth(1).as_deref() {
        None | Some("chat") => {
            init_tracing("warn");
            chat(&config).await
        }
        Some("serve") => {
            init_tracing("info");
            serve(&config).await
        }
        Some(other) => {
            eprintln!("unknown command: {}\n{}", other, USAGE);
            std::process::exit(2);
        }
    }
}
