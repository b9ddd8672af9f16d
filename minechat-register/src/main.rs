//! One-shot account registration for minechat.
//!
//! Connects to the write port, asks the server to mint a new account for
//! the chosen nickname, and writes the resulting credentials file that
//! minechat-tui loads on startup.
//!
//! Usage:
//!   minechat-register --host chat.example.net
//!   minechat-register --host chat.example.net --nickname "Brave Rabbit"

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use minechat_sdk::auth;
use minechat_sdk::config::DEFAULT_WRITE_PORT;
use minechat_sdk::transport::LineStream;

/// Create a chat account and save its credentials
#[derive(Parser, Debug)]
#[command(name = "minechat-register")]
#[command(about = "Create a minechat account and save its credentials")]
#[command(version)]
struct Args {
    /// Chat server host
    #[arg(long, env = "MINECHAT_HOST")]
    host: String,

    /// Auth/messaging port
    #[arg(long, env = "MINECHAT_WRITE_PORT", default_value_t = DEFAULT_WRITE_PORT)]
    write_port: u16,

    /// Desired nickname; prompted for when omitted
    #[arg(long)]
    nickname: Option<String>,

    /// Where to write the credentials file
    #[arg(long, env = "MINECHAT_CREDENTIALS")]
    output: Option<PathBuf>,
}

fn default_credentials_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("minechat")
        .join("credentials.json")
}

/// Prompt on stderr until the user enters a non-empty nickname.
fn prompt_nickname() -> anyhow::Result<String> {
    let stdin = std::io::stdin();
    let mut stderr = std::io::stderr();
    loop {
        write!(stderr, "Nickname: ")?;
        stderr.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            anyhow::bail!("no nickname entered");
        }
        let nickname = line.trim().to_string();
        if !nickname.is_empty() {
            return Ok(nickname);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let nickname = match args.nickname {
        Some(nickname) => nickname,
        None => prompt_nickname()?,
    };
    let output = args.output.unwrap_or_else(default_credentials_path);

    let mut stream = LineStream::open(&args.host, args.write_port)
        .await
        .with_context(|| format!("could not connect to {}:{}", args.host, args.write_port))?;

    let credentials = auth::register(&mut stream, &nickname)
        .await
        .context("registration handshake failed")?;

    credentials
        .save(&output)
        .with_context(|| format!("could not save credentials to {}", output.display()))?;

    println!("Registered nickname: {}", credentials.nickname);
    println!("Credentials saved to {}", output.display());
    Ok(())
}
