use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::token::MintArgs;

#[derive(Parser, Debug)]
#[command(name = "promisance", version, about = "Promisance key and token tooling")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Signing key management
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Mint, inspect, and verify tokens
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a random signing secret (base64url)
    Generate {
        /// Secret length in bytes
        #[arg(long, default_value_t = 32)]
        bytes: usize,

        /// Write the secret to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Mint a signed token
    Mint {
        /// Key id written into the token header
        #[arg(long = "key-id")]
        key_id: String,

        /// Secret (base64url) or path to a file containing it
        #[arg(long, env = "PROMISANCE_JOT_SECRET", hide_env_values = true)]
        secret: Option<String>,

        #[arg(long = "user-id")]
        user_id: i64,

        #[arg(long = "empire-id", default_value_t = 0)]
        empire_id: i64,

        /// Role to grant (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,

        /// Token lifetime, e.g. "7d", "12h"
        #[arg(long, default_value = "7d")]
        ttl: String,

        /// Write the token to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Decode a token without verifying its signature
    Inspect {
        /// Token string or path to a file containing it
        token: String,
    },

    /// Verify a token's signature and expiry
    Verify {
        /// Token string or path to a file containing it
        token: String,

        #[arg(long = "key-id")]
        key_id: String,

        /// Secret (base64url) or path to a file containing it
        #[arg(long, env = "PROMISANCE_JOT_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { bytes, output } => commands::keys::generate(bytes, output)?,
        },

        Command::Token { cmd } => match cmd {
            TokenCommand::Mint {
                key_id,
                secret,
                user_id,
                empire_id,
                roles,
                ttl,
                output,
            } => commands::token::mint(MintArgs {
                key_id,
                secret,
                user_id,
                empire_id,
                roles,
                ttl,
                output,
            })?,
            TokenCommand::Inspect { token } => commands::token::inspect(token)?,
            TokenCommand::Verify {
                token,
                key_id,
                secret,
            } => commands::token::verify(key_id, secret, token)?,
        },
    }

    Ok(())
}
