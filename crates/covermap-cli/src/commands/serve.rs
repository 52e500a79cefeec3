//! Web server command

use std::path::Path;

use anyhow::{Context, Result};
use covermap_server::{ServerConfig, API_KEYS_ENV};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    static_dir: Option<&Path>,
    no_encrypt: bool,
) -> Result<()> {
    let config = ServerConfig::from_env(!no_auth);

    println!("🚀 Starting Covermap server...");
    println!("   Database: {}", db_path.display());
    println!("   Address:  http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static:   {}", dir.display());
    }
    if no_auth {
        println!("   ⚠️  Authentication DISABLED (--no-auth)");
    } else {
        println!(
            "   🔑 API keys: {} configured via {}",
            config.api_keys.len(),
            API_KEYS_ENV
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;
    covermap_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}
