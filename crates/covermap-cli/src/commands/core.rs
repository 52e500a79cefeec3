//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_audit` - Show recent audit log entries

use std::path::Path;

use anyhow::{Context, Result};
use covermap_core::db::Database;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    // Opening runs migrations
    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Start a questionnaire: covermap new");
    println!("  2. Record answers: covermap answer 1 income 90000");
    println!("  3. Get your report: covermap assess 1");

    Ok(())
}

pub fn cmd_audit(db: &Database, limit: i64) -> Result<()> {
    let entries = db
        .list_audit_log(limit.max(1))
        .context("Failed to read audit log")?;

    if entries.is_empty() {
        println!("No audit entries yet.");
        return Ok(());
    }

    println!("📜 Recent activity ({} entries)", entries.len());
    println!();
    for entry in &entries {
        let target = match entry.subject_id {
            Some(id) => format!("{} #{}", entry.subject, id),
            None => entry.subject.clone(),
        };
        let details = entry
            .details
            .as_deref()
            .map(|d| format!(" ({})", d))
            .unwrap_or_default();
        println!(
            "  {}  {:<20} {} {}{}",
            entry.timestamp, entry.actor, entry.action, target, details
        );
    }

    Ok(())
}
