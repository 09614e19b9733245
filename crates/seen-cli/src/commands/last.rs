//! Last command for printing the recorded last-seen timestamp.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::SecondsFormat;

use seen_core::{StorageProvider, read_last_seen};

pub fn run<W: Write>(
    writer: &mut W,
    storage: &dyn StorageProvider,
    key: &str,
    json: bool,
) -> Result<()> {
    let result = read_last_seen(storage, key)
        .with_context(|| format!("failed to read last-seen entry {key}"))?;

    if json {
        serde_json::to_writer(&mut *writer, &result)?;
        writeln!(writer)?;
    } else {
        match result.last_seen {
            Some(instant) => writeln!(
                writer,
                "Last seen: {}",
                instant.to_rfc3339_opts(SecondsFormat::Millis, true)
            )?,
            None => writeln!(writer, "Last seen: never")?,
        }
    }

    Ok(())
}
