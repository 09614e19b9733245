//! Mark command for recording a single visibility transition.
//!
//! Intended for window-manager or terminal hooks: fire `seen mark hidden`
//! when the surface goes away and `seen mark visible` when it returns.

use std::io::Write;
use std::rc::Rc;

use anyhow::{Context, Result};
use chrono::SecondsFormat;

use seen_core::{
    Config as TrackerConfig, Document, StorageProvider, VisibilitySource, VisibilityState, activate,
    read_last_seen,
};

pub fn run<W: Write>(
    writer: &mut W,
    storage: Rc<dyn StorageProvider>,
    key: &str,
    state: VisibilityState,
) -> Result<()> {
    let document = Rc::new(Document::new());
    let handle = activate(
        TrackerConfig::new()
            .storage(Rc::clone(&storage))
            .element(Rc::clone(&document) as Rc<dyn VisibilitySource>)
            .storage_key(key),
    )
    .context("failed to activate tracker")?;

    document
        .set_visibility_state(state)
        .context("failed to record transition")?;

    if state.is_hidden() {
        let recorded = read_last_seen(storage.as_ref(), key)
            .with_context(|| format!("failed to read last-seen entry {key}"))?;
        match recorded.last_seen {
            Some(instant) => writeln!(
                writer,
                "Recorded hidden at {}",
                instant.to_rfc3339_opts(SecondsFormat::Millis, true)
            )?,
            None => writeln!(writer, "Recorded hidden")?,
        }
    } else {
        match handle.current_result().and_then(|result| result.last_seen) {
            Some(instant) => writeln!(
                writer,
                "Last seen: {}",
                instant.to_rfc3339_opts(SecondsFormat::Millis, true)
            )?,
            None => writeln!(writer, "Last seen: never")?,
        }
    }

    handle.deactivate();
    Ok(())
}
