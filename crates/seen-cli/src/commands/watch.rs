//! Watch command for driving transitions from a line-based reader.
//!
//! Each input line is mapped to a visibility state (`"hidden"` or anything
//! else, which counts as visible) and pushed through a document the tracker
//! observes, until EOF.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use chrono::SecondsFormat;

use seen_core::{
    Config as TrackerConfig, Document, StorageProvider, VisibilityResult, VisibilitySource,
    VisibilityState, activate,
};

/// Runs the watch loop, returning the writer once the input is exhausted.
pub fn run<R: BufRead, W: Write + 'static>(
    reader: R,
    writer: W,
    storage: Rc<dyn StorageProvider>,
    key: &str,
) -> Result<W> {
    let document = Rc::new(Document::new());
    let shared = Rc::new(RefCell::new(writer));

    let handle = {
        let on_hide_writer = Rc::clone(&shared);
        let on_show_writer = Rc::clone(&shared);
        activate(
            TrackerConfig::new()
                .storage(storage)
                .element(Rc::clone(&document) as Rc<dyn VisibilitySource>)
                .storage_key(key)
                .on_hide(move || {
                    if let Err(error) = writeln!(on_hide_writer.borrow_mut(), "Recorded hidden") {
                        tracing::warn!(%error, "failed to write report");
                    }
                })
                .on_show(move |result: &VisibilityResult| {
                    if let Err(error) = report(&mut *on_show_writer.borrow_mut(), result) {
                        tracing::warn!(%error, "failed to write report");
                    }
                }),
        )
        .context("failed to activate tracker")?
    };

    for line in reader.lines() {
        let line = line.context("failed to read input line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        document
            .set_visibility_state(VisibilityState::from_signal(trimmed))
            .context("failed to handle transition")?;
    }

    // Releases the observer, and with it the callbacks' writer clones.
    handle.deactivate();
    Rc::try_unwrap(shared)
        .map_err(|_| anyhow!("writer still shared after deactivation"))
        .map(RefCell::into_inner)
}

fn report<W: Write>(writer: &mut W, result: &VisibilityResult) -> std::io::Result<()> {
    match result.last_seen {
        Some(instant) => writeln!(
            writer,
            "Last seen: {}",
            instant.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        None => writeln!(writer, "Last seen: never"),
    }?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use seen_core::{DEFAULT_STORAGE_KEY, MemoryStore};

    use super::*;

    fn watch(input: &str, store: &Rc<MemoryStore>) -> String {
        let output = run(
            Cursor::new(input.to_owned()),
            Vec::new(),
            Rc::clone(store) as Rc<dyn StorageProvider>,
            DEFAULT_STORAGE_KEY,
        )
        .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn empty_input_produces_no_output() {
        let store = Rc::new(MemoryStore::new());
        assert_eq!(watch("", &store), "");
    }

    #[test]
    fn hidden_then_visible_reports_the_recorded_instant() {
        let store = Rc::new(MemoryStore::new());
        let output = watch("hidden\nvisible\n", &store);

        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("Recorded hidden"));
        let report = lines.next().unwrap();
        assert!(report.starts_with("Last seen: 2"), "got: {report}");
        assert_eq!(lines.next(), None);

        // The entry stays behind for the next run.
        assert!(store.get_item(DEFAULT_STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn visible_without_history_reports_never() {
        let store = Rc::new(MemoryStore::new());
        assert_eq!(watch("visible\n", &store), "Last seen: never\n");
    }

    #[test]
    fn unknown_states_count_as_visible() {
        let store = Rc::new(MemoryStore::new());
        store
            .set_item(DEFAULT_STORAGE_KEY, "2023-06-15T12:00:00.000Z")
            .unwrap();
        assert_eq!(
            watch("prerender\n", &store),
            "Last seen: 2023-06-15T12:00:00.000Z\n"
        );
    }

    #[test]
    fn blank_lines_are_ignored() {
        let store = Rc::new(MemoryStore::new());
        assert_eq!(watch("\n\n", &store), "");
    }
}
