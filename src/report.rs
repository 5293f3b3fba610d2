//! Cumulative statistics about applied folds.
//!
//! The counter map is process-wide state, initialised empty at library load
//! and never torn down. It is guarded by a mutex so that a host which runs
//! compilation passes in parallel cannot corrupt it.

use std::io;
use std::io::Write;
use std::sync::{LazyLock, Mutex};

use rustc_hash::FxHashMap;

use crate::elements::Elements;

/// Fold statistics for one operator family.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FoldCounters {
    pub invocations: u64,
    pub input_elms: u64,
}

static COUNTERS: LazyLock<Mutex<FxHashMap<String, FoldCounters>>> =
    LazyLock::new(|| Mutex::new(FxHashMap::default()));

/// Record one successful fold of the operator family `name`, charging the
/// element count of each counted operand.
pub(crate) fn count(name: &str, inputs: &[&Elements]) {
    let mut map = COUNTERS.lock().unwrap();
    let counters = map.entry(name.to_owned()).or_default();
    counters.invocations += 1;
    for input in inputs {
        counters.input_elms += input.len() as u64;
    }
}

/// The current counters for one operator family.
pub fn counters_for(name: &str) -> FoldCounters {
    COUNTERS
        .lock()
        .unwrap()
        .get(name)
        .copied()
        .unwrap_or_default()
}

/// Render the cumulative fold report to `sink`.
///
/// Entries are sorted by operator family name so the output is
/// deterministic.
pub fn dump(sink: &mut dyn Write) -> io::Result<()> {
    let map = COUNTERS.lock().unwrap();
    let mut entries: Vec<(&String, &FoldCounters)> = map.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    let total_invocations: u64 = entries.iter().map(|(_, c)| c.invocations).sum();
    let total_input_elms: u64 = entries.iter().map(|(_, c)| c.input_elms).sum();
    writeln!(
        sink,
        "constprop report (cumulative), entries: {}, total invocations:{}, total input elements:{}",
        entries.len(),
        total_invocations,
        total_input_elms
    )?;
    for (name, counters) in entries {
        writeln!(
            sink,
            "  {} invocations:{} input elements:{}",
            name, counters.invocations, counters.input_elms
        )?;
    }
    Ok(())
}
