//! Integration Test: Processor Discipline
//!
//! **Policy**: The stream processor is owned by exactly one consumer. It MUST
//! NOT use locks or shared ownership, and production code across the
//! workspace propagates errors instead of panicking.

use architectural_enforcement::{find_violations, report};

#[test]
fn test_processor_is_lock_free() {
    let violations = find_violations(
        "investigator/core/src/processor",
        &[
            "Mutex",
            "RwLock",
            "Arc<",
            "Arc::",
            "RefCell",
            "std::sync::atomic",
            "tokio::sync",
        ],
    );

    report(
        &violations,
        "Synchronization primitive found in the stream processor",
        "Keep processor state single-owner; the bridge's mpsc queue is the only handoff",
    );
}

#[test]
fn test_no_panicking_unwraps_in_production_code() {
    let patterns = [".unwrap()", ".expect(", "panic!(", "todo!(", "unimplemented!("];

    let mut violations = find_violations("investigator/core/src", &patterns);
    violations.extend(find_violations("investigator/replay/src", &patterns));

    report(
        &violations,
        "Panicking call found in production code",
        "Return a Result and propagate with `?` (thiserror in the core, anyhow in binaries)",
    );
}
