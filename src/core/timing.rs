use std::time::Instant;

/// Runs `work`, logs how long it took under the `finance_core::timing` target,
/// and hands back its result untouched.
pub fn timed<T>(label: &str, work: impl FnOnce() -> T) -> T {
    let started = Instant::now();
    let result = work();
    let elapsed = started.elapsed();
    tracing::debug!(
        target: "finance_core::timing",
        operation = label,
        elapsed_us = elapsed.as_micros() as u64,
        "execution time"
    );
    result
}
