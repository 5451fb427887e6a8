//! Helpers for populating tracing spans

use tracing::Span;

/// Record a value for a field declared empty on the current span
///
/// Used for values that are only known partway through an instrumented
/// function, e.g. a transaction hash
pub fn backfill_trace_field<V: tracing::Value>(field: &str, value: V) {
    Span::current().record(field, value);
}
