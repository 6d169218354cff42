use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a hierarchical tracing subscriber for engine diagnostics.
///
/// Reads the filter from `STRAND_LOG`, falling back to `RUST_LOG`, and does
/// nothing if neither is set. Safe to call repeatedly; only the first call
/// has any effect, and an already-installed global subscriber is left alone.
///
/// ```text
/// STRAND_LOG=strand_engine=debug            one summary per tokenize
/// STRAND_LOG=strand_engine::scan=trace      every scan event
/// ```
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let Ok(directives) = std::env::var("STRAND_LOG").or_else(|_| std::env::var("RUST_LOG"))
        else {
            return;
        };
        let filter = EnvFilter::new(directives);
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_bracketed_fields(true),
            )
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_init_tracing_is_idempotent() {
        super::init_tracing();
        super::init_tracing();
    }
}
