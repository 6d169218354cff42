//! Stack safety for recursive grammar scans.
//!
//! A state graph is evaluated by plain call-stack recursion: a repeat scans
//! its child, which scans its branches, which may reach the repeat again.
//! Two guards keep that bounded:
//!
//! - [`ensure_sufficient_stack`] grows the native stack before a nested scan
//!   runs out of it (`stacker` on native targets, passthrough on WASM).
//! - [`DepthGuard`] counts nesting against a configurable ceiling, so a
//!   pathological grammar fails with an error instead of recursing forever.

/// Minimum stack space to keep available (128KB red zone).
const RED_ZONE: usize = 128 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack; call through directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Nesting went past the configured ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("recursion depth exceeded limit of {limit}")]
pub struct DepthExceeded {
    pub limit: usize,
}

/// Tracks current nesting depth against an optional ceiling.
///
/// `enter` and `exit` must be paired; [`DepthGuard::nested`] does the pairing
/// and the stack growth in one call.
#[derive(Clone, Copy, Debug)]
pub struct DepthGuard {
    depth: usize,
    max_seen: usize,
    limit: Option<usize>,
}

impl DepthGuard {
    pub const fn new(limit: Option<usize>) -> Self {
        DepthGuard {
            depth: 0,
            max_seen: 0,
            limit,
        }
    }

    /// Current nesting depth.
    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Deepest nesting reached so far.
    #[inline]
    pub const fn max_seen(&self) -> usize {
        self.max_seen
    }

    /// Descend one level, failing if that would pass the ceiling.
    pub fn enter(&mut self) -> Result<(), DepthExceeded> {
        if let Some(limit) = self.limit {
            if self.depth >= limit {
                return Err(DepthExceeded { limit });
            }
        }
        self.depth += 1;
        self.max_seen = self.max_seen.max(self.depth);
        Ok(())
    }

    /// Ascend one level.
    pub fn exit(&mut self) {
        debug_assert!(self.depth > 0, "depth guard exited more than entered");
        self.depth = self.depth.saturating_sub(1);
    }

    /// Run `f` one level deeper, with enough native stack to do so.
    ///
    /// The guard is threaded back into `f` through `owner` so callers holding
    /// the guard inside a larger `&mut` state can still recurse.
    pub fn nested<S, R, E>(
        owner: &mut S,
        guard: impl Fn(&mut S) -> &mut DepthGuard,
        f: impl FnOnce(&mut S) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<DepthExceeded>,
    {
        guard(owner).enter()?;
        let result = ensure_sufficient_stack(|| f(owner));
        guard(owner).exit();
        result
    }
}

impl Default for DepthGuard {
    fn default() -> Self {
        Self::new(None)
    }
}
