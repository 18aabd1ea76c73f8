//! Arena allocation for compilation state.
//!
//! Two arenas exist at any time: a process-wide arena that owns builtin
//! constants, symbols, and signatures for the lifetime of the process, and a
//! per-compilation arena that owns every AST node, symbol, and constant
//! produced while analyzing one script. The per-compilation arena is freed as
//! a unit when the owning [`Arena`] value is dropped.

use bumpalo::Bump;
use std::cell::Cell;

/// A bump-allocated region owning a group of values with a shared lifetime.
///
/// Wraps [`bumpalo::Bump`] directly; the wrapper exists so callers depend on
/// `script_core::Arena` rather than reaching into `bumpalo` themselves.
#[derive(Default)]
pub struct Arena {
    bump: Bump,
}

impl Arena {
    /// Create a new, empty arena.
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Allocate `value` in this arena, returning a reference with the
    /// arena's lifetime.
    pub fn alloc<T>(&self, value: T) -> &T {
        self.bump.alloc(value)
    }

    /// Allocate a string slice by copying `s` into the arena.
    pub fn alloc_str(&self, s: &str) -> &str {
        self.bump.alloc_str(s)
    }

    /// Allocate a byte slice by copying `bytes` into the arena.
    pub fn alloc_bytes(&self, bytes: &[u8]) -> &[u8] {
        self.bump.alloc_slice_copy(bytes)
    }

    /// Allocate a slice by copying `items` into the arena.
    pub fn alloc_slice<T: Copy>(&self, items: &[T]) -> &[T] {
        self.bump.alloc_slice_copy(items)
    }

    /// Bytes currently allocated. Exposed for diagnostics and tests.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

thread_local! {
    static ACTIVE_ARENA: Cell<*const Arena> = const { Cell::new(std::ptr::null()) };
}

/// RAII guard that installs an arena as the "active" one for its lifetime,
/// restoring the previous value (possibly null) on drop.
///
/// The builtin catalog loader (`script-builtins`) uses this to direct its
/// one-time allocations at the process-wide arena without per-compilation
/// code needing to pass that arena through every call. Because the handle is
/// thread-local, independent compilations on different threads each get
/// their own active-arena slot.
pub struct ActiveArenaGuard {
    previous: *const Arena,
}

impl ActiveArenaGuard {
    /// Install `arena` as the active arena, remembering whatever was active
    /// before so it can be restored.
    pub fn enter(arena: &Arena) -> Self {
        let previous = ACTIVE_ARENA.with(|cell| cell.replace(arena as *const Arena));
        Self { previous }
    }
}

impl Drop for ActiveArenaGuard {
    fn drop(&mut self) {
        ACTIVE_ARENA.with(|cell| cell.set(self.previous));
    }
}

/// Fetch the currently active arena, if one has been installed via
/// [`ActiveArenaGuard::enter`].
///
/// # Panics
///
/// Panics if no arena is active. Callers that allocate builtins or AST nodes
/// must run inside an `ActiveArenaGuard` scope.
pub fn active_arena() -> &'static Arena {
    ACTIVE_ARENA.with(|cell| {
        let ptr = cell.get();
        assert!(
            !ptr.is_null(),
            "no active arena: allocation attempted outside an ActiveArenaGuard scope"
        );
        // SAFETY: the guard that installed this pointer outlives every
        // allocation performed while it is active, by construction of the
        // API (enter/drop bracket a single compilation or loader call).
        unsafe { &*ptr }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_roundtrip() {
        let arena = Arena::new();
        let n = arena.alloc(42i32);
        assert_eq!(*n, 42);
    }

    #[test]
    fn active_arena_restores_previous() {
        let outer = Arena::new();
        let inner = Arena::new();

        let _outer_guard = ActiveArenaGuard::enter(&outer);
        assert!(std::ptr::eq(active_arena(), &outer));
        {
            let _inner_guard = ActiveArenaGuard::enter(&inner);
            assert!(std::ptr::eq(active_arena(), &inner));
        }
        assert!(std::ptr::eq(active_arena(), &outer));
    }

    #[test]
    #[should_panic(expected = "no active arena")]
    fn active_arena_panics_without_guard() {
        active_arena();
    }
}
