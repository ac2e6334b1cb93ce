//! Thread-safe arena allocation.
//!
//! [`GlobalArena`] hands out stable, never-moving byte ranges from a list of
//! chunks using an atomic bump cursor. Nothing is freed individually; all
//! chunks are released together when the arena is dropped. The process-wide
//! instance returned by [`global_arena`] is never dropped.
//!
//! # Examples
//!
//! ```
//! use kestrel_mem::arena::GlobalArena;
//!
//! let arena = GlobalArena::new(16 * 1024);
//! let name = arena.alloc_str("Std::Int");
//!
//! assert_eq!(name, "Std::Int");
//! assert!(arena.stats().total_allocated >= 8);
//! ```

use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

/// Error type for arena allocation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaAllocError;

impl std::fmt::Display for ArenaAllocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "arena allocation failed: out of memory")
    }
}

impl std::error::Error for ArenaAllocError {}

/// Alignment of every chunk base address.
const CHUNK_ALIGNMENT: usize = 8;

/// Minimum chunk size (8 KiB).
const MIN_CHUNK_SIZE: usize = 8192;

/// Maximum size a chunk grows to unless a single request needs more (1 MiB).
const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Arena allocation statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Bytes handed out across all chunks.
    pub total_allocated: usize,
    /// Number of chunks.
    pub chunk_count: usize,
    /// Sum of chunk capacities in bytes.
    pub total_capacity: usize,
}

/// A fixed-size region with an atomic bump cursor.
struct Chunk {
    start: NonNull<u8>,
    /// Offset of the first free byte.
    cursor: AtomicUsize,
    capacity: usize,
}

// SAFETY: the region is only reached through `try_alloc`, which hands out
// disjoint ranges via compare-and-swap on `cursor`.
unsafe impl Send for Chunk {}
unsafe impl Sync for Chunk {}

impl Chunk {
    fn new(capacity: usize) -> Result<Self, ArenaAllocError> {
        let layout = Layout::from_size_align(capacity, CHUNK_ALIGNMENT)
            .map_err(|_| ArenaAllocError)?;

        // SAFETY: layout has non-zero size (capacity >= MIN_CHUNK_SIZE).
        let start = unsafe { alloc::alloc(layout) };
        let start = NonNull::new(start).ok_or(ArenaAllocError)?;

        Ok(Chunk {
            start,
            cursor: AtomicUsize::new(0),
            capacity,
        })
    }

    /// Reserves `size` bytes aligned to `align`, or `None` if the chunk is full.
    fn try_alloc(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let base = self.start.as_ptr().addr();

        loop {
            let offset = self.cursor.load(Ordering::Acquire);
            let aligned = (base + offset + align - 1) & !(align - 1);
            let begin = aligned - base;
            let end = begin.checked_add(size)?;
            if end > self.capacity {
                return None;
            }

            if self
                .cursor
                .compare_exchange_weak(offset, end, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                // SAFETY: begin + size <= capacity, so the pointer stays
                // inside the allocation made in `Chunk::new`.
                let ptr = unsafe { self.start.as_ptr().add(begin) };
                return NonNull::new(ptr);
            }
        }
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        // SAFETY: the same layout was used to allocate `start`.
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.capacity, CHUNK_ALIGNMENT);
            alloc::dealloc(self.start.as_ptr(), layout);
        }
    }
}

/// Thread-safe bump arena for long-lived byte data.
///
/// Allocation is lock-free in the common case; only growing the chunk list
/// takes a mutex.
pub struct GlobalArena {
    chunks: Mutex<Vec<Box<Chunk>>>,
    /// Chunk currently served from. Always points into `chunks`.
    current: AtomicPtr<Chunk>,
    chunk_size: usize,
    total_allocated: AtomicUsize,
}

impl GlobalArena {
    /// Creates an arena whose chunks are at least `chunk_size` bytes
    /// (rounded up to a power of two, minimum 8 KiB).
    ///
    /// # Panics
    ///
    /// Panics if the first chunk cannot be allocated.
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        let size = chunk_size.max(MIN_CHUNK_SIZE).next_power_of_two();
        let first = Box::new(Chunk::new(size).expect("failed to allocate initial arena chunk"));
        let current = (&*first as *const Chunk).cast_mut();

        GlobalArena {
            chunks: Mutex::new(vec![first]),
            current: AtomicPtr::new(current),
            chunk_size: size,
            total_allocated: AtomicUsize::new(0),
        }
    }

    /// Copies `s` into the arena and returns the stored copy.
    ///
    /// # Panics
    ///
    /// Panics if a new chunk is needed and cannot be allocated.
    pub fn alloc_str(&self, s: &str) -> &str {
        if s.is_empty() {
            return "";
        }

        let ptr = self.alloc_bytes(s.len(), 1);

        // SAFETY: `ptr` is valid for `s.len()` freshly reserved bytes that no
        // other allocation overlaps, and the copied bytes are valid UTF-8.
        unsafe {
            std::ptr::copy_nonoverlapping(s.as_ptr(), ptr.as_ptr(), s.len());
            let bytes = std::slice::from_raw_parts(ptr.as_ptr(), s.len());
            std::str::from_utf8_unchecked(bytes)
        }
    }

    fn alloc_bytes(&self, size: usize, align: usize) -> NonNull<u8> {
        loop {
            let current = self.current.load(Ordering::Acquire);

            // SAFETY: `current` always points at a boxed chunk owned by
            // `self.chunks`, which is never shrunk while `self` is alive.
            let chunk = unsafe { &*current };
            if let Some(ptr) = chunk.try_alloc(size, align) {
                self.total_allocated.fetch_add(size, Ordering::Relaxed);
                return ptr;
            }

            self.grow(current, size + align);
        }
    }

    #[cold]
    fn grow(&self, seen: *mut Chunk, min_size: usize) {
        let mut chunks = self.chunks.lock().unwrap_or_else(PoisonError::into_inner);

        // Another thread already replaced the chunk we found full.
        if self.current.load(Ordering::Acquire) != seen {
            return;
        }

        let size = (self.chunk_size * 2)
            .min(MAX_CHUNK_SIZE)
            .max(min_size.next_power_of_two());
        let chunk = Box::new(Chunk::new(size).expect("failed to allocate arena chunk"));
        let ptr = (&*chunk as *const Chunk).cast_mut();

        chunks.push(chunk);
        self.current.store(ptr, Ordering::Release);
    }

    /// Returns allocation statistics for this arena.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        let chunks = self.chunks.lock().unwrap_or_else(PoisonError::into_inner);

        ArenaStats {
            total_allocated: self.total_allocated.load(Ordering::Relaxed),
            chunk_count: chunks.len(),
            total_capacity: chunks.iter().map(|c| c.capacity).sum(),
        }
    }
}

/// Returns the process-wide arena used for interned strings.
#[must_use]
pub fn global_arena() -> &'static GlobalArena {
    static ARENA: OnceLock<GlobalArena> = OnceLock::new();
    ARENA.get_or_init(|| GlobalArena::new(64 * 1024))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_str_round_trips() {
        let arena = GlobalArena::new(8192);

        let a = arena.alloc_str("Root");
        let b = arena.alloc_str("Std::String");

        assert_eq!(a, "Root");
        assert_eq!(b, "Std::String");
        assert_eq!(arena.alloc_str(""), "");
    }

    #[test]
    fn test_chunk_growth_keeps_earlier_strings() {
        let arena = GlobalArena::new(8192);
        let long = "x".repeat(3000);

        let stored: Vec<&str> = (0..10).map(|_| arena.alloc_str(&long)).collect();

        assert!(arena.stats().chunk_count > 1);
        for s in stored {
            assert_eq!(s, long);
        }
    }

    #[test]
    fn test_oversized_request_gets_its_own_chunk() {
        let arena = GlobalArena::new(8192);
        let huge = "y".repeat(3 * MAX_CHUNK_SIZE);

        assert_eq!(arena.alloc_str(&huge).len(), huge.len());
    }

    #[test]
    fn test_concurrent_allocation() {
        let arena = GlobalArena::new(8192);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let arena = &arena;
                    scope.spawn(move || {
                        (0..200)
                            .map(|j| arena.alloc_str(&format!("t{i}_{j}")).to_string())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            for (i, handle) in handles.into_iter().enumerate() {
                let names = handle.join().unwrap();
                assert_eq!(names[199], format!("t{i}_199"));
            }
        });
    }

    #[test]
    fn test_stats_track_bytes() {
        let arena = GlobalArena::new(8192);
        arena.alloc_str("abc");
        arena.alloc_str("de");

        let stats = arena.stats();
        assert_eq!(stats.total_allocated, 5);
        assert_eq!(stats.chunk_count, 1);
        assert_eq!(stats.total_capacity, 8192);
    }

    #[test]
    fn test_global_arena_singleton() {
        assert!(std::ptr::eq(global_arena(), global_arena()));
    }
}
