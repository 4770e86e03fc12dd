//! Structural memory introspection.
//!
//! Reports how much memory a container spends on its own bookkeeping and
//! whether its elements live inline (packed) or behind their own heap
//! allocations (boxed). Nothing in this module runs a timer.

use std::collections::{LinkedList, VecDeque};
use std::mem::{size_of, size_of_val};

use serde::{Deserialize, Serialize};

/// Bytes a value owns outside its own inline representation.
pub trait HeapSize {
    fn heap_bytes(&self) -> usize;
}

macro_rules! inline_only {
    ($($t:ty),* $(,)?) => {
        $(impl HeapSize for $t {
            #[inline]
            fn heap_bytes(&self) -> usize {
                0
            }
        })*
    };
}

inline_only!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char, ());

impl<T: HeapSize> HeapSize for Box<T> {
    fn heap_bytes(&self) -> usize {
        size_of::<T>() + (**self).heap_bytes()
    }
}

impl HeapSize for String {
    fn heap_bytes(&self) -> usize {
        self.capacity()
    }
}

impl<T: HeapSize> HeapSize for Vec<T> {
    fn heap_bytes(&self) -> usize {
        self.capacity() * size_of::<T>() + self.iter().map(HeapSize::heap_bytes).sum::<usize>()
    }
}

impl<T: HeapSize> HeapSize for Option<T> {
    fn heap_bytes(&self) -> usize {
        self.as_ref().map_or(0, HeapSize::heap_bytes)
    }
}

/// A container whose footprint can be inspected.
pub trait Introspect {
    /// Header plus the buffer the container allocates for its slots.
    fn container_bytes(&self) -> usize;

    fn element_count(&self) -> usize;

    /// Independent heap allocation behind one representative element, or 0
    /// when elements are stored inline. `None` for an empty container.
    fn element_bytes(&self) -> Option<usize>;
}

impl<T: HeapSize> Introspect for [T] {
    fn container_bytes(&self) -> usize {
        size_of_val(self)
    }

    fn element_count(&self) -> usize {
        self.len()
    }

    fn element_bytes(&self) -> Option<usize> {
        self.first().map(HeapSize::heap_bytes)
    }
}

impl<T: HeapSize> Introspect for Vec<T> {
    fn container_bytes(&self) -> usize {
        size_of::<Self>() + self.capacity() * size_of::<T>()
    }

    fn element_count(&self) -> usize {
        self.len()
    }

    fn element_bytes(&self) -> Option<usize> {
        self.first().map(HeapSize::heap_bytes)
    }
}

impl<T: HeapSize> Introspect for Box<[T]> {
    fn container_bytes(&self) -> usize {
        size_of::<Self>() + size_of_val(&**self)
    }

    fn element_count(&self) -> usize {
        self.len()
    }

    fn element_bytes(&self) -> Option<usize> {
        self.first().map(HeapSize::heap_bytes)
    }
}

impl<T: HeapSize> Introspect for VecDeque<T> {
    fn container_bytes(&self) -> usize {
        size_of::<Self>() + self.capacity() * size_of::<T>()
    }

    fn element_count(&self) -> usize {
        self.len()
    }

    fn element_bytes(&self) -> Option<usize> {
        self.front().map(HeapSize::heap_bytes)
    }
}

/// Every element sits in its own node allocation: the value plus the two
/// link pointers.
impl<T: HeapSize> Introspect for LinkedList<T> {
    fn container_bytes(&self) -> usize {
        size_of::<Self>()
    }

    fn element_count(&self) -> usize {
        self.len()
    }

    fn element_bytes(&self) -> Option<usize> {
        self.front()
            .map(|v| size_of::<T>() + 2 * size_of::<usize>() + v.heap_bytes())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// Elements stored contiguously inside the container's buffer.
    Packed,
    /// Elements reached through their own heap allocations.
    Boxed,
    /// No element to inspect.
    Empty,
}

/// Snapshot of a container's memory layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootprintReport {
    pub container_bytes: usize,
    /// 0 for packed and empty containers.
    pub element_bytes: usize,
    pub element_count: usize,
    pub representation: Representation,
}

impl FootprintReport {
    /// Rough total assuming every element costs as much as the
    /// representative one.
    pub fn estimated_total_bytes(&self) -> usize {
        self.container_bytes + self.element_bytes * self.element_count
    }
}

pub fn footprint<C: Introspect + ?Sized>(container: &C) -> FootprintReport {
    let (element_bytes, representation) = match container.element_bytes() {
        None => (0, Representation::Empty),
        Some(0) => (0, Representation::Packed),
        Some(n) => (n, Representation::Boxed),
    };

    FootprintReport {
        container_bytes: container.container_bytes(),
        element_bytes,
        element_count: container.element_count(),
        representation,
    }
}

/// One push in a capacity growth trace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthStep {
    pub len: usize,
    pub capacity: usize,
    pub buffer_bytes: usize,
    /// The push reallocated the buffer.
    pub resized: bool,
    /// Bytes gained by the reallocation, 0 otherwise.
    pub growth: usize,
}

/// Push `values` into an empty `Vec` one at a time, recording capacity after
/// each push. Long runs of non-resizing pushes are the amortized O(1) append.
pub fn growth_trace<T>(values: impl IntoIterator<Item = T>) -> Vec<GrowthStep> {
    let mut buf: Vec<T> = Vec::new();
    let mut steps = Vec::new();
    let mut last_bytes = 0usize;

    for v in values {
        let before = buf.capacity();
        buf.push(v);
        let bytes = buf.capacity() * size_of::<T>();
        let resized = buf.capacity() != before;
        steps.push(GrowthStep {
            len: buf.len(),
            capacity: buf.capacity(),
            buffer_bytes: bytes,
            resized,
            growth: if resized { bytes.saturating_sub(last_bytes) } else { 0 },
        });
        last_bytes = bytes;
    }

    steps
}
