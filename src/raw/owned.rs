use std::{fmt, ptr::NonNull};

type ReleaseVec = Box<dyn FnOnce(Vec<u8>) + Send>;
type Deleter = Box<dyn FnOnce(NonNull<u8>, usize) + Send>;

#[derive(Default)]
enum Storage {
    #[default]
    Empty,
    Vec(Vec<u8>),
    Released {
        bytes: Vec<u8>,
        release: ReleaseVec,
    },
    Foreign {
        ptr: NonNull<u8>,
        len: usize,
        deleter: Deleter,
    },
}

impl Storage {
    fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Empty => &[],
            Storage::Vec(bytes) | Storage::Released { bytes, .. } => bytes,
            // SAFETY: guaranteed by the contract of `OwnedBuffer::from_raw_parts`.
            Storage::Foreign { ptr, len, .. } => unsafe {
                std::slice::from_raw_parts(ptr.as_ptr(), *len)
            },
        }
    }
}

/// An exclusively owned byte buffer with a configurable release strategy.
///
/// The default strategy is an ordinary `Vec<u8>`. A buffer can also be built from a `Vec<u8>`
/// plus a callback that receives the bytes when the buffer is dropped, or from memory allocated by
/// a foreign allocator together with the deleter that frees it. Whichever strategy is attached
/// runs exactly once. Cloning always produces a plain `Vec<u8>` copy.
///
/// ```
/// use std::sync::{atomic::{AtomicUsize, Ordering}, Arc};
/// use rawbson::raw::OwnedBuffer;
///
/// let released = Arc::new(AtomicUsize::new(0));
/// let counter = released.clone();
/// let buf = OwnedBuffer::with_release(vec![5, 0, 0, 0, 0], move |_bytes| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
/// assert_eq!(buf.as_slice(), &[5, 0, 0, 0, 0]);
/// drop(buf);
/// assert_eq!(released.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct OwnedBuffer {
    storage: Storage,
}

// SAFETY: the buffer is exclusively owned. Foreign memory is only accepted through
// `from_raw_parts`, whose contract requires that the memory may be read and freed from any
// thread. The boxed callbacks are `Send` and only reachable through `&mut self` or `self`.
unsafe impl Send for OwnedBuffer {}
unsafe impl Sync for OwnedBuffer {}

impl OwnedBuffer {
    /// Wraps an ordinary vector.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            storage: Storage::Vec(bytes),
        }
    }

    /// Wraps a vector whose bytes are handed to `release` when the buffer is dropped.
    pub fn with_release(bytes: Vec<u8>, release: impl FnOnce(Vec<u8>) + Send + 'static) -> Self {
        Self {
            storage: Storage::Released {
                bytes,
                release: Box::new(release),
            },
        }
    }

    /// Takes ownership of `len` bytes at `ptr` without copying them. `deleter` is called with the
    /// same pointer and length when the buffer is dropped.
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null and valid for reads of `len` bytes for as long as the returned
    /// buffer lives, nothing else may write to or free that memory in the meantime, and the memory
    /// and `deleter` must be usable from whichever thread ends up dropping the buffer.
    pub unsafe fn from_raw_parts(
        ptr: *mut u8,
        len: usize,
        deleter: impl FnOnce(NonNull<u8>, usize) + Send + 'static,
    ) -> Self {
        match NonNull::new(ptr) {
            Some(ptr) => Self {
                storage: Storage::Foreign {
                    ptr,
                    len,
                    deleter: Box::new(deleter),
                },
            },
            None => Self::default(),
        }
    }

    /// The owned bytes.
    pub fn as_slice(&self) -> &[u8] {
        self.storage.as_slice()
    }

    /// The number of owned bytes.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts the buffer into a plain vector. Plain vectors are moved out; any other storage is
    /// copied and its release strategy runs.
    pub fn into_vec(mut self) -> Vec<u8> {
        match std::mem::take(&mut self.storage) {
            Storage::Vec(bytes) => bytes,
            other => {
                let copy = other.as_slice().to_vec();
                Self::release(other);
                copy
            }
        }
    }

    fn release(storage: Storage) {
        match storage {
            Storage::Empty | Storage::Vec(_) => {}
            Storage::Released { bytes, release } => release(bytes),
            Storage::Foreign { ptr, len, deleter } => deleter(ptr, len),
        }
    }
}

impl Drop for OwnedBuffer {
    fn drop(&mut self) {
        Self::release(std::mem::take(&mut self.storage));
    }
}

impl Clone for OwnedBuffer {
    fn clone(&self) -> Self {
        match &self.storage {
            Storage::Empty => Self::default(),
            _ => Self::from_vec(self.as_slice().to_vec()),
        }
    }
}

impl From<Vec<u8>> for OwnedBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl fmt::Debug for OwnedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match self.storage {
            Storage::Empty => "empty",
            Storage::Vec(_) => "vec",
            Storage::Released { .. } => "release-callback",
            Storage::Foreign { .. } => "foreign",
        };
        f.debug_struct("OwnedBuffer")
            .field("strategy", &strategy)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[test]
    fn foreign_deleter_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let leaked: &'static mut [u8] = Box::leak(vec![5u8, 0, 0, 0, 0].into_boxed_slice());
        let len = leaked.len();
        let buf = unsafe {
            OwnedBuffer::from_raw_parts(leaked.as_mut_ptr(), len, move |ptr, len| {
                counter.fetch_add(1, Ordering::SeqCst);
                drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    ptr.as_ptr(),
                    len,
                )));
            })
        };
        assert_eq!(buf.as_slice(), &[5, 0, 0, 0, 0]);

        let copy = buf.clone();
        drop(buf);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        drop(copy);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn into_vec_runs_release_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let buf = OwnedBuffer::with_release(vec![1, 2, 3], move |bytes| {
            assert_eq!(bytes, vec![1, 2, 3]);
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(buf.into_vec(), vec![1, 2, 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn null_pointer_is_empty() {
        let buf = unsafe { OwnedBuffer::from_raw_parts(std::ptr::null_mut(), 10, |_, _| {}) };
        assert!(buf.is_empty());
    }

    #[test]
    fn take_leaves_empty_buffer() {
        let mut buf = OwnedBuffer::from_vec(vec![1, 2]);
        let moved = std::mem::take(&mut buf);
        assert!(buf.is_empty());
        assert_eq!(moved.len(), 2);
    }
}
