//! Typed, resizable, file-backed contiguous array (`spec.md` §4.6,
//! component A). Capacity doubles on overflow and is truncated to the exact
//! size at finalization; the on-disk layout is just `len` densely packed
//! `T`s, so the array survives process restarts.
use memmap2::{MmapMut, MmapOptions};
use std::fs::{self, File, OpenOptions};
use std::marker::PhantomData;
use std::mem::size_of;
use std::path::{Path, PathBuf};

use crate::error::{LdfaError, Result};

const INITIAL_CAPACITY: usize = 64;

/// A file-backed `Vec<T>`-like array. `T` must be a plain-old-data type
/// (no padding-sensitive invariants, no drop glue) since it is read and
/// written as raw bytes through a memory map.
pub struct MmapArray<T: Copy + 'static> {
    path: PathBuf,
    file: File,
    mmap: Option<MmapMut>,
    len: usize,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<T: Copy + 'static> MmapArray<T> {
    fn elem_size() -> usize {
        size_of::<T>()
    }

    /// Creates a new array at `path` with room for at least
    /// `initial_capacity` elements (rounded up to [`INITIAL_CAPACITY`]).
    pub fn create(path: impl AsRef<Path>, initial_capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| LdfaError::io(&path, e))?;
        let capacity = initial_capacity.max(INITIAL_CAPACITY);
        file.set_len((capacity * Self::elem_size()) as u64)
            .map_err(|e| LdfaError::io(&path, e))?;
        let mmap = if capacity == 0 {
            None
        } else {
            Some(unsafe { MmapOptions::new().map_mut(&file) }.map_err(|e| LdfaError::io(&path, e))?)
        };
        Ok(MmapArray {
            path,
            file,
            mmap,
            len: 0,
            capacity,
            _marker: PhantomData,
        })
    }

    /// Maps an existing array file (created by a previous [`MmapArray::create`]
    /// and [`MmapArray::finalize`]d) read-write, trusting the file length as
    /// the logical length.
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| LdfaError::io(&path, e))?;
        let byte_len = file
            .metadata()
            .map_err(|e| LdfaError::io(&path, e))?
            .len() as usize;
        let len = byte_len / Self::elem_size();
        let mmap = if byte_len == 0 {
            None
        } else {
            Some(unsafe { MmapOptions::new().map_mut(&file) }.map_err(|e| LdfaError::io(&path, e))?)
        };
        Ok(MmapArray {
            path,
            file,
            mmap,
            len,
            capacity: len,
            _marker: PhantomData,
        })
    }

    fn remap(&mut self) -> Result<()> {
        self.mmap = if self.capacity == 0 {
            None
        } else {
            Some(
                unsafe { MmapOptions::new().map_mut(&self.file) }
                    .map_err(|e| LdfaError::io(&self.path, e))?,
            )
        };
        Ok(())
    }

    fn grow_to(&mut self, min_capacity: usize) -> Result<()> {
        let mut new_capacity = self.capacity.max(INITIAL_CAPACITY);
        while new_capacity < min_capacity {
            new_capacity *= 2;
        }
        if let Some(mmap) = self.mmap.take() {
            drop(mmap);
        }
        self.file
            .set_len((new_capacity * Self::elem_size()) as u64)
            .map_err(|e| LdfaError::io(&self.path, e))?;
        self.capacity = new_capacity;
        self.remap()
    }

    fn as_typed_slice(&self) -> &[T] {
        match &self.mmap {
            None => &[],
            Some(mmap) => unsafe {
                std::slice::from_raw_parts(mmap.as_ptr() as *const T, self.capacity)
            },
        }
    }

    fn as_typed_slice_mut(&mut self) -> &mut [T] {
        match &mut self.mmap {
            None => &mut [],
            Some(mmap) => unsafe {
                std::slice::from_raw_parts_mut(mmap.as_mut_ptr() as *mut T, self.capacity)
            },
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, index: usize) -> T {
        assert!(index < self.len, "index {index} out of bounds ({})", self.len);
        self.as_typed_slice()[index]
    }

    pub fn set(&mut self, index: usize, value: T) {
        assert!(index < self.len, "index {index} out of bounds ({})", self.len);
        self.as_typed_slice_mut()[index] = value;
    }

    pub fn push(&mut self, value: T) -> Result<usize> {
        if self.len == self.capacity {
            self.grow_to(self.capacity + 1)?;
        }
        let idx = self.len;
        self.as_typed_slice_mut()[idx] = value;
        self.len += 1;
        Ok(idx)
    }

    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<()> {
        if self.len + values.len() > self.capacity {
            self.grow_to(self.len + values.len())?;
        }
        self.as_typed_slice_mut()[self.len..self.len + values.len()].copy_from_slice(values);
        self.len += values.len();
        Ok(())
    }

    /// Truncates (or extends with zero-initialized bytes) the *logical*
    /// length to `new_size`, shrinking on-disk capacity to match exactly.
    /// Called at finalization (`spec.md` §4.1: "flushes the dedup map and
    /// truncates each layer file ...").
    pub fn truncate(&mut self, new_size: usize) -> Result<()> {
        if let Some(mmap) = self.mmap.take() {
            drop(mmap);
        }
        self.file
            .set_len((new_size * Self::elem_size()) as u64)
            .map_err(|e| LdfaError::io(&self.path, e))?;
        self.len = new_size;
        self.capacity = new_size;
        self.remap()
    }

    /// Renames the backing file to `new_path`, transferring ownership of
    /// the on-disk artifact (used to move a temp-built layer into the
    /// content-addressed store).
    pub fn rename(&mut self, new_path: impl AsRef<Path>) -> Result<()> {
        let new_path = new_path.as_ref().to_path_buf();
        if let Some(parent) = new_path.parent() {
            fs::create_dir_all(parent).map_err(|e| LdfaError::io(&new_path, e))?;
        }
        fs::rename(&self.path, &new_path).map_err(|e| LdfaError::io(&new_path, e))?;
        self.path = new_path;
        Ok(())
    }

    /// Deletes the backing file. Temporary LDFAs call this on destruction;
    /// persisted LDFAs instead [`MmapArray::rename`] into the store.
    pub fn unlink(self) -> Result<()> {
        let path = self.path.clone();
        drop(self);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LdfaError::io(&path, e)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.as_typed_slice()[..self.len].iter().copied()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.as_typed_slice()[..self.len]
    }

    pub fn as_slice_mut(&mut self) -> &mut [T] {
        let len = self.len;
        &mut self.as_typed_slice_mut()[..len]
    }
}
