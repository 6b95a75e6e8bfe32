use std::convert::TryInto;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use log::debug;

use crate::error::{ErrorKind, EseError};
use crate::types::EseResult;

use super::flags::PageFlags;
use super::page::{Page, PageNumber, TaggedValue};

pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Turns a page's raw on-disk bytes into a [`Page`].
///
/// Checksum verification and tag-array decompression belong to a fuller
/// decoder than this crate ships (see SPEC_FULL.md §1/§4.11); `PageStore`
/// is generic over this trait so such a decoder can be substituted without
/// touching the traversal engine.
pub trait RawPageDecoder {
    fn decode(&self, page_number: PageNumber, bytes: &[u8]) -> EseResult<Page>;
}

/// The wire layout `PageStore` understands out of the box: a 20-byte fixed
/// header followed by a tagged-value directory. Real ESE files carry a much
/// richer header and a compressed tag array; this format exists so the
/// engine and its tests have a concrete, self-contained page representation
/// to drive without depending on the external decoder named in §6.
///
/// Header: `page_number:u32 | previous_page_number:u32 | next_page_number:u32
/// | fdp_object_id:u32 | flags:u32`, followed by `count:u16` and then
/// `count` entries of `len:u16 | flags:u8 | data[len]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPageDecoder;

impl RawPageDecoder for DefaultPageDecoder {
    fn decode(&self, page_number: PageNumber, bytes: &[u8]) -> EseResult<Page> {
        if bytes.len() < 22 {
            return Err(EseError::new(
                ErrorKind::Unsupported,
                format!("page {} is too short to hold a header", page_number),
            ));
        }

        let previous_page_number = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        let next_page_number = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
        let fdp_object_id = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
        let flags = PageFlags::from_bits_truncate(u32::from_le_bytes(
            bytes[16..20].try_into().unwrap(),
        ));
        let count = u16::from_le_bytes(bytes[20..22].try_into().unwrap()) as usize;

        let mut tagged_values = Vec::with_capacity(count);
        let mut cursor = 22usize;
        for i in 0..count {
            if cursor + 3 > bytes.len() {
                return Err(EseError::new(
                    ErrorKind::Unsupported,
                    format!("page {} tagged value {} directory truncated", page_number, i),
                ));
            }
            let len = u16::from_le_bytes(bytes[cursor..cursor + 2].try_into().unwrap()) as usize;
            let tag_flags = bytes[cursor + 2];
            cursor += 3;
            if cursor + len > bytes.len() {
                return Err(EseError::new(
                    ErrorKind::Unsupported,
                    format!("page {} tagged value {} data truncated", page_number, i),
                ));
            }
            tagged_values.push(TaggedValue::new(tag_flags, bytes[cursor..cursor + len].to_vec()));
            cursor += len;
        }

        Ok(Page {
            page_number,
            previous_page_number,
            next_page_number,
            fdp_object_id,
            flags,
            tagged_values,
        })
    }
}

/// A read-through page source backed by a single open file.
///
/// Grounded on the teacher's `PageCache::read_page`/`load_page` (seek to
/// `page_number * page_size`, `read_exact` the bytes), minus the write-back
/// buffer pool machinery this read-only engine has no use for.
pub struct PageStore<D: RawPageDecoder = DefaultPageDecoder> {
    file: Mutex<File>,
    page_size: AtomicUsize,
    decoder: D,
}

impl PageStore<DefaultPageDecoder> {
    pub fn open(file: File) -> Self {
        Self::with_decoder(file, DefaultPageDecoder)
    }
}

impl<D: RawPageDecoder> PageStore<D> {
    pub fn with_decoder(file: File, decoder: D) -> Self {
        Self {
            file: Mutex::new(file),
            page_size: AtomicUsize::new(DEFAULT_PAGE_SIZE),
            decoder,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size.load(Ordering::Relaxed)
    }

    pub fn set_page_size(&self, size: usize) {
        self.page_size.store(size, Ordering::Relaxed);
    }

    /// Fetch and decode the page at `page_number`.
    ///
    /// The returned [`Page`] owns its data; calling `release` on it (in this
    /// engine, simply letting it drop) returns nothing to the store, since
    /// this is a read-only, non-caching source.
    pub fn fetch(&self, page_number: PageNumber) -> EseResult<Page> {
        let bytes = self.read_page_bytes(page_number)?;
        debug!("fetched page {} ({} bytes)", page_number, bytes.len());
        self.decoder.decode(page_number, &bytes)
    }

    fn read_page_bytes(&self, page_number: PageNumber) -> EseResult<Vec<u8>> {
        let page_size = self.page_size();
        let start = page_number as u64 * page_size as u64;

        let mut file = self
            .file
            .lock()
            .map_err(|_| EseError::new(ErrorKind::IOFailure, "page store mutex poisoned"))?;

        file.seek(SeekFrom::Start(start)).map_err(|e| {
            EseError::from_io(
                ErrorKind::IOFailure,
                format!("seek to page {} failed", page_number),
                e,
            )
        })?;

        let mut buf = vec![0u8; page_size];
        file.read_exact(&mut buf).map_err(|e| {
            EseError::from_io(
                ErrorKind::IOFailure,
                format!("read of page {} failed", page_number),
                e,
            )
        })?;
        Ok(buf)
    }
}

/// Release a page back to its source. For this read-only, non-caching
/// engine that is simply letting the value drop; this function exists so
/// call sites in the traversal engine read the same as the specification's
/// `release(page)` step, instead of relying on an implicit scope exit.
pub fn release(_page: Page) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build_page_bytes(
        page_number: u32,
        previous: u32,
        next: u32,
        fdp: u32,
        flags: PageFlags,
        values: &[(u8, &[u8])],
    ) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&page_number.to_le_bytes());
        out.extend_from_slice(&previous.to_le_bytes());
        out.extend_from_slice(&next.to_le_bytes());
        out.extend_from_slice(&fdp.to_le_bytes());
        out.extend_from_slice(&flags.bits().to_le_bytes());
        out.extend_from_slice(&(values.len() as u16).to_le_bytes());
        for (flags, data) in values {
            out.extend_from_slice(&(data.len() as u16).to_le_bytes());
            out.push(*flags);
            out.extend_from_slice(data);
        }
        out
    }

    fn temp_file_with(bytes: &[u8]) -> File {
        let path = std::env::temp_dir().join(format!(
            "esedb_pagetree_test_{}_{:?}",
            std::process::id(),
            std::time::SystemTime::now()
        ));
        let mut f = File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        drop(f);
        File::options().read(true).write(true).open(&path).unwrap()
    }

    #[test]
    fn fetch_round_trips_a_well_formed_page() {
        let page_size = 128usize;
        let mut bytes =
            build_page_bytes(0, 0, 0, 7, PageFlags::IS_ROOT, &[(0, &[1, 2, 3, 4])]);
        bytes.resize(page_size, 0);

        let file = temp_file_with(&bytes);
        let store = PageStore::open(file);
        store.set_page_size(page_size);

        let page = store.fetch(0).unwrap();
        assert_eq!(page.fdp_object_id, 7);
        assert!(page.is_root());
        assert_eq!(page.tagged_values.len(), 1);
        assert_eq!(page.tagged_values[0].data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn fetch_past_end_of_file_is_io_failure() {
        let page_size = 64usize;
        let bytes = vec![0u8; page_size];
        let file = temp_file_with(&bytes);
        let store = PageStore::open(file);
        store.set_page_size(page_size);

        let err = store.fetch(5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IOFailure);
    }
}
