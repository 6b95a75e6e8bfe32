use std::collections::HashSet;
use std::convert::TryInto;

use log::{debug, warn};

use crate::definitions::{CatalogDecoder, DataDecoder};
use crate::error::EseError;
use crate::page::{Page, PageFlags, PageNumber, RawPageDecoder, TagFlags, CHILD_PAGE_NUMBER_GUARDRAIL};
use crate::types::EseResult;

use super::keys::{parse_child_page_number, parse_key_prefix};
use super::PageTree;

/// `require_root` is set only for the top-level page named by the FDP
/// header's `space_tree_page_number`; pages reached one level further down
/// via `space_tree_parent_entries` are ordinary space-tree nodes and never
/// carry `IS_ROOT` themselves.
fn space_tree_flags(require_root: bool) -> (PageFlags, PageFlags) {
    let required = if require_root {
        PageFlags::IS_ROOT | PageFlags::IS_SPACE_TREE
    } else {
        PageFlags::IS_SPACE_TREE
    };
    let supported = PageFlags::IS_ROOT
        | PageFlags::IS_SPACE_TREE
        | PageFlags::IS_LEAF
        | PageFlags::IS_PARENT
        | PageFlags::IS_INDEX
        | PageFlags::IS_LONG_VALUE
        | PageFlags::IS_PRIMARY
        | PageFlags::IS_NEW_RECORD_FORMAT;
    (required, supported)
}

impl<'s, C, D, PD> PageTree<'s, C, D, PD>
where
    C: CatalogDecoder,
    D: DataDecoder,
    PD: RawPageDecoder,
{
    /// Reads a space-tree page: a leaf accumulates its allocated-page total
    /// (diagnostic only), a parent recurses using the same key/child-pointer
    /// parsing `ChildWalk` uses, confined to the space tree.
    pub(super) fn space_tree_walk(
        &mut self,
        page: &Page,
        visited: &mut HashSet<PageNumber>,
    ) -> EseResult<()> {
        self.space_tree_walk_impl(page, visited, true)
    }

    fn space_tree_walk_impl(
        &mut self,
        page: &Page,
        visited: &mut HashSet<PageNumber>,
        require_root: bool,
    ) -> EseResult<()> {
        let (required, supported) = space_tree_flags(require_root);
        if !page.flags.conforms_to(required, supported) {
            return Err(EseError::unsupported(format!(
                "space tree page {} has unsupported flags {:?}",
                page.page_number, page.flags
            )));
        }
        if !page.has_zero_siblings() {
            return Err(EseError::unsupported(format!(
                "space tree page {} is linked to a sibling",
                page.page_number
            )));
        }

        let mut start_index = 0usize;
        if let Some(header) = page.tagged_values.get(0) {
            let well_formed = header.data.is_empty()
                || (header.data.len() == 16 && header.data.iter().all(|&b| b == 0));
            if !well_formed {
                return Err(EseError::unsupported(format!(
                    "space tree page {} has a malformed header value",
                    page.page_number
                )));
            }
            start_index = 1;
        }

        if page.is_leaf() {
            self.space_tree_leaf_entries(page, start_index)
        } else if page.is_parent() {
            self.space_tree_parent_entries(page, start_index, visited)
        } else {
            Ok(())
        }
    }

    fn space_tree_leaf_entries(&mut self, page: &Page, start_index: usize) -> EseResult<()> {
        let mut total_pages: u64 = 0;

        for (index, value) in page.tagged_values.iter().enumerate().skip(start_index) {
            let tag_flags = TagFlags::from_bits_truncate(value.flags);
            if tag_flags.intersects(TagFlags::SPACE_TREE_RESERVED) {
                return Err(EseError::unsupported(format!(
                    "space tree page {} value {}: reserved tag flags set",
                    page.page_number, index
                )));
            }
            if value.data.len() != 16 {
                return Err(EseError::out_of_range(format!(
                    "space tree page {} value {}: entry size {} does not match the fixed layout",
                    page.page_number, index, value.data.len()
                )));
            }

            let key_size = u16::from_le_bytes(value.data[0..2].try_into().unwrap()) as usize;
            let amount_of_pages = u32::from_le_bytes(value.data[6..10].try_into().unwrap());
            let entry_flags = u16::from_le_bytes(value.data[10..12].try_into().unwrap());

            if key_size != 4 {
                return Err(EseError::unsupported(format!(
                    "space tree page {} value {}: key size {} != 4",
                    page.page_number, index, key_size
                )));
            }

            if entry_flags & 0x02 == 0 {
                total_pages += amount_of_pages as u64;
            }
        }

        debug!(
            "space tree page {}: {} pages allocated",
            page.page_number, total_pages
        );
        Ok(())
    }

    fn space_tree_parent_entries(
        &mut self,
        page: &Page,
        start_index: usize,
        visited: &mut HashSet<PageNumber>,
    ) -> EseResult<()> {
        for (index, value) in page.tagged_values.iter().enumerate().skip(start_index) {
            let parsed = parse_key_prefix(page.page_number, index, value)?;
            let child_page_number = parse_child_page_number(page.page_number, index, parsed.remaining)?;

            if child_page_number >= CHILD_PAGE_NUMBER_GUARDRAIL {
                warn!(
                    "space tree page {} value {}: child page number {} at or past the guardrail, skipping",
                    page.page_number, index, child_page_number
                );
                continue;
            }

            if !visited.insert(child_page_number) {
                return Err(EseError::unsupported(format!(
                    "space tree page {} already visited via a back-edge from page {}",
                    child_page_number, page.page_number
                )));
            }

            let child = self.store.fetch(child_page_number)?;
            if child.fdp_object_id != page.fdp_object_id {
                return Err(EseError::unsupported(format!(
                    "space tree child page {} has fdp object id {}, expected {}",
                    child.page_number, child.fdp_object_id, page.fdp_object_id
                )));
            }

            if child.is_leaf() || child.is_space_tree() {
                self.space_tree_walk_impl(&child, visited, false)?;
            } else {
                warn!(
                    "space tree page {} value {}: child page {} is neither a space-tree leaf nor parent, skipping",
                    page.page_number, index, child.page_number
                );
            }

            crate::page::release(child);
        }

        Ok(())
    }
}
