use std::collections::HashSet;
use std::convert::TryInto;

use log::debug;

use crate::definitions::{CatalogDecoder, DataDecoder};
use crate::error::EseError;
use crate::page::{ModeFlags, Page, PageFlags, PageNumber, RawPageDecoder, SPACE_TREE_PAGE_NUMBER_RESERVED};
use crate::types::EseResult;

use super::PageTree;

/// `initial_amount_of_pages | parent_fdp_number | extent_space |
/// space_tree_page_number`, each a little-endian u32 — the first 16 bytes
/// of an FDP root page's value 0.
struct FdpHeader {
    #[allow(dead_code)]
    initial_amount_of_pages: u32,
    #[allow(dead_code)]
    parent_fdp_number: u32,
    extent_space: u32,
    space_tree_page_number: u32,
}

impl FdpHeader {
    fn decode(page_number: PageNumber, bytes: &[u8]) -> EseResult<Self> {
        if bytes.len() < 16 {
            return Err(EseError::unsupported(format!(
                "page {}: FDP header shorter than 16 bytes",
                page_number
            )));
        }
        Ok(FdpHeader {
            initial_amount_of_pages: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            parent_fdp_number: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            extent_space: u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
            space_tree_page_number: u32::from_le_bytes(bytes[12..16].try_into().unwrap()),
        })
    }
}

impl<'s, C, D, PD> PageTree<'s, C, D, PD>
where
    C: CatalogDecoder,
    D: DataDecoder,
    PD: RawPageDecoder,
{
    /// The root-page handler: validates the FDP header, reads the paired
    /// space trees if present, then descends into data via `child_walk`.
    pub(super) fn fdp_walk(
        &mut self,
        page: &Page,
        mode: ModeFlags,
        visited: &mut HashSet<PageNumber>,
    ) -> EseResult<()> {
        let required = PageFlags::IS_ROOT;
        let supported = PageFlags::IS_ROOT
            | PageFlags::IS_PARENT
            | PageFlags::IS_INDEX
            | PageFlags::IS_LONG_VALUE
            | PageFlags::IS_PRIMARY
            | PageFlags::IS_NEW_RECORD_FORMAT;
        if !page.flags.conforms_to(required, supported) {
            return Err(EseError::unsupported(format!(
                "FDP root page {} has unsupported flags {:?}",
                page.page_number, page.flags
            )));
        }
        if !page.has_zero_siblings() {
            return Err(EseError::unsupported(format!(
                "FDP root page {} is linked to a sibling",
                page.page_number
            )));
        }

        let header_value = page.tagged_values.get(0).ok_or_else(|| {
            EseError::unsupported(format!("FDP root page {} has no header value", page.page_number))
        })?;
        let header = FdpHeader::decode(page.page_number, &header_value.data)?;

        if header.extent_space > 0 {
            // Either condition alone marks the space tree page number corrupt.
            if header.space_tree_page_number == 0
                || header.space_tree_page_number >= SPACE_TREE_PAGE_NUMBER_RESERVED
            {
                return Err(EseError::unsupported(format!(
                    "FDP root page {}: space tree page number {} is zero or in the reserved range",
                    page.page_number, header.space_tree_page_number
                )));
            }

            for space_tree_page_number in
                [header.space_tree_page_number, header.space_tree_page_number + 1]
            {
                let space_tree_page = self.store.fetch(space_tree_page_number)?;
                if space_tree_page.fdp_object_id != page.fdp_object_id {
                    return Err(EseError::unsupported(format!(
                        "space tree page {} has fdp object id {}, expected {}",
                        space_tree_page.page_number, space_tree_page.fdp_object_id, page.fdp_object_id
                    )));
                }
                debug!(
                    "FDP root page {}: reading space tree page {}",
                    page.page_number, space_tree_page.page_number
                );
                self.space_tree_walk(&space_tree_page, visited)?;
                crate::page::release(space_tree_page);
            }
        }

        self.child_walk(page, mode, visited)
    }
}
