use std::collections::HashSet;

use crate::definitions::{CatalogDecoder, DataDecoder};
use crate::error::EseError;
use crate::page::{ModeFlags, Page, PageFlags, PageNumber, RawPageDecoder};
use crate::types::EseResult;

use super::PageTree;

impl<'s, C, D, PD> PageTree<'s, C, D, PD>
where
    C: CatalogDecoder,
    D: DataDecoder,
    PD: RawPageDecoder,
{
    /// A parent (internal) page: validate its role, skip its opaque header
    /// value, then walk its children.
    pub(super) fn parent_walk(
        &mut self,
        page: &Page,
        mode: ModeFlags,
        visited: &mut HashSet<PageNumber>,
    ) -> EseResult<()> {
        let required = PageFlags::IS_PARENT;
        let supported = PageFlags::IS_PARENT
            | PageFlags::IS_ROOT
            | PageFlags::IS_INDEX
            | PageFlags::IS_LONG_VALUE
            | PageFlags::IS_PRIMARY
            | PageFlags::IS_NEW_RECORD_FORMAT;
        if !page.flags.conforms_to(required, supported) {
            return Err(EseError::unsupported(format!(
                "parent page {} has unsupported flags {:?}",
                page.page_number, page.flags
            )));
        }
        if !page.has_zero_siblings() {
            return Err(EseError::unsupported(format!(
                "parent page {} is linked to a sibling; the parent header page must be unlinked",
                page.page_number
            )));
        }

        self.child_walk(page, mode, visited)
    }
}
