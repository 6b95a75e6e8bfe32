use std::collections::HashSet;

use log::warn;

use crate::definitions::{CatalogDecoder, DataDecoder};
use crate::page::{ModeFlags, Page, PageNumber, RawPageDecoder, CHILD_PAGE_NUMBER_GUARDRAIL};
use crate::types::EseResult;

use super::keys::{parse_child_page_number, parse_key_prefix};
use super::PageTree;

struct LeafLinkInfo {
    page_number: PageNumber,
    next_page_number: PageNumber,
}

impl<'s, C, D, PD> PageTree<'s, C, D, PD>
where
    C: CatalogDecoder,
    D: DataDecoder,
    PD: RawPageDecoder,
{
    /// Walks the internal-node values of `page` (a root or parent page),
    /// fetching and dispatching each child in tagged-value order.
    pub(super) fn child_walk(
        &mut self,
        page: &Page,
        mode: ModeFlags,
        visited: &mut HashSet<PageNumber>,
    ) -> EseResult<()> {
        let mut previous_leaf: Option<LeafLinkInfo> = None;

        for (index, value) in page.tagged_values.iter().enumerate().skip(1) {
            let parsed = parse_key_prefix(page.page_number, index, value)?;
            let child_page_number = parse_child_page_number(page.page_number, index, parsed.remaining)?;

            if child_page_number >= CHILD_PAGE_NUMBER_GUARDRAIL {
                // TODO: see CHILD_PAGE_NUMBER_GUARDRAIL — no page-count bound available here yet.
                warn!(
                    "page {} value {}: child page number {} at or past the guardrail, skipping",
                    page.page_number, index, child_page_number
                );
                continue;
            }

            if !visited.insert(child_page_number) {
                return Err(crate::error::EseError::unsupported(format!(
                    "page {} already visited via a back-edge from page {}",
                    child_page_number, page.page_number
                )));
            }

            let child = self.store.fetch(child_page_number)?;
            if child.fdp_object_id != page.fdp_object_id {
                return Err(crate::error::EseError::unsupported(format!(
                    "child page {} has fdp object id {}, expected {}",
                    child.page_number, child.fdp_object_id, page.fdp_object_id
                )));
            }

            if child.is_leaf() {
                if let Some(prev) = &previous_leaf {
                    if child.page_number != prev.next_page_number
                        || child.previous_page_number != prev.page_number
                    {
                        warn!(
                            "sibling linkage mismatch: page {} (prev={}, next={}) does not chain from page {} (next={})",
                            child.page_number,
                            child.previous_page_number,
                            child.next_page_number,
                            prev.page_number,
                            prev.next_page_number
                        );
                    }
                }
                self.leaf_walk(&child, mode)?;
                previous_leaf = Some(LeafLinkInfo {
                    page_number: child.page_number,
                    next_page_number: child.next_page_number,
                });
            } else if child.is_parent() {
                self.parent_walk(&child, mode, visited)?;
            } else {
                warn!(
                    "page {} value {}: child page {} is neither IS_LEAF nor IS_PARENT, skipping",
                    page.page_number, index, child.page_number
                );
            }

            crate::page::release(child);
        }

        Ok(())
    }
}
