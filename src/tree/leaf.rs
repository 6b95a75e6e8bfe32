use log::trace;

use crate::definitions::{CatalogDecoder, CatalogKind, DataDecoder};
use crate::error::EseError;
use crate::page::{ModeFlags, Page, PageFlags, RawPageDecoder};
use crate::types::EseResult;

use super::keys::parse_key_prefix;
use super::{missing_table_for_fdp, PageTree};

impl<'s, C, D, PD> PageTree<'s, C, D, PD>
where
    C: CatalogDecoder,
    D: DataDecoder,
    PD: RawPageDecoder,
{
    /// The leaf-level dispatcher: index and long-value entries go to
    /// observability only, primary-data entries go to the catalog-building
    /// or row-reading branch depending on `mode`.
    pub(super) fn leaf_walk(&mut self, page: &Page, mode: ModeFlags) -> EseResult<()> {
        let required = PageFlags::IS_LEAF;
        let supported = PageFlags::IS_LEAF
            | PageFlags::IS_ROOT
            | PageFlags::IS_INDEX
            | PageFlags::IS_LONG_VALUE
            | PageFlags::IS_PRIMARY
            | PageFlags::IS_NEW_RECORD_FORMAT;
        if !page.flags.conforms_to(required, supported) {
            return Err(EseError::unsupported(format!(
                "leaf page {} has unsupported flags {:?}",
                page.page_number, page.flags
            )));
        }

        for (index, value) in page.tagged_values.iter().enumerate().skip(1) {
            let parsed = parse_key_prefix(page.page_number, index, value)?;

            if page.flags.contains(PageFlags::IS_INDEX) {
                trace!(
                    "leaf page {} value {}: index entry, {} bytes",
                    page.page_number,
                    index,
                    parsed.remaining.len()
                );
            } else if page.flags.contains(PageFlags::IS_LONG_VALUE) {
                trace!(
                    "leaf page {} value {}: long-value entry, {} bytes",
                    page.page_number,
                    index,
                    parsed.remaining.len()
                );
            } else if mode.contains(ModeFlags::READ_CATALOG_DEFINITION) {
                self.catalog_branch(parsed.remaining)?;
            } else {
                self.row_branch(parsed.remaining)?;
            }
        }

        Ok(())
    }

    fn catalog_branch(&mut self, bytes: &[u8]) -> EseResult<()> {
        let cat = self.catalog_decoder.decode(bytes)?;

        if cat.kind != CatalogKind::Table {
            let current_matches = self
                .current_table
                .map(|idx| self.tables[idx].fdp_object_id() == cat.fdp_object_id)
                .unwrap_or(false);

            if !current_matches {
                match self.find_table_by_fdp(cat.fdp_object_id) {
                    Some(idx) => self.current_table = Some(idx),
                    None => return Err(missing_table_for_fdp(cat.fdp_object_id)),
                }
            }
        }

        match cat.kind {
            CatalogKind::Table => {
                self.tables.push(crate::definitions::TableDefinition::new(cat));
                self.current_table = Some(self.tables.len() - 1);
                Ok(())
            }
            CatalogKind::Column => {
                let idx = self.require_current_table()?;
                self.tables[idx].columns.push(cat);
                Ok(())
            }
            CatalogKind::Index => {
                let idx = self.require_current_table()?;
                self.tables[idx].indexes.push(cat);
                Ok(())
            }
            CatalogKind::LongValue => {
                let idx = self.require_current_table()?;
                self.tables[idx].long_value = Some(cat);
                Ok(())
            }
        }
    }

    fn require_current_table(&self) -> EseResult<usize> {
        self.current_table
            .ok_or_else(|| EseError::missing_state("no current table for a non-Table catalog record"))
    }

    fn row_branch(&mut self, bytes: &[u8]) -> EseResult<()> {
        let schema = self
            .bound_schema
            .as_ref()
            .ok_or_else(|| EseError::missing_state("row mode requires a bound table definition"))?;
        let row = self.data_decoder.decode(&schema.columns, bytes)?;
        self.rows.push(row);
        Ok(())
    }
}
