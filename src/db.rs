//! The top-level `Database`/`Catalog` facade: binds table names to root FDP
//! page numbers over one open file, mirroring the teacher's `Database`/
//! `Catalog` split but as an owned, read-only lookup rather than a mutable,
//! process-wide buffer pool.

use std::collections::HashMap;
use std::fs::File;

use log::info;

use crate::definitions::{CatalogDecoder, DataDecoder};
use crate::error::EseError;
use crate::page::{ModeFlags, PageNumber, PageStore, RawPageDecoder};
use crate::tree::PageTree;
use crate::types::EseResult;

/// The well-known root page of the MSysObjects catalog tree in a real ESE
/// file; overridable for synthetic or non-standard layouts.
pub const DEFAULT_CATALOG_ROOT_PAGE: PageNumber = 4;

/// Maps table name to root FDP page number, as read off the catalog tree.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: HashMap<String, PageNumber>,
}

impl Catalog {
    pub fn root_page_number(&self, table_name: &str) -> Option<PageNumber> {
        self.tables.get(table_name).copied()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Owns one `PageStore` and the `Catalog` built from it.
pub struct Database<PD: RawPageDecoder> {
    store: PageStore<PD>,
    catalog: Catalog,
}

impl<PD: RawPageDecoder> Database<PD> {
    /// Open `file` and build the catalog by running a `PageTree` over
    /// `catalog_root_page` in `BuildCatalog` mode. `page_size` overrides the
    /// store's default (see `PageStore::set_page_size`) before any page is
    /// fetched.
    pub fn open<C, D>(
        file: File,
        decoder: PD,
        catalog_decoder: C,
        data_decoder: D,
        catalog_root_page: PageNumber,
        page_size: usize,
    ) -> EseResult<Self>
    where
        C: CatalogDecoder,
        D: DataDecoder,
    {
        let store = PageStore::with_decoder(file, decoder);
        store.set_page_size(page_size);
        let catalog = build_catalog(&store, catalog_decoder, data_decoder, catalog_root_page)?;
        info!("catalog loaded: {} table(s)", catalog.len());
        Ok(Database { store, catalog })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &PageStore<PD> {
        &self.store
    }
}

fn build_catalog<C, D, PD>(
    store: &PageStore<PD>,
    catalog_decoder: C,
    data_decoder: D,
    catalog_root_page: PageNumber,
) -> EseResult<Catalog>
where
    C: CatalogDecoder,
    D: DataDecoder,
    PD: RawPageDecoder,
{
    let mut tree = PageTree::initialise(store, catalog_decoder, data_decoder, None);
    tree.read(catalog_root_page, ModeFlags::READ_CATALOG_DEFINITION)?;

    let mut tables = HashMap::new();
    for table in tree.into_tables() {
        let identifier = table.identifier().to_string();
        let root = root_page_from_payload(&identifier, table.fdp_object_id())?;
        tables.insert(identifier, root);
    }
    Ok(Catalog { tables })
}

/// Placeholder mapping from a catalog-built `TableDefinition` to its data
/// tree's root FDP page number. The byte-level catalog record grammar that
/// would carry this value is out of scope (SPEC_FULL.md §1/§6); this engine
/// only knows a table's FDP object id, which real ESE catalogs also use as
/// the data tree's root page number.
fn root_page_from_payload(_identifier: &str, fdp_object_id: u32) -> EseResult<PageNumber> {
    if fdp_object_id == 0 {
        return Err(EseError::unsupported("table fdp object id 0 is not a valid root page"));
    }
    Ok(fdp_object_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_catalog_has_no_tables() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.root_page_number("accounts"), None);
    }
}
