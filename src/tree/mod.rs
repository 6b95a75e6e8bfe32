//! The page-tree traversal engine: the mutually recursive walk over FDP,
//! parent, leaf, and space-tree pages that either builds a catalog or reads
//! rows against a previously built one.

mod child;
mod fdp;
mod keys;
mod leaf;
mod parent;
mod space_tree;


use std::collections::HashSet;

use log::warn;

use crate::definitions::{CatalogDecoder, DataDecoder, TableDefinition};
use crate::error::EseError;
use crate::page::{DefaultPageDecoder, ModeFlags, PageNumber, PageStore, RawPageDecoder};
use crate::types::EseResult;

/// Outcome of a lookup by table identifier, distinguishing "not present"
/// from a genuine traversal error.
pub enum TableLookup<'a> {
    Found(&'a TableDefinition),
    NotFound,
}

/// One traversal over a [`PageStore`], parameterised by the two external
/// decoders and, for row mode, a bound schema.
///
/// Not re-entrant: a `PageTree` is good for one `read` call. Two concurrent
/// traversals need two instances, each over their own `PageStore` borrow.
pub struct PageTree<'s, C, D, PD = DefaultPageDecoder>
where
    C: CatalogDecoder,
    D: DataDecoder,
    PD: RawPageDecoder,
{
    store: &'s PageStore<PD>,
    catalog_decoder: C,
    data_decoder: D,
    bound_schema: Option<TableDefinition>,
    tables: Vec<TableDefinition>,
    rows: Vec<D::Output>,
    current_table: Option<usize>,
}

impl<'s, C, D, PD> PageTree<'s, C, D, PD>
where
    C: CatalogDecoder,
    D: DataDecoder,
    PD: RawPageDecoder,
{
    /// Create an empty traversal. `bound_schema` must be supplied for row
    /// mode; it is ignored (but harmless) in catalog-building mode.
    pub fn initialise(
        store: &'s PageStore<PD>,
        catalog_decoder: C,
        data_decoder: D,
        bound_schema: Option<TableDefinition>,
    ) -> Self {
        PageTree {
            store,
            catalog_decoder,
            data_decoder,
            bound_schema,
            tables: Vec::new(),
            rows: Vec::new(),
            current_table: None,
        }
    }

    /// Fetch the root page and dispatch on its flags. A root tolerated as
    /// neither `IS_LEAF` nor `IS_ROOT` is an empty tree, not an error.
    pub fn read(&mut self, root_fdp_page_number: PageNumber, mode: ModeFlags) -> EseResult<()> {
        let root = self.store.fetch(root_fdp_page_number)?;

        let mut visited = HashSet::new();
        visited.insert(root.page_number);

        let result = if root.is_leaf() {
            self.leaf_walk(&root, mode)
        } else if root.is_root() {
            self.fdp_walk(&root, mode, &mut visited)
        } else {
            warn!(
                "root page {} is neither IS_LEAF nor IS_ROOT; treating as empty tree",
                root.page_number
            );
            Ok(())
        };

        crate::page::release(root);
        result
    }

    /// Linear scan over the table registry by identifier, matching §4.1 and
    /// testable property 5. This is the public lookup; the catalog-building
    /// branch's FDP-object-id rebind (§4.8) goes through `find_table_by_fdp`
    /// instead, since that is the only key it has in hand at that point.
    pub fn lookup_table_by_identifier(&self, identifier: &str) -> TableLookup<'_> {
        match self.tables.iter().find(|t| t.identifier() == identifier) {
            Some(t) => TableLookup::Found(t),
            None => TableLookup::NotFound,
        }
    }

    fn find_table_by_fdp(&self, fdp_object_id: u32) -> Option<usize> {
        self.tables.iter().position(|t| t.fdp_object_id() == fdp_object_id)
    }

    /// Consume the tree, handing back its table registry. Used after a
    /// `BuildCatalog` traversal.
    pub fn into_tables(self) -> Vec<TableDefinition> {
        self.tables
    }

    /// Consume the tree, handing back its row registry. Used after a
    /// `ReadRows` traversal.
    pub fn into_rows(self) -> Vec<D::Output> {
        self.rows
    }
}

pub(crate) fn missing_table_for_fdp(fdp_object_id: u32) -> EseError {
    EseError::unsupported(format!(
        "no table definition found for fdp object id {}",
        fdp_object_id
    ))
}
