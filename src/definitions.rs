//! Catalog and data definitions, and the traits the two external decoders
//! named in SPEC_FULL.md §6 must implement.
//!
//! The engine inspects `kind`, `fdp_object_id`, and `identifier` directly
//! (they drive the catalog-building dispatch in `tree::leaf`); everything
//! else about a definition's payload is opaque to it.

use crate::types::EseResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Table,
    Column,
    Index,
    LongValue,
}

/// One record describing a schema element, as produced by the external
/// catalog decoder from a leaf page's raw bytes.
#[derive(Debug, Clone)]
pub struct CatalogDefinition {
    pub kind: CatalogKind,
    pub fdp_object_id: u32,
    pub identifier: String,
    pub payload: Vec<u8>,
}

/// A table's catalog definition plus everything attached to it during a
/// catalog traversal: its columns, its indexes, and at most one long-value
/// column definition.
#[derive(Debug, Clone)]
pub struct TableDefinition {
    pub table: CatalogDefinition,
    pub columns: Vec<CatalogDefinition>,
    pub indexes: Vec<CatalogDefinition>,
    pub long_value: Option<CatalogDefinition>,
}

impl TableDefinition {
    pub fn new(table: CatalogDefinition) -> Self {
        Self {
            table,
            columns: Vec::new(),
            indexes: Vec::new(),
            long_value: None,
        }
    }

    pub fn fdp_object_id(&self) -> u32 {
        self.table.fdp_object_id
    }

    pub fn identifier(&self) -> &str {
        &self.table.identifier
    }
}

/// Decodes a catalog leaf record from its raw bytes.
///
/// The byte-level grammar of a catalog definition record is out of scope
/// for this crate (SPEC_FULL.md §1); this trait is the seam a concrete
/// decoder plugs into.
pub trait CatalogDecoder {
    fn decode(&self, bytes: &[u8]) -> EseResult<CatalogDefinition>;
}

/// Decodes a row (data definition) leaf record against a table's columns.
///
/// `Output` is left to the implementor: this engine only appends whatever
/// comes back, in traversal order, to its row registry.
pub trait DataDecoder {
    type Output;

    fn decode(&self, columns: &[CatalogDefinition], bytes: &[u8]) -> EseResult<Self::Output>;
}
