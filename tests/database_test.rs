use std::fs::File;
use std::io::Write;

use esedb::db::Database;
use esedb::definitions::{CatalogDecoder, CatalogDefinition, CatalogKind, DataDecoder};
use esedb::page::{DefaultPageDecoder, PageFlags, PageNumber};
use esedb::types::EseResult;

struct CsvCatalogDecoder;

impl CatalogDecoder for CsvCatalogDecoder {
    fn decode(&self, bytes: &[u8]) -> EseResult<CatalogDefinition> {
        let kind = match bytes[0] {
            0 => CatalogKind::Table,
            1 => CatalogKind::Column,
            2 => CatalogKind::Index,
            _ => CatalogKind::LongValue,
        };
        let fdp_object_id = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        let identifier_len = u16::from_le_bytes([bytes[5], bytes[6]]) as usize;
        let identifier = String::from_utf8(bytes[7..7 + identifier_len].to_vec()).unwrap();
        Ok(CatalogDefinition {
            kind,
            fdp_object_id,
            identifier,
            payload: Vec::new(),
        })
    }
}

struct NoOpDataDecoder;

impl DataDecoder for NoOpDataDecoder {
    type Output = ();

    fn decode(&self, _columns: &[CatalogDefinition], _bytes: &[u8]) -> EseResult<()> {
        Ok(())
    }
}

fn catalog_record(kind: u8, fdp_object_id: u32, identifier: &str) -> Vec<u8> {
    let mut out = vec![kind];
    out.extend_from_slice(&fdp_object_id.to_le_bytes());
    out.extend_from_slice(&(identifier.len() as u16).to_le_bytes());
    out.extend_from_slice(identifier.as_bytes());
    out
}

fn keyless(payload: Vec<u8>) -> Vec<u8> {
    let mut out = vec![0u8, 0u8];
    out.extend(payload);
    out
}

fn child_pointer(child_page_number: PageNumber) -> Vec<u8> {
    keyless(child_page_number.to_le_bytes().to_vec())
}

fn fdp_header() -> Vec<u8> {
    vec![0u8; 16]
}

fn build_page_bytes(
    page_number: PageNumber,
    fdp: u32,
    flags: PageFlags,
    values: &[Vec<u8>],
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&page_number.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&fdp.to_le_bytes());
    out.extend_from_slice(&flags.bits().to_le_bytes());
    out.extend_from_slice(&(values.len() as u16).to_le_bytes());
    for data in values {
        out.extend_from_slice(&(data.len() as u16).to_le_bytes());
        out.push(0u8);
        out.extend_from_slice(data);
    }
    out
}

#[test]
fn database_open_builds_a_catalog_with_one_table() {
    let page_size = 512usize;

    let leaf = build_page_bytes(
        1,
        2,
        PageFlags::IS_LEAF,
        &[
            Vec::new(),
            keyless(catalog_record(0, 2, "accounts")),
            keyless(catalog_record(1, 2, "id")),
        ],
    );
    let root = build_page_bytes(
        0,
        2,
        PageFlags::IS_ROOT,
        &[fdp_header(), child_pointer(1)],
    );

    let mut buf = vec![0u8; page_size * 2];
    buf[0..root.len()].copy_from_slice(&root);
    buf[page_size..page_size + leaf.len()].copy_from_slice(&leaf);

    let path = std::env::temp_dir().join(format!(
        "esedb_database_test_{}_{:?}",
        std::process::id(),
        std::time::SystemTime::now()
    ));
    let mut f = File::create(&path).unwrap();
    f.write_all(&buf).unwrap();
    drop(f);
    let file = File::options().read(true).write(true).open(&path).unwrap();

    let db = Database::open(
        file,
        DefaultPageDecoder,
        CsvCatalogDecoder,
        NoOpDataDecoder,
        0,
        page_size,
    )
    .unwrap();

    assert_eq!(db.catalog().len(), 1);
    assert_eq!(db.catalog().root_page_number("accounts"), Some(2));
    assert_eq!(db.catalog().root_page_number("missing"), None);
}
