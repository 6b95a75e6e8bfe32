use std::convert::TryInto;

use crate::error::EseError;
use crate::page::{PageNumber, TagFlags, TaggedValue};
use crate::types::EseResult;

/// The `[key_type:u16 if HAS_KEY_TYPE] | key_size:u16 | key_bytes[key_size]`
/// prefix shared by parent-page and leaf-page tagged values.
pub struct ParsedKeyPrefix<'a> {
    pub key_type: Option<u16>,
    pub key: &'a [u8],
    pub remaining: &'a [u8],
}

/// Parse the key prefix out of one tagged value, bounds-checking
/// `key_size` against what is left in the value after the size field.
///
/// `page_number` and `value_index` are only used to make the error message
/// actionable; they carry no semantic weight.
pub fn parse_key_prefix(
    page_number: PageNumber,
    value_index: usize,
    value: &TaggedValue,
) -> EseResult<ParsedKeyPrefix<'_>> {
    let data = &value.data[..];
    let tag_flags = TagFlags::from_bits_truncate(value.flags);

    let mut offset = 0usize;
    let mut key_type = None;
    if tag_flags.contains(TagFlags::HAS_KEY_TYPE) {
        if data.len() < offset + 2 {
            return Err(EseError::out_of_range(format!(
                "page {} value {}: truncated key-type prefix",
                page_number, value_index
            )));
        }
        key_type = Some(u16::from_le_bytes(data[offset..offset + 2].try_into().unwrap()));
        offset += 2;
    }

    if data.len() < offset + 2 {
        return Err(EseError::out_of_range(format!(
            "page {} value {}: truncated key-size field",
            page_number, value_index
        )));
    }
    let key_size = u16::from_le_bytes(data[offset..offset + 2].try_into().unwrap()) as usize;
    offset += 2;

    let remaining_after_size = data.len() - offset;
    if key_size > remaining_after_size {
        return Err(EseError::out_of_range(format!(
            "page {} value {}: key size {} exceeds remaining payload {}",
            page_number, value_index, key_size, remaining_after_size
        )));
    }

    let key = &data[offset..offset + key_size];
    offset += key_size;
    let remaining = &data[offset..];

    Ok(ParsedKeyPrefix {
        key_type,
        key,
        remaining,
    })
}

/// Read the `child_page_number:u32` tail that follows the key prefix on a
/// parent-page value.
pub fn parse_child_page_number(
    page_number: PageNumber,
    value_index: usize,
    remaining: &[u8],
) -> EseResult<PageNumber> {
    if remaining.len() < 4 {
        return Err(EseError::out_of_range(format!(
            "page {} value {}: missing child page number",
            page_number, value_index
        )));
    }
    Ok(u32::from_le_bytes(remaining[0..4].try_into().unwrap()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_without_key_type() {
        let value = TaggedValue::new(0x00, vec![2, 0, 0xAA, 0xBB, 9, 9]);
        let parsed = parse_key_prefix(1, 1, &value).unwrap();
        assert!(parsed.key_type.is_none());
        assert_eq!(parsed.key, &[0xAA, 0xBB]);
        assert_eq!(parsed.remaining, &[9, 9]);
    }

    #[test]
    fn parses_key_with_key_type_prefix() {
        let value = TaggedValue::new(0x04, vec![0x34, 0x12, 1, 0, 0xFF, 7]);
        let parsed = parse_key_prefix(1, 1, &value).unwrap();
        assert_eq!(parsed.key_type, Some(0x1234));
        assert_eq!(parsed.key, &[0xFF]);
        assert_eq!(parsed.remaining, &[7]);
    }

    #[test]
    fn over_long_key_is_out_of_range() {
        let value = TaggedValue::new(0x00, vec![5, 0, 1, 2]);
        let err = parse_key_prefix(1, 1, &value).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::OutOfRange);
    }
}
