use bitflags::bitflags;

bitflags! {
    /// Role bits carried on a page's header.
    ///
    /// These are jet-blue's on-disk page flags; the exact bit positions are
    /// private to this engine (the upstream format keeps them in a header
    /// this crate does not parse), so they are assigned contiguously here
    /// rather than copied from a non-public reference.
    pub struct PageFlags: u32 {
        const IS_ROOT              = 0b0000_0001;
        const IS_LEAF               = 0b0000_0010;
        const IS_PARENT             = 0b0000_0100;
        const IS_SPACE_TREE         = 0b0000_1000;
        const IS_INDEX              = 0b0001_0000;
        const IS_LONG_VALUE         = 0b0010_0000;
        const IS_PRIMARY            = 0b0100_0000;
        const IS_NEW_RECORD_FORMAT  = 0b1000_0000;
    }
}

impl PageFlags {
    /// `true` when `self` contains every bit in `required` and no bit
    /// outside of `supported`.
    pub fn conforms_to(self, required: PageFlags, supported: PageFlags) -> bool {
        self.contains(required) && supported.contains(self)
    }
}

bitflags! {
    /// Per-slot flags on a single tagged value within a page.
    pub struct TagFlags: u8 {
        /// First 2 bytes of the value are a key-type prefix.
        const HAS_KEY_TYPE = 0x04;
        /// Reserved combination; set on a space-tree leaf entry is fatal.
        const SPACE_TREE_RESERVED = 0x05;
        /// Entry is excluded from the running "pages allocated" total.
        const SPACE_TREE_EXCLUDE_FROM_TOTAL = 0x02;
    }
}

bitflags! {
    /// Caller-supplied traversal mode.
    pub struct ModeFlags: u8 {
        const READ_CATALOG_DEFINITION = 0x01;
    }
}

/// The magic sentinel above which a child page number in `ChildWalk` is
/// treated as an out-of-range placeholder and silently skipped. Retained
/// verbatim rather than replaced with a page-count-derived bound, since no
/// caller-supplied page count reaches this layer yet; see DESIGN.md.
// TODO: replace with a bound derived from the file's total page count once
// that count is available at traversal time.
pub const CHILD_PAGE_NUMBER_GUARDRAIL: u32 = 0x117F02;

/// Reserved range for `space_tree_page_number`; values at or above this are
/// rejected as corrupt.
pub const SPACE_TREE_PAGE_NUMBER_RESERVED: u32 = 0xFF00_0000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conforms_to_accepts_required_plus_permitted_extras() {
        let flags = PageFlags::IS_ROOT | PageFlags::IS_PARENT;
        let required = PageFlags::IS_ROOT;
        let supported = PageFlags::IS_ROOT
            | PageFlags::IS_PARENT
            | PageFlags::IS_INDEX
            | PageFlags::IS_LONG_VALUE
            | PageFlags::IS_PRIMARY
            | PageFlags::IS_NEW_RECORD_FORMAT;
        assert!(flags.conforms_to(required, supported));
    }

    #[test]
    fn conforms_to_rejects_missing_required_bit() {
        let flags = PageFlags::IS_PARENT;
        assert!(!flags.conforms_to(PageFlags::IS_ROOT, PageFlags::all()));
    }

    #[test]
    fn conforms_to_rejects_stray_bit() {
        let flags = PageFlags::IS_ROOT | PageFlags::IS_LEAF;
        let supported = PageFlags::IS_ROOT | PageFlags::IS_PARENT;
        assert!(!flags.conforms_to(PageFlags::IS_ROOT, supported));
    }
}
