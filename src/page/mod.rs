mod flags;
mod page;
mod store;

pub use flags::{ModeFlags, PageFlags, TagFlags, CHILD_PAGE_NUMBER_GUARDRAIL, SPACE_TREE_PAGE_NUMBER_RESERVED};
pub use page::{Page, PageNumber, TaggedValue, NO_PAGE};
pub use store::{release, DefaultPageDecoder, PageStore, RawPageDecoder, DEFAULT_PAGE_SIZE};
