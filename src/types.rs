use crate::error::EseError;

// Type alias, not a new type, cannot define methods on it
pub type EseResult<T> = Result<T, EseError>;
pub type VoidResult = Result<(), EseError>;
