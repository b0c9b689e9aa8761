//! Type definitions for raw interactions and strength weights

pub mod field;
pub mod id;
pub mod label;
pub mod record;
pub mod table;
pub mod weights;

pub use field::{parse_packed_field, FieldValue, PackedToken};
pub use id::RawId;
pub use label::Label;
pub use record::InteractionRecord;
pub use table::InteractionTable;
pub use weights::{NumericWeights, StrengthWeights};
