pub mod daily_record;
pub mod field;
pub mod schema;

pub use daily_record::{DailyRecord, FieldValue};
pub use field::{Accumulate, FieldDefinition};
pub use schema::Schema;
