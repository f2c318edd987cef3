pub use helper::*;
pub use record::*;
pub use write_data::*;

pub mod helper;
pub mod record;
pub mod write_data;
