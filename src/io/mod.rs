mod coordinates;
mod imprint;
mod input;

pub use coordinates::*;
pub use imprint::{write_footer, write_header};
pub use input::*;
