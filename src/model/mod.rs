mod draft;
mod errors;
mod field;
mod payload;
mod state;

pub use draft::*;
pub use errors::*;
pub use field::*;
pub use payload::*;
pub use state::*;
