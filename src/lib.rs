mod document;
mod field;
mod kind;
mod live;
mod serde_field;
mod session;
mod validate;
mod value;

pub use document::*;
pub use field::*;
pub use kind::*;
pub use live::*;
pub use serde_field::*;
pub use session::*;
pub use validate::*;
pub use value::*;
