pub mod entities;
pub mod models;
pub mod repositories;
pub mod value_objects;

pub use dendro_errors::{BindingKind, DendroError, DendroResult};
pub use entities::*;
pub use models::*;
pub use repositories::*;
pub use value_objects::*;
