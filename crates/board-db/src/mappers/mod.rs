//! Entity to model mappers
//!
//! - `From<Model>`/`TryFrom<Model>` for entities: database rows to domain objects
//! - helpers that shape entity fields for binding

mod ban;
mod board;
mod post;
mod thread;
mod user;
mod user_token;

pub use board::category_names;
pub use post::dimension;
pub use thread::assemble_thread;
