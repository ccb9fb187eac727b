//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Session summary record (`SessionItem`) and its list view (`SessionView`)
//! - `index`: In-memory session index (`SessionIndex`)
//! - `repository`: Repository trait for persisting the index

mod index;
mod model;
mod repository;

pub use index::SessionIndex;
pub use model::{SessionItem, SessionView};
pub use repository::SessionRepository;
