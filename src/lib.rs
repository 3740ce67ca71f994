pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;

pub use config::Config;
pub use db::{init_db, RepoError, Repository};
pub use domain::{FieldViolation, Item, ItemId, ItemPatch, NewItem, ValidationErrors};
pub use error::AppError;
