//! Rows of the administrative system tables, parsed and produced through the
//! converters, the resolver and [`ObjectConverter`](crate::ObjectConverter).

#![forbid(unsafe_code)]

pub mod db_config;
pub mod server_config;
pub mod server_status;
pub mod table_config;

pub use db_config::DatabaseConfig;
pub use server_config::ServerConfig;
pub use server_status::ServerStatus;
pub use table_config::{Durability, TableConfig};
