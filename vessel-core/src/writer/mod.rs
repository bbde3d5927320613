mod context;
mod mysql;
mod postgres;
mod sql_writer;

pub use context::*;
pub use mysql::*;
pub use postgres::*;
pub use sql_writer::*;
