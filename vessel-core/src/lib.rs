mod as_value;
mod codec;
mod column;
mod connection;
mod database;
mod dialect;
mod driver;
mod error;
mod expression;
mod keywords;
mod logging;
mod metadata;
mod prepared;
mod query;
mod statement;
mod table;
mod transaction;
mod util;
mod value;
pub mod writer;

pub use ::anyhow::Context;
pub use as_value::*;
pub use codec::*;
pub use column::*;
pub use connection::*;
pub use database::*;
pub use dialect::*;
pub use driver::*;
pub use error::*;
pub use expression::*;
pub use keywords::*;
pub use logging::*;
pub use metadata::*;
pub use prepared::*;
pub use query::*;
pub use statement::*;
pub use table::*;
pub use transaction::*;
pub use util::*;
pub use value::*;
pub use writer::{
    GenericSqlWriter, KeywordCasing, MySqlSqlWriter, PostgresSqlWriter, SqlWriter, WriterConfig,
};

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
