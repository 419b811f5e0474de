//! docweave - multi-page HTML documents from markdown templates.
//!
//! Templates mix markdown with fun-dsl calls such as
//! `%$ line(y=sales, title='Sales') $%`. Each call is evaluated against a
//! variable [`fundsl::Context`], dispatched through a
//! [`preprocess::FunctionTable`] and replaced by the markup it returns.
//! Scripts and stylesheets a call needs travel with its markup and end up
//! once in the page head.

pub mod build;
pub mod builtins;
pub mod cli;
pub mod config;
pub mod docs;
pub mod fundsl;
pub mod preprocess;
pub mod render;
pub mod utils;
