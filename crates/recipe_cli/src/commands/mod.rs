//! CLI commands.

pub mod categories;
pub mod common;
pub mod delete;
pub mod edit;
pub mod form;
pub mod init;
pub mod new;
pub mod preview;
pub mod show;
