pub mod changelist;
pub mod command_utils;
pub mod config;
pub mod error;
pub mod git;
pub mod gitea;
pub mod import;
