//! Extractors that turn malformed input into [`AppError`](crate::AppError) responses.

pub mod id_path;

pub use id_path::IdPath;
