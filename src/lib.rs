// Library root
// -----------
// The binary (`main.rs`) is a thin driver; everything it runs lives here so
// it can be tested without spawning the process.
//
// Module responsibilities:
// - `config`: command line + environment, resolved into a `Config`.
// - `api`: blocking HTTP client for the Discord user lookup and CDN download.
// - `avatar`: pure avatar URL / file name resolution.
// - `runner`: the per-line pipeline and run summary.
// - `error`: the error kinds shared by all of the above.
pub mod api;
pub mod avatar;
pub mod config;
pub mod error;
pub mod runner;

pub use error::{Error, Result};
