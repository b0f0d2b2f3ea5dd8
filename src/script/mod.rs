//! Script rendering
//!
//! - [`kql`] - KQL query pretty-printing
//! - [`powershell`] - `Invoke-AzRestMethod` / `Search-AzGraph` script generation
//! - [`portal`] - Resource Graph Explorer deep links

pub mod kql;
pub mod portal;
pub mod powershell;

pub use kql::format_query;
pub use portal::portal_query_url;
pub use powershell::{generate, render_query};
