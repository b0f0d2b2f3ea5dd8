//! azxray - see the PowerShell behind the Azure portal
//!
//! The portal talks to Azure Resource Manager through batched `/batch`
//! calls. This crate unpacks captured batches, parses every inner request
//! into a typed command and renders the equivalent `Invoke-AzRestMethod`
//! or `Search-AzGraph` script.
//!
//! # Architecture
//!
//! - [`capture`] - Reads batch envelopes and HAR exports
//! - [`azure`] - URL decomposition, resource identity parsing, classification
//! - [`script`] - KQL formatting, PowerShell generation, portal links
//! - [`pipeline`] - Runs each request through the stages above
//! - [`report`] - Text / JSON / YAML output
//! - [`config`] - Persistent user settings

pub mod azure;
pub mod capture;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod script;

pub use error::{Result, XrayError};
