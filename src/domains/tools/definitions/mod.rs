//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod calculator;
pub mod data_converter;
pub mod datetime;
pub mod http_fetch;
pub mod text_processor;

pub use calculator::{CalculateParams, CalculateTool, Operation};
pub use data_converter::{ConvertDataParams, DataConverterTool, DataFormat};
pub use datetime::{DatetimeTool, GetDatetimeParams};
pub use http_fetch::{FetchUrlParams, UrlFetchTool};
pub use text_processor::{ProcessTextParams, TextOperation, TextProcessorTool};
