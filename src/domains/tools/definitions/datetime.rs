//! Date/time tool definition.
//!
//! Returns the current date and time for a UTC offset or a named IANA
//! timezone, in one of several output formats or a custom strftime pattern.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use chrono_tz::Tz;
use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::domains::tools::{ToolError, ToolHandler, ToolOutput, parse_params, tool_descriptor};

const HUMAN_FORMAT: &str = "%A, %d %B %Y - %H:%M:%S";
const FORMAT_TYPES: [&str; 4] = ["iso", "human", "unix", "components"];
const MIN_OFFSET_HOURS: i32 = -12;
const MAX_OFFSET_HOURS: i32 = 14;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the get_datetime tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetDatetimeParams {
    /// UTC offset in hours.
    #[serde(default)]
    #[schemars(
        description = "UTC offset in hours (-12 to +14, default: 0)",
        range(min = -12, max = 14)
    )]
    pub timezone_offset: i32,

    /// IANA timezone name; takes precedence over the offset.
    #[serde(default)]
    #[schemars(description = "IANA timezone name such as 'Europe/Paris' (overrides timezone_offset)")]
    pub timezone: Option<String>,

    /// Output format.
    #[serde(default = "default_format_type")]
    #[schemars(description = "Output format: iso, human, unix, components (default: iso)")]
    pub format_type: String,

    /// Custom strftime pattern; takes precedence over format_type.
    #[serde(default)]
    #[schemars(description = "Custom strftime pattern such as '%Y-%m-%d %H:%M' (overrides format_type)")]
    pub pattern: Option<String>,
}

fn default_format_type() -> String {
    "iso".to_string()
}

impl Default for GetDatetimeParams {
    fn default() -> Self {
        Self {
            timezone_offset: 0,
            timezone: None,
            format_type: default_format_type(),
            pattern: None,
        }
    }
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Date/time tool.
#[derive(Debug, Clone, Default)]
pub struct DatetimeTool;

impl DatetimeTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_datetime";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Get the current date/time for a UTC offset or an IANA timezone. Formats: iso, human, unix, components, or a custom strftime pattern.";

    pub fn new() -> Self {
        Self
    }

    /// Execute the tool logic against the current time.
    pub fn execute(params: &GetDatetimeParams) -> ToolOutput {
        Self::execute_at(params, Utc::now())
    }

    /// Execute the tool logic against a given instant.
    #[instrument(skip_all, fields(format = %params.format_type))]
    pub fn execute_at(params: &GetDatetimeParams, now: DateTime<Utc>) -> ToolOutput {
        // A named zone replaces the offset entirely.
        if params.timezone.is_none()
            && !(MIN_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(&params.timezone_offset)
        {
            return ToolOutput::failure("timezone_offset must be between -12 and +14");
        }

        if params.pattern.is_none() && !FORMAT_TYPES.contains(&params.format_type.as_str()) {
            return ToolOutput::failure(format!(
                "format_type must be one of: {}",
                FORMAT_TYPES.join(", ")
            ));
        }

        let local = match localize(now, params) {
            Ok(dt) => dt,
            Err(message) => return ToolOutput::failure(message),
        };

        let (format, datetime) = match &params.pattern {
            Some(pattern) => match format_pattern(&local, pattern) {
                Ok(text) => ("custom".to_string(), Value::String(text)),
                Err(message) => return ToolOutput::failure(message),
            },
            None => (
                params.format_type.clone(),
                format_builtin(&local, &params.format_type),
            ),
        };

        ToolOutput::success(json!({
            "timezone_offset": offset_hours(&local),
            "timezone": params.timezone,
            "utc_offset": local.format("%:z").to_string(),
            "format": format,
            "datetime": datetime,
        }))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        tool_descriptor::<GetDatetimeParams>(Self::NAME, Self::DESCRIPTION)
    }
}

#[async_trait::async_trait]
impl ToolHandler for DatetimeTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn descriptor(&self) -> Tool {
        Self::to_tool()
    }

    async fn execute(&self, arguments: JsonObject) -> Result<ToolOutput, ToolError> {
        let params: GetDatetimeParams = parse_params(arguments)?;
        Ok(Self::execute(&params))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Shift `now` into the requested zone.
fn localize(now: DateTime<Utc>, params: &GetDatetimeParams) -> Result<DateTime<FixedOffset>, String> {
    if let Some(name) = &params.timezone {
        let tz: Tz = name
            .trim()
            .parse()
            .map_err(|_| format!("Unknown timezone '{}'", name))?;
        return Ok(now.with_timezone(&tz).fixed_offset());
    }

    let offset = FixedOffset::east_opt(params.timezone_offset * 3600)
        .ok_or_else(|| "timezone_offset must be between -12 and +14".to_string())?;
    Ok(now.with_timezone(&offset))
}

/// Whole hours as an integer, fractional offsets (e.g. +05:30) as a float.
fn offset_hours(dt: &DateTime<FixedOffset>) -> Value {
    let seconds = dt.offset().local_minus_utc();
    if seconds % 3600 == 0 {
        json!(seconds / 3600)
    } else {
        json!(f64::from(seconds) / 3600.0)
    }
}

fn format_builtin(dt: &DateTime<FixedOffset>, format_type: &str) -> Value {
    match format_type {
        "human" => Value::String(dt.format(HUMAN_FORMAT).to_string()),
        "unix" => json!(dt.timestamp()),
        "components" => json!({
            "year": dt.year(),
            "month": dt.month(),
            "day": dt.day(),
            "hour": dt.hour(),
            "minute": dt.minute(),
            "second": dt.second(),
            "weekday": dt.format("%A").to_string(),
        }),
        _ => Value::String(dt.to_rfc3339()),
    }
}

/// Render a user-supplied strftime pattern without panicking on bad input.
fn format_pattern(dt: &DateTime<FixedOffset>, pattern: &str) -> Result<String, String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(format!("Invalid format pattern '{}'", pattern));
    }

    let mut rendered = String::new();
    write!(rendered, "{}", dt.format_with_items(items.iter()))
        .map_err(|_| format!("Invalid format pattern '{}'", pattern))?;
    Ok(rendered)
}
