use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

// ---------------------------------------------------------------------------
// Response envelope
//
// One backend deployment wraps every payload in the same outer object:
//
// Success:
//   { "success": true, "data": <T>, "message": "..." }
//
// Failure (still HTTP 2xx):
//   { "success": false, "error": "...", "message": "..." }
//
// The other deployment returns bare payloads; the client selects the mode
// once at construction.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    /// `true` on success, `false` on API-level failure.
    pub success: bool,

    /// Present on success; absent for void operations.
    pub data: Option<T>,

    /// Informational text, observed on both success and failure.
    pub message: Option<String>,

    /// Human-readable error text, present on failure.
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the envelope, mapping `success: false` to [`ClientError::Api`].
    pub fn into_result(self) -> Result<Option<T>, ClientError> {
        if self.success {
            Ok(self.data)
        } else {
            let message = self
                .error
                .filter(|m| !m.is_empty())
                .or(self.message.filter(|m| !m.is_empty()))
                .unwrap_or_else(|| "API call failed".to_string());
            Err(ClientError::Api { message })
        }
    }
}

// ---------------------------------------------------------------------------
// Sensors and measurements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A logical measurement point tied to a [`Location`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub id: i64,
    pub sensor_name: String,
    /// Free-form type tag, e.g. `"POWER"` or `"TEMP"`.
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub location: Location,
}

/// Body for sensor create and full-replace update. Writes reference the
/// location by id; reads embed the full object.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSensor {
    pub sensor_name: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub location_id: i64,
}

/// A single timestamped observation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: i64,
    pub sensor: Sensor,
    pub value: f64,
    pub measured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeasurement {
    pub sensor_id: i64,
    pub value: f64,
    /// The server assigns "now" when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_at: Option<DateTime<Utc>>,
}

/// One row of the daily-average metric, produced server-side.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAverage {
    pub sensor_id: i64,
    pub day: NaiveDate,
    pub avg_value: f64,
}

// ---------------------------------------------------------------------------
// Devices and energy readings
// ---------------------------------------------------------------------------

/// A managed energy asset, tracked independently of sensors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    pub name: String,
    /// Free-form type tag, e.g. `"METER"` or `"CONTROLLER"`.
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Partial update body. Unset fields are left untouched by the backend
/// and never serialized.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Optional filters for the device listing.
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    pub active: Option<bool>,
    pub device_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyReading {
    pub id: i64,
    pub device_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    pub ts: DateTime<Utc>,
    pub kwh: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEnergyReading {
    pub device_id: i64,
    /// The server assigns "now" when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<DateTime<Utc>>,
    pub kwh: f64,
}

// ---------------------------------------------------------------------------
// Reports and uploads
// ---------------------------------------------------------------------------

/// Report bucket size for the summary endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Weekly,
    Monthly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!("unknown period: {other:?} (expected weekly|monthly)")),
        }
    }
}

/// One bucket of a summary report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Day or period label.
    pub bucket: String,
    pub usage: f64,
}

/// Outcome of a CSV batch upload, revocable as a unit by `batch_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub batch_id: i64,
    pub total_rows: u32,
    pub valid_rows: u32,
    pub invalid_rows: u32,
    /// Rejected rows in file order.
    pub errors: Vec<RowError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    pub row: u32,
    pub error: String,
}

// ---------------------------------------------------------------------------
// Dashboard endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

/// Combined external-weather and usage snapshot from
/// `GET /api/ext/weather-usage`.
///
/// The upstream weather call can fail independently; the backend then sends
/// an `error` string instead of `current_weather`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherUsage {
    #[serde(default)]
    pub weather: Option<Weather>,
    /// Summed consumption over the trailing 24 hours.
    #[serde(default)]
    pub usage_last24h: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Weather {
    #[serde(default)]
    pub current_weather: Option<CurrentWeather>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeather {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Metres per second.
    pub windspeed: f64,
}

// ---------------------------------------------------------------------------
// Client-side display stats
// ---------------------------------------------------------------------------

/// Count/avg/min/max over an already-fetched measurement list, the only
/// computation the dashboard performs itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementStats {
    pub count: usize,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl MeasurementStats {
    pub fn from_measurements(measurements: &[Measurement]) -> Self {
        if measurements.is_empty() {
            return Self {
                count: 0,
                avg: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }

        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for m in measurements {
            sum += m.value;
            min = min.min(m.value);
            max = max.max(m.value);
        }

        Self {
            count: measurements.len(),
            avg: sum / measurements.len() as f64,
            min,
            max,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
