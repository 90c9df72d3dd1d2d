use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};
use tracing::info;

use super::{EmsClient, Query};
use crate::error::ClientError;
use crate::models::{EnergyReading, NewEnergyReading, UploadResult};

/// Readings queries carry full instants, not day labels.
fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl EmsClient {
    /// GET `/api/readings?deviceId=&from=&to=&limit=`
    pub async fn list_readings(
        &self,
        device_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: Option<u32>,
    ) -> Result<Vec<EnergyReading>, ClientError> {
        let mut query = vec![
            ("deviceId", device_id.to_string()),
            ("from", iso(from)),
            ("to", iso(to)),
        ];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.get("/api/readings", query).await
    }

    /// GET `/api/readings/device/{id}?limit=`
    pub async fn device_readings(
        &self,
        device_id: i64,
        limit: Option<u32>,
    ) -> Result<Vec<EnergyReading>, ClientError> {
        let limit = limit.unwrap_or(100);
        let query = vec![("limit", limit.to_string())];
        self.get(&format!("/api/readings/device/{device_id}"), query)
            .await
    }

    /// GET `/api/readings/all?from=&to=`
    pub async fn all_readings(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EnergyReading>, ClientError> {
        let query = vec![("from", iso(from)), ("to", iso(to))];
        self.get("/api/readings/all", query).await
    }

    /// POST `/api/readings`
    pub async fn create_reading(
        &self,
        reading: &NewEnergyReading,
    ) -> Result<EnergyReading, ClientError> {
        self.post("/api/readings", reading).await
    }

    /// POST `/api/readings/upload`. The CSV goes up as a single multipart
    /// field named `file`.
    pub async fn upload_readings(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResult, ClientError> {
        info!(file_name, size = bytes.len(), "uploading readings batch");

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(ClientError::transport)?;
        let form = Form::new().part("file", part);

        self.post_multipart("/api/readings/upload", form).await
    }

    /// DELETE `/api/readings/uploads/{batchId}`, revoking a whole batch.
    pub async fn delete_upload(&self, batch_id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/readings/uploads/{batch_id}"))
            .await
    }
}
