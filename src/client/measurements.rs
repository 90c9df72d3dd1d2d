use chrono::NaiveDate;

use super::{EmsClient, Query};
use crate::error::ClientError;
use crate::models::{DailyAverage, Measurement, NewMeasurement};

fn range_query(from: NaiveDate, to: NaiveDate) -> Query {
    vec![("from", from.to_string()), ("to", to.to_string())]
}

impl EmsClient {
    /// GET `/api/measurements?from=&to=`
    pub async fn list_measurements(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Measurement>, ClientError> {
        self.get("/api/measurements", range_query(from, to)).await
    }

    /// POST `/api/measurements`
    pub async fn create_measurement(
        &self,
        measurement: &NewMeasurement,
    ) -> Result<Measurement, ClientError> {
        self.post("/api/measurements", measurement).await
    }

    /// GET `/api/metrics/daily-average?from=&to=`
    pub async fn daily_average(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyAverage>, ClientError> {
        self.get("/api/metrics/daily-average", range_query(from, to))
            .await
    }
}
