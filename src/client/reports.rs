use chrono::NaiveDate;

use super::{EmsClient, Query};
use crate::error::ClientError;
use crate::models::{Period, SummaryRow};

fn summary_query(period: Period, from: NaiveDate, to: NaiveDate) -> Query {
    vec![
        ("period", period.as_str().to_string()),
        ("from", from.to_string()),
        ("to", to.to_string()),
    ]
}

impl EmsClient {
    /// GET `/api/reports/summary?period=&from=&to=`
    pub async fn summary(
        &self,
        period: Period,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SummaryRow>, ClientError> {
        self.get("/api/reports/summary", summary_query(period, from, to))
            .await
    }

    /// Plain URL of the CSV rendition of [`summary`](Self::summary), for the
    /// browser to navigate to directly. Never fetched by this layer; carries
    /// the exact query parameters of the JSON call.
    pub fn summary_csv_url(
        &self,
        period: Period,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<String, ClientError> {
        let url = self.url("/api/reports/summary.csv", &summary_query(period, from, to))?;
        Ok(url.to_string())
    }
}
