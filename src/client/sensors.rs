use super::{EmsClient, Query};
use crate::error::ClientError;
use crate::models::{NewSensor, Sensor};

impl EmsClient {
    /// GET `/api/sensors`
    pub async fn list_sensors(&self) -> Result<Vec<Sensor>, ClientError> {
        self.get("/api/sensors", Query::new()).await
    }

    /// GET `/api/sensors/{id}`
    pub async fn get_sensor(&self, id: i64) -> Result<Sensor, ClientError> {
        self.get(&format!("/api/sensors/{id}"), Query::new()).await
    }

    /// POST `/api/sensors`
    pub async fn create_sensor(&self, sensor: &NewSensor) -> Result<Sensor, ClientError> {
        self.post("/api/sensors", sensor).await
    }

    /// PUT `/api/sensors/{id}`. Full replace.
    pub async fn update_sensor(&self, id: i64, sensor: &NewSensor) -> Result<Sensor, ClientError> {
        self.put(&format!("/api/sensors/{id}"), sensor).await
    }

    /// DELETE `/api/sensors/{id}`
    pub async fn delete_sensor(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/sensors/{id}")).await
    }
}
