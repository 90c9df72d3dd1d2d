use super::{EmsClient, Query};
use crate::error::ClientError;
use crate::models::{Device, DeviceFilter, DeviceUpdate, NewDevice};

fn filter_query(filter: &DeviceFilter) -> Query {
    let mut query = Query::new();
    if let Some(active) = filter.active {
        query.push(("active", active.to_string()));
    }
    if let Some(device_type) = &filter.device_type {
        query.push(("type", device_type.clone()));
    }
    query
}

impl EmsClient {
    /// GET `/api/devices` with optional `active`/`type` filters.
    pub async fn list_devices(&self, filter: &DeviceFilter) -> Result<Vec<Device>, ClientError> {
        self.get("/api/devices", filter_query(filter)).await
    }

    /// GET `/api/devices/{id}`
    pub async fn get_device(&self, id: i64) -> Result<Device, ClientError> {
        self.get(&format!("/api/devices/{id}"), Query::new()).await
    }

    /// POST `/api/devices`
    pub async fn create_device(&self, device: &NewDevice) -> Result<Device, ClientError> {
        self.post("/api/devices", device).await
    }

    /// PUT `/api/devices/{id}`. Partial update; unset fields keep their value.
    pub async fn update_device(
        &self,
        id: i64,
        update: &DeviceUpdate,
    ) -> Result<Device, ClientError> {
        self.put(&format!("/api/devices/{id}"), update).await
    }

    /// DELETE `/api/devices/{id}`
    pub async fn delete_device(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/devices/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::filter_query;
    use crate::models::DeviceFilter;

    #[test]
    fn unset_filters_produce_no_pairs() {
        assert!(filter_query(&DeviceFilter::default()).is_empty());
    }

    #[test]
    fn set_filters_are_kept_even_when_falsy() {
        let filter = DeviceFilter {
            active: Some(false),
            device_type: Some(String::new()),
        };
        assert_eq!(
            filter_query(&filter),
            vec![("active", "false".to_string()), ("type", String::new())]
        );
    }

    #[test]
    fn active_filter_alone() {
        let filter = DeviceFilter {
            active: Some(true),
            device_type: None,
        };
        assert_eq!(filter_query(&filter), vec![("active", "true".to_string())]);
    }
}
