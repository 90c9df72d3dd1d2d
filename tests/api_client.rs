//! End-to-end tests against a local axum stand-in for the backend.

use axum::extract::{Multipart, Path, RawQuery};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use ems_client::models::{DeviceFilter, NewMeasurement};
use ems_client::{ClientError, Config, EmsClient};

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn bare_client(base: &str) -> EmsClient {
    EmsClient::new(&Config::new(base)).unwrap()
}

fn envelope_client(base: &str) -> EmsClient {
    EmsClient::new(&Config::new(base).with_envelope(true)).unwrap()
}

fn sensors_fixture() -> Value {
    json!([
        {"id":1,"sensorName":"hall-power","type":"POWER","location":{"id":1,"name":"Building A"}},
        {"id":2,"sensorName":"roof-temp","type":"TEMP","location":{"id":2,"name":"Roof"}}
    ])
}

#[tokio::test]
async fn bare_payload_passes_through_unchanged() {
    let router = Router::new().route("/api/sensors", get(|| async { Json(sensors_fixture()) }));
    let base = spawn(router).await;

    let sensors = bare_client(&base).list_sensors().await.unwrap();

    assert_eq!(serde_json::to_value(&sensors).unwrap(), sensors_fixture());
}

#[tokio::test]
async fn envelope_data_is_unwrapped() {
    let router = Router::new().route(
        "/api/devices/{id}",
        get(|Path(id): Path<i64>| async move {
            Json(json!({
                "success": true,
                "data": {"id": id, "name": "meter-7", "type": "METER", "active": true}
            }))
        }),
    );
    let base = spawn(router).await;

    let device = envelope_client(&base).get_device(7).await.unwrap();

    assert_eq!(device.id, 7);
    assert_eq!(device.name, "meter-7");
    assert_eq!(device.active, Some(true));
}

#[tokio::test]
async fn envelope_failure_rejects_with_error_text() {
    let router = Router::new().route(
        "/api/devices/{id}",
        get(|| async { Json(json!({"success": false, "error": "device not found"})) }),
    );
    let base = spawn(router).await;

    let err = envelope_client(&base).get_device(7).await.unwrap_err();

    assert!(matches!(err, ClientError::Api { .. }));
    assert_eq!(err.to_string(), "device not found");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn no_content_resolves_to_empty() {
    let router = Router::new().route(
        "/api/sensors/{id}",
        delete(|| async { StatusCode::NO_CONTENT }),
    );
    let base = spawn(router).await;

    bare_client(&base).delete_sensor(5).await.unwrap();
}

#[tokio::test]
async fn no_content_resolves_to_empty_in_envelope_mode() {
    let router = Router::new().route(
        "/api/devices/{id}",
        delete(|| async { StatusCode::NO_CONTENT }),
    );
    let base = spawn(router).await;

    envelope_client(&base).delete_device(5).await.unwrap();
}

#[tokio::test]
async fn unparsable_error_body_uses_status_message() {
    let router = Router::new().route(
        "/api/health",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = spawn(router).await;

    let err = bare_client(&base).health().await.unwrap_err();

    assert_eq!(err.to_string(), "HTTP Error: 500");
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.code().as_deref(), Some("500"));
}

#[tokio::test]
async fn error_field_is_extracted_from_json_body() {
    let router = Router::new().route(
        "/api/sensors/{id}",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "sensor not found"})),
            )
        }),
    );
    let base = spawn(router).await;

    let err = bare_client(&base).get_sensor(9).await.unwrap_err();

    assert_eq!(err.to_string(), "sensor not found");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn device_filter_reaches_the_wire_verbatim() {
    let router = Router::new().route(
        "/api/devices",
        get(|RawQuery(query): RawQuery| async move {
            if query.as_deref() == Some("active=true") {
                Json(json!([])).into_response()
            } else {
                let message = format!("unexpected query: {query:?}");
                (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
            }
        }),
    );
    let base = spawn(router).await;

    let filter = DeviceFilter {
        active: Some(true),
        device_type: None,
    };
    let devices = bare_client(&base).list_devices(&filter).await.unwrap();

    assert!(devices.is_empty());
}

#[tokio::test]
async fn measurement_body_omits_unset_timestamp() {
    let router = Router::new().route(
        "/api/measurements",
        post(|Json(body): Json<Value>| async move {
            if body != json!({"sensorId": 3, "value": 1.5}) {
                let message = format!("unexpected body: {body}");
                return (StatusCode::BAD_REQUEST, Json(json!({"error": message})))
                    .into_response();
            }
            Json(json!({
                "id": 10,
                "sensor": {"id":3,"sensorName":"hall-power","type":"POWER","location":{"id":1,"name":"Building A"}},
                "value": 1.5,
                "measuredAt": "2025-08-01T12:00:00Z"
            }))
            .into_response()
        }),
    );
    let base = spawn(router).await;

    let body = NewMeasurement {
        sensor_id: 3,
        value: 1.5,
        measured_at: None,
    };
    let created = bare_client(&base).create_measurement(&body).await.unwrap();

    assert_eq!(created.id, 10);
    assert_eq!(created.sensor.id, 3);
}

async fn upload_handler(headers: HeaderMap, mut multipart: Multipart) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("multipart/form-data") {
        let message = format!("expected multipart, got {content_type:?}");
        return (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response();
    }

    let Some(field) = multipart.next_field().await.unwrap() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "no multipart field"})),
        )
            .into_response();
    };
    if field.name() != Some("file") {
        let message = format!("unexpected field name: {:?}", field.name());
        return (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response();
    }
    let body = field.text().await.unwrap();
    if !body.starts_with("building_name,zone_name,meter_no,timestamp,value") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "unexpected file content"})),
        )
            .into_response();
    }
    if multipart.next_field().await.unwrap().is_some() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "more than one field"})),
        )
            .into_response();
    }

    Json(json!({
        "batchId": 3,
        "totalRows": 2,
        "validRows": 1,
        "invalidRows": 1,
        "errors": [{"row": 2, "error": "value is not a number"}]
    }))
    .into_response()
}

#[tokio::test]
async fn upload_is_multipart_with_single_file_field() {
    let router = Router::new().route("/api/readings/upload", post(upload_handler));
    let base = spawn(router).await;

    let csv = "building_name,zone_name,meter_no,timestamp,value\n\
               A,hall,M-1,2025-08-01T00:00:00Z,12.5\n\
               A,hall,M-1,2025-08-01T01:00:00Z,oops\n";
    let result = bare_client(&base)
        .upload_readings("readings.csv", csv.as_bytes().to_vec())
        .await
        .unwrap();

    assert_eq!(result.batch_id, 3);
    assert_eq!(result.total_rows, 2);
    assert_eq!(result.invalid_rows, 1);
    assert_eq!(result.errors[0].row, 2);
}

#[tokio::test]
async fn concurrent_delete_and_list_do_not_interfere() {
    let router = Router::new()
        .route("/api/sensors", get(|| async { Json(sensors_fixture()) }))
        .route(
            "/api/sensors/{id}",
            delete(|| async { StatusCode::NO_CONTENT }),
        );
    let base = spawn(router).await;
    let client = bare_client(&base);

    let (deleted, listed) = tokio::join!(client.delete_sensor(5), client.list_sensors());

    deleted.unwrap();
    assert_eq!(listed.unwrap().len(), 2);
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    // Port 1 is reserved and unbound
    let err = bare_client("http://127.0.0.1:1").health().await.unwrap_err();

    assert!(matches!(err, ClientError::Transport { .. }));
    assert_eq!(err.status(), None);
    assert_eq!(err.code(), None);
}
