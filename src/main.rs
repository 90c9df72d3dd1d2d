use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ems_client::models::{
    DeviceFilter, DeviceUpdate, MeasurementStats, NewDevice, NewEnergyReading, NewMeasurement,
    NewSensor, Period,
};
use ems_client::{Config, EmsClient};

#[derive(Parser)]
#[command(name = "ems", about = "Command-line dashboard for the EMS backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Backend health check
    Health,
    /// Connection state, sensor count and weather/usage snapshot
    Dashboard,
    /// Manage sensors
    Sensors {
        #[command(subcommand)]
        command: SensorCommand,
    },
    /// List or submit measurements
    Measurements {
        #[command(subcommand)]
        command: MeasurementCommand,
    },
    /// Daily average metric
    Metrics {
        #[command(subcommand)]
        command: MetricsCommand,
    },
    /// Manage devices
    Devices {
        #[command(subcommand)]
        command: DeviceCommand,
    },
    /// Query or submit energy readings
    Readings {
        #[command(subcommand)]
        command: ReadingCommand,
    },
    /// Summary reports
    Reports {
        #[command(subcommand)]
        command: ReportCommand,
    },
    /// Upload a CSV readings batch
    Upload { file: PathBuf },
    /// Delete a previously uploaded readings batch
    DeleteBatch { batch_id: i64 },
}

#[derive(Subcommand)]
enum SensorCommand {
    List,
    Get {
        id: i64,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        sensor_type: String,
        #[arg(long)]
        location_id: i64,
    },
    /// Full replace of an existing sensor
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        sensor_type: String,
        #[arg(long)]
        location_id: i64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum MeasurementCommand {
    /// List measurements in a date range and print display stats
    List {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Submit a manual measurement
    Add {
        #[arg(long)]
        sensor: i64,
        #[arg(long)]
        value: f64,
        /// Measurement instant; the server assigns "now" when omitted
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

#[derive(Subcommand)]
enum MetricsCommand {
    DailyAverage {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
}

#[derive(Subcommand)]
enum DeviceCommand {
    List {
        #[arg(long)]
        active: Option<bool>,
        #[arg(long = "type")]
        device_type: Option<String>,
    },
    Get {
        id: i64,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        device_type: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Partial update; only the given fields change
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        device_type: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum ReadingCommand {
    /// Readings for one device in a time range
    Range {
        #[arg(long)]
        device: i64,
        #[arg(long)]
        from: DateTime<Utc>,
        #[arg(long)]
        to: DateTime<Utc>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Latest readings of one device
    Device {
        id: i64,
        /// Defaults to 100
        #[arg(long)]
        limit: Option<u32>,
    },
    /// All readings in a time range
    All {
        #[arg(long)]
        from: DateTime<Utc>,
        #[arg(long)]
        to: DateTime<Utc>,
    },
    /// Record a reading
    Add {
        #[arg(long)]
        device: i64,
        #[arg(long)]
        kwh: f64,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

#[derive(Subcommand)]
enum ReportCommand {
    Summary {
        #[arg(long)]
        period: Period,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        /// Print the CSV download URL instead of fetching the rows
        #[arg(long)]
        csv_url: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent — env vars may be set externally)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let client = EmsClient::new(&config)?;

    run(cli.command, &client).await
}

async fn run(command: Command, client: &EmsClient) -> Result<()> {
    match command {
        Command::Health => print_json(&client.health().await?),
        Command::Dashboard => dashboard(client).await,
        Command::Sensors { command } => sensors(command, client).await,
        Command::Measurements { command } => measurements(command, client).await,
        Command::Metrics { command } => metrics(command, client).await,
        Command::Devices { command } => devices(command, client).await,
        Command::Readings { command } => readings(command, client).await,
        Command::Reports { command } => reports(command, client).await,
        Command::Upload { file } => upload(&file, client).await,
        Command::DeleteBatch { batch_id } => {
            client.delete_upload(batch_id).await?;
            println!("deleted upload batch {batch_id}");
            Ok(())
        }
    }
}

/// The KPI row of the old dashboard page: backend state, sensor count,
/// weather and trailing-24h usage. A failing health probe means DOWN, not
/// an error exit.
async fn dashboard(client: &EmsClient) -> Result<()> {
    let backend = match client.health().await {
        Ok(_) => "UP",
        Err(_) => "DOWN",
    };
    println!("backend: {backend}");

    let sensors = client.list_sensors().await?;
    println!("sensors: {}", sensors.len());

    match client.weather_usage().await {
        Ok(snapshot) => {
            if let Some(current) = snapshot.weather.as_ref().and_then(|w| w.current_weather.as_ref())
            {
                println!("temperature: {} C, wind: {} m/s", current.temperature, current.windspeed);
            } else if let Some(error) = snapshot.weather.as_ref().and_then(|w| w.error.as_deref()) {
                println!("weather unavailable: {error}");
            }
            if let Some(usage) = snapshot.usage_last24h {
                println!("usage last 24h: {usage:.1}");
            }
        }
        Err(error) => println!("weather unavailable: {error}"),
    }

    Ok(())
}

async fn sensors(command: SensorCommand, client: &EmsClient) -> Result<()> {
    match command {
        SensorCommand::List => print_json(&client.list_sensors().await?),
        SensorCommand::Get { id } => print_json(&client.get_sensor(id).await?),
        SensorCommand::Create {
            name,
            sensor_type,
            location_id,
        } => {
            let body = NewSensor {
                sensor_name: name,
                sensor_type,
                location_id,
            };
            print_json(&client.create_sensor(&body).await?)
        }
        SensorCommand::Update {
            id,
            name,
            sensor_type,
            location_id,
        } => {
            let body = NewSensor {
                sensor_name: name,
                sensor_type,
                location_id,
            };
            print_json(&client.update_sensor(id, &body).await?)
        }
        SensorCommand::Delete { id } => {
            client.delete_sensor(id).await?;
            println!("deleted sensor {id}");
            Ok(())
        }
    }
}

async fn measurements(command: MeasurementCommand, client: &EmsClient) -> Result<()> {
    match command {
        MeasurementCommand::List { from, to } => {
            let measurements = client.list_measurements(from, to).await?;
            print_json(&measurements)?;
            let stats = MeasurementStats::from_measurements(&measurements);
            println!(
                "{} rows, avg {:.2}, min {:.2}, max {:.2}",
                stats.count, stats.avg, stats.min, stats.max
            );
            Ok(())
        }
        MeasurementCommand::Add { sensor, value, at } => {
            let body = NewMeasurement {
                sensor_id: sensor,
                value,
                measured_at: at,
            };
            print_json(&client.create_measurement(&body).await?)
        }
    }
}

async fn metrics(command: MetricsCommand, client: &EmsClient) -> Result<()> {
    match command {
        MetricsCommand::DailyAverage { from, to } => {
            let rows = client.daily_average(from, to).await?;
            for row in rows {
                println!("{} sensor {} avg {:.2}", row.day, row.sensor_id, row.avg_value);
            }
            Ok(())
        }
    }
}

async fn devices(command: DeviceCommand, client: &EmsClient) -> Result<()> {
    match command {
        DeviceCommand::List {
            active,
            device_type,
        } => {
            let filter = DeviceFilter {
                active,
                device_type,
            };
            print_json(&client.list_devices(&filter).await?)
        }
        DeviceCommand::Get { id } => print_json(&client.get_device(id).await?),
        DeviceCommand::Create {
            name,
            device_type,
            location,
            active,
        } => {
            let body = NewDevice {
                name,
                device_type,
                location,
                active,
            };
            print_json(&client.create_device(&body).await?)
        }
        DeviceCommand::Update {
            id,
            name,
            device_type,
            location,
            active,
        } => {
            let body = DeviceUpdate {
                name,
                device_type,
                location,
                active,
            };
            print_json(&client.update_device(id, &body).await?)
        }
        DeviceCommand::Delete { id } => {
            client.delete_device(id).await?;
            println!("deleted device {id}");
            Ok(())
        }
    }
}

async fn readings(command: ReadingCommand, client: &EmsClient) -> Result<()> {
    match command {
        ReadingCommand::Range {
            device,
            from,
            to,
            limit,
        } => print_json(&client.list_readings(device, from, to, limit).await?),
        ReadingCommand::Device { id, limit } => {
            print_json(&client.device_readings(id, limit).await?)
        }
        ReadingCommand::All { from, to } => print_json(&client.all_readings(from, to).await?),
        ReadingCommand::Add { device, kwh, at } => {
            let body = NewEnergyReading {
                device_id: device,
                ts: at,
                kwh,
            };
            print_json(&client.create_reading(&body).await?)
        }
    }
}

async fn reports(command: ReportCommand, client: &EmsClient) -> Result<()> {
    match command {
        ReportCommand::Summary {
            period,
            from,
            to,
            csv_url,
        } => {
            if csv_url {
                println!("{}", client.summary_csv_url(period, from, to)?);
                return Ok(());
            }
            let rows = client.summary(period, from, to).await?;
            for row in &rows {
                println!("{}\t{:.2}", row.bucket, row.usage);
            }
            Ok(())
        }
    }
}

async fn upload(file: &PathBuf, client: &EmsClient) -> Result<()> {
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("upload path has no file name")?
        .to_string();
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let result = client.upload_readings(&file_name, bytes).await?;
    println!(
        "batch {}: {} rows, {} valid, {} invalid",
        result.batch_id, result.total_rows, result.valid_rows, result.invalid_rows
    );
    for row_error in &result.errors {
        println!("row {}: {}", row_error.row, row_error.error);
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
