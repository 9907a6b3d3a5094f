use gnss_water::{Config, GnssWater, GnssWaterError};

#[tokio::main]
async fn main() -> Result<(), GnssWaterError> {
    env_logger::init();

    let client = GnssWater::new(Config::load()?)?;
    let stations = client.load_stations().await;
    println!("Found {} stations", stations.len());

    for record in stations.stations.values() {
        let position = record
            .coordinates()
            .map(|(lat, lon)| format!("{lat:.4}, {lon:.4}"))
            .unwrap_or_else(|| "unknown position".to_string());
        println!(
            "{:<8} {:<24} {:<20} {}",
            record.station_id,
            record.meta.water_body().unwrap_or("-"),
            position,
            record.temporal_resolution().unwrap_or("-"),
        );
    }

    for conflict in &stations.conflicts {
        println!(
            "conflict: {} kept {} over {}",
            conflict.station_id, conflict.kept, conflict.discarded
        );
    }

    if let Some(first) = stations.stations.keys().next() {
        let (_, series, frame) = client.station_series().station(first).call().await?;
        if let Some((start, end)) = series.series.date_span() {
            println!("{first}: {} samples from {start} to {end}", series.series.len());
        }
        println!("{}", frame.collect()?);
    }

    Ok(())
}
