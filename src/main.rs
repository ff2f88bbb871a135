use anyhow::{Context, Result};
use clap::Parser;
use config::{Cli, Command, Config};
use data_sources::{AdresseClient, MobilitesClient, aggregate_lines_until, http_client};
use dotenvy::dotenv;
use render::{GeoJsonSurface, RenderSurface, TextSurface, markers, markers_in};
use server::AppState;
use std::io::stdout;
use std::sync::Arc;
use tracing::{info, warn};

mod aggregator;
mod config;
mod data_sources;
mod model;
mod render;
mod server;
mod telemetry;
mod utils;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    _ = dotenv();

    let cli = Cli::parse();
    let _telemetry = telemetry::init_tracing(&cli.config)?;

    let config = cli.config;
    let client = http_client(config.http_timeout())?;
    let stops = MobilitesClient::new(client.clone(), &config.transit_api_url, &config.network);
    let geocoder = AdresseClient::new(client, &config.geocoder_api_url);

    match cli.command {
        Command::Stops { geojson } => {
            let Some(aggregated) =
                aggregate_lines_until(&stops, &config.lines(), shutdown_signal()).await
            else {
                return Ok(());
            };
            let markers = markers(&aggregated);

            if geojson {
                GeoJsonSurface::new(stdout().lock()).render(&markers)?;
            } else {
                TextSurface::new(stdout().lock()).render(&markers)?;
            }
        }
        Command::Line { line } => {
            for stop in stops.line_stops(&line).await? {
                println!(
                    "{} ({}) {}, {}",
                    stop.stop_name,
                    stop.city.as_deref().unwrap_or("-"),
                    stop.lat.map_or("?".to_string(), |lat| lat.to_string()),
                    stop.lon.map_or("?".to_string(), |lon| lon.to_string()),
                );
            }
        }
        Command::Search { query, stops: with_stops } => {
            let Some(region) = geocoder
                .search(&query)
                .await
                .context("Error searching the address")?
            else {
                warn!("no address found for {query}");
                return Ok(());
            };

            println!("{}", serde_json::to_string_pretty(&region)?);

            if with_stops {
                if let Some(aggregated) =
                    aggregate_lines_until(&stops, &config.lines(), shutdown_signal()).await
                {
                    TextSurface::new(stdout().lock()).render(&markers_in(&aggregated, &region))?;
                }
            }
        }
        Command::Suggest { text } => {
            for suggestion in geocoder.suggestions(&text).await {
                println!(
                    "{}\t{}\t{}",
                    suggestion.label, suggestion.latitude, suggestion.longitude
                );
            }
        }
        Command::Serve { bind } => {
            serve(&config, stops, geocoder, bind).await?;
        }
    }

    Ok(())
}

async fn serve(
    config: &Config,
    stops: MobilitesClient,
    geocoder: AdresseClient,
    bind: std::net::SocketAddr,
) -> Result<()> {
    let state = AppState {
        stops,
        geocoder,
        lines: Arc::new(config.lines()),
    };

    info!("serving lines {:?}", state.lines);

    server::serve(state, bind, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("couldn't listen for ctrl-c {e}");
        futures::future::pending::<()>().await;
    }
    info!("Shutting down");
}
