use std::net::SocketAddr;
use std::path::Path;

use axum::{Router, response::Html, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use solar_orientation::api_docs::ApiDoc;
use solar_orientation::config::Config;
use solar_orientation::logging::{init_tracing, timed};
use solar_orientation::routes::irradiation_routes::api_routes;
use solar_orientation::services::report_service::{
    ReportFormat, optimize_range_until, save_report,
};
use solar_orientation::shared_state::{AppState, SharedState};

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[tokio::main]
async fn main() {
    init_tracing();

    // 1. Load configuration
    let config_path =
        std::env::var("SOLAR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load {config_path}: {e}");
            return;
        }
    };
    info!("Configuration loaded: {} sites", config.sites.len());

    // 2. Build one calculator per site
    let state = match AppState::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            error!("Invalid site configuration: {e}");
            return;
        }
    };

    // 3. Precompute the yearly report for each site
    if config.report.precompute {
        for site in &config.sites {
            spawn_precompute(state.clone(), config.clone(), site.id.clone());
        }
    }

    // 4. Start Axum HTTP server
    let shared = SharedState {
        app: state.clone(),
        config: config.clone(),
    };
    let app = Router::new()
        .nest("/api", api_routes(shared))
        .route("/scalar", get(|| async { Html(Scalar::new(ApiDoc::openapi()).to_html()) }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("API Server listening on http://{addr}");
    info!("Scalar UI: http://{addr}/scalar");

    let server = axum_server::bind(addr).serve(app.into_make_service());
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("HTTP server error: {e}");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
            state.request_shutdown();
        }
    }
}

fn spawn_precompute(state: AppState, config: Config, site_id: String) {
    let Some(calc) = state.calculator(&site_id) else {
        return;
    };
    let (from_day, to_day) = (config.report.from_day, config.report.to_day);

    tokio::task::spawn_blocking(move || {
        let rows = timed(&format!("report {site_id}"), || {
            optimize_range_until(&calc, from_day, to_day, &state.shutdown)
        });
        if state.is_shutting_down() {
            warn!("Report for {site_id} abandoned after {} days", rows.len());
            return;
        }

        if let Some(dir) = &config.report.output_dir {
            if let Err(e) = std::fs::create_dir_all(dir) {
                error!("Cannot create report directory {dir}: {e}");
            } else {
                for format in [ReportFormat::Csv, ReportFormat::Json, ReportFormat::Xml] {
                    let path = Path::new(dir).join(format!("{site_id}.{}", format.extension()));
                    if let Err(e) = save_report(&path, format, &rows) {
                        error!("Failed to write {}: {e}", path.display());
                    }
                }
            }
        }

        state.store_report(&site_id, rows);
    });
}
