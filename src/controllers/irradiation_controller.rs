use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::config::{Config, SiteConfig};
use crate::logging::timed;
use crate::models::api::{
    ErrorBody, GeometryQuery, GeometryResponse, HealthStatus, IrradiationQuery, IrradiationResponse,
    ReportQuery, TransmittanceResponse,
};
use crate::models::solar::OptimizationResult;
use crate::services::irradiance::extraterrestrial_irradiance;
use crate::services::irradiation::IrradiationCalculator;
use crate::services::plot_service::{PlotConfig, plot_optimal_tilt, plot_total_irradiation};
use crate::services::report_service::{ReportError, ReportFormat, optimize_range, render_report};
use crate::services::sun_position::{SOLAR_NOON, hour_angle, solar_declination};
use crate::shared_state::AppState;

type PlotRenderer = fn(&[OptimizationResult], &PlotConfig) -> Result<String, ReportError>;

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

fn site_not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Site not found")
}

/// Run CPU-bound engine work off the async executor.
async fn blocking<T, F>(f: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("engine task failed: {e}");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Computation failed")
    })
}

/// Rows for `[from_day, to_day)`: the precomputed report when it covers the
/// default range, otherwise computed on demand. An empty or inverted range
/// gives no rows.
async fn report_rows(
    state: &AppState,
    config: &Config,
    site_id: &str,
    calc: IrradiationCalculator,
    query: &ReportQuery,
) -> Result<Vec<OptimizationResult>, Response> {
    if !query.has_range() {
        if let Some(rows) = state.report(site_id) {
            return Ok(rows);
        }
    }
    let from_day = query.from_day.unwrap_or(config.report.from_day);
    let to_day = query.to_day.unwrap_or(config.report.to_day);
    let operation = format!("report {site_id} [{from_day}, {to_day})");
    blocking(move || timed(&operation, || optimize_range(&calc, from_day, to_day))).await
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// GET /api/health
/// Service status
///
/// Returns version, uptime and how many of the configured sites already have a precomputed report.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service status", body = HealthStatus)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: if state.is_shutting_down() { "shutting_down" } else { "ok" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: state.started_at,
        uptime_seconds: state.uptime().as_secs(),
        sites: state.calculators.len(),
        reports_ready: state.reports_ready(),
    })
}

/// GET /api/sites
/// List all configured sites
#[utoipa::path(
    get,
    path = "/api/sites",
    responses(
        (status = 200, description = "List of configured sites", body = Vec<SiteConfig>)
    )
)]
pub async fn list_sites(State(config): State<Config>) -> impl IntoResponse {
    Json(config.sites).into_response()
}

/// GET /api/sites/{id}/transmittance-components
/// Clear-sky transmittance components (a0, a1, k) for the site's climate and altitude
#[utoipa::path(
    get,
    path = "/api/sites/{id}/transmittance-components",
    params(
        ("id" = String, Path, description = "Site ID")
    ),
    responses(
        (status = 200, description = "Transmittance components", body = TransmittanceResponse),
        (status = 404, description = "Site not found", body = ErrorBody)
    )
)]
pub async fn get_transmittance_components(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let Some(calc) = state.calculator(&id) else {
        return site_not_found();
    };
    let response = TransmittanceResponse {
        site_id: id,
        climate: calc.climate(),
        altitude_m: calc.altitude_m(),
        components: calc.transmission().components(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/sites/{id}/days/{day}/geometry
/// Sun geometry at one solar time
///
/// Declination, hour angle, zenith angle, sunrise/sunset hour angles, extraterrestrial irradiance
/// and beam transmittance. `solar_time` is in seconds since solar midnight and defaults to noon.
#[utoipa::path(
    get,
    path = "/api/sites/{id}/days/{day}/geometry",
    params(
        ("id" = String, Path, description = "Site ID"),
        ("day" = i32, Path, description = "Day of year, usually 1..=366"),
        GeometryQuery
    ),
    responses(
        (status = 200, description = "Sun geometry", body = GeometryResponse),
        (status = 400, description = "Non-finite solar time", body = ErrorBody),
        (status = 404, description = "Site not found", body = ErrorBody)
    )
)]
pub async fn get_geometry(
    Path((id, day)): Path<(String, i32)>,
    Query(query): Query<GeometryQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let Some(calc) = state.calculator(&id) else {
        return site_not_found();
    };
    let solar_time = query.solar_time.unwrap_or(SOLAR_NOON);
    if !solar_time.is_finite() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "solar_time must be a finite number of seconds",
        );
    }

    let transmission = calc.transmission();
    let zenith_angle = match transmission.observer().zenith_angle(day, solar_time) {
        Ok(z) => z,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    let response = GeometryResponse {
        site_id: id,
        day_of_year: day,
        solar_time,
        declination: solar_declination(day),
        hour_angle: hour_angle(solar_time),
        zenith_angle,
        sunrise_sunset: calc.sunrise_sunset(day),
        extraterrestrial_irradiance: extraterrestrial_irradiance(day),
        transmittance: transmission.transmittance(day, solar_time),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/sites/{id}/days/{day}/irradiation
/// Total direct irradiation (MJ/m²) collected over the day by a panel at a fixed tilt
#[utoipa::path(
    get,
    path = "/api/sites/{id}/days/{day}/irradiation",
    params(
        ("id" = String, Path, description = "Site ID"),
        ("day" = i32, Path, description = "Day of year, usually 1..=366"),
        IrradiationQuery
    ),
    responses(
        (status = 200, description = "Daily total for the tilt", body = IrradiationResponse),
        (status = 400, description = "Non-finite tilt", body = ErrorBody),
        (status = 404, description = "Site not found", body = ErrorBody)
    )
)]
pub async fn get_irradiation(
    Path((id, day)): Path<(String, i32)>,
    Query(query): Query<IrradiationQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let Some(calc) = state.calculator(&id) else {
        return site_not_found();
    };
    let tilt = query.tilt;
    if !tilt.is_finite() {
        return error_response(StatusCode::BAD_REQUEST, "tilt must be a finite number of degrees");
    }
    match blocking(move || calc.total_direct_irradiation(tilt, day)).await {
        Ok(total_irradiation) => (
            StatusCode::OK,
            Json(IrradiationResponse {
                site_id: id,
                day_of_year: day,
                tilt_degrees: tilt,
                total_irradiation,
            }),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

/// GET /api/sites/{id}/days/{day}/optimal
/// Optimal fixed tilt for the day
///
/// Searches tilts in [-90°, 90°] for the one collecting the most direct
/// irradiation and returns it with the daily total it collects.
#[utoipa::path(
    get,
    path = "/api/sites/{id}/days/{day}/optimal",
    params(
        ("id" = String, Path, description = "Site ID"),
        ("day" = i32, Path, description = "Day of year, usually 1..=366")
    ),
    responses(
        (status = 200, description = "Optimal tilt and daily total", body = OptimizationResult),
        (status = 404, description = "Site not found", body = ErrorBody)
    )
)]
pub async fn get_optimal(
    Path((id, day)): Path<(String, i32)>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let Some(calc) = state.calculator(&id) else {
        return site_not_found();
    };
    // Served from the precomputed report when available
    if let Some(row) = state
        .report(&id)
        .and_then(|rows| rows.into_iter().find(|r| r.day_of_year == day))
    {
        return (StatusCode::OK, Json(row)).into_response();
    }
    match blocking(move || calc.optimize_day(day)).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(resp) => resp,
    }
}

/// GET /api/sites/{id}/report
/// Day-by-day optimal tilt report
///
/// Without `from_day`/`to_day` the precomputed yearly report is returned when ready, otherwise the
/// configured range is computed. `to_day` is exclusive.
#[utoipa::path(
    get,
    path = "/api/sites/{id}/report",
    params(
        ("id" = String, Path, description = "Site ID"),
        ReportQuery
    ),
    responses(
        (
            status = 200,
            description = "Report as JSON (default), CSV or XML",
            body = String,
            content_type = "application/json"
        ),
        (status = 400, description = "Unknown format", body = ErrorBody),
        (status = 404, description = "Site not found", body = ErrorBody)
    )
)]
pub async fn get_report(
    Path(id): Path<String>,
    Query(query): Query<ReportQuery>,
    State(state): State<AppState>,
    State(config): State<Config>,
) -> impl IntoResponse {
    let Some(calc) = state.calculator(&id) else {
        return site_not_found();
    };
    let format = match query.format.as_deref().map(str::parse::<ReportFormat>).transpose() {
        Ok(f) => f.unwrap_or(ReportFormat::Json),
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let rows = match report_rows(&state, &config, &id, calc, &query).await {
        Ok(rows) => rows,
        Err(resp) => return resp,
    };
    match render_report(format, &rows) {
        Ok(body) => ([(header::CONTENT_TYPE, format.content_type())], body).into_response(),
        Err(e) => {
            error!("report rendering failed for {id}: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/sites/{id}/plot/{kind}
/// SVG chart of the report
///
/// `kind` is `tilt` for the optimal tilt or `irradiation` for the daily total at that tilt.
#[utoipa::path(
    get,
    path = "/api/sites/{id}/plot/{kind}",
    params(
        ("id" = String, Path, description = "Site ID"),
        ("kind" = String, Path, description = "tilt or irradiation"),
        ReportQuery
    ),
    responses(
        (status = 200, description = "SVG image", body = String, content_type = "image/svg+xml"),
        (status = 400, description = "Unknown plot kind or empty day range", body = ErrorBody),
        (status = 404, description = "Site not found", body = ErrorBody)
    )
)]
pub async fn get_plot(
    Path((id, kind)): Path<(String, String)>,
    Query(query): Query<ReportQuery>,
    State(state): State<AppState>,
    State(config): State<Config>,
) -> impl IntoResponse {
    let Some(calc) = state.calculator(&id) else {
        return site_not_found();
    };
    let render: PlotRenderer = match kind.as_str() {
        "tilt" => plot_optimal_tilt,
        "irradiation" => plot_total_irradiation,
        other => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Unknown plot kind: {other}. Valid kinds are tilt, irradiation"),
            );
        }
    };
    let rows = match report_rows(&state, &config, &id, calc, &query).await {
        Ok(rows) => rows,
        Err(resp) => return resp,
    };
    if rows.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No days to plot in the requested range");
    }
    let title = config
        .site(&id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| id.clone());
    let plot_config = PlotConfig {
        title,
        ..PlotConfig::default()
    };
    let operation = format!("plot {kind} {id}");
    match blocking(move || timed(&operation, || render(&rows, &plot_config))).await {
        Ok(Ok(svg)) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Ok(Err(e)) => {
            warn!("plot failed for {id}: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(resp) => resp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    const CONFIG: &str = r#"{
        "server": { "port": 8080 },
        "report": { "from_day": 100, "to_day": 102, "precompute": false },
        "sites": [
            { "id": "medan", "name": "Medan", "latitude": 3.5952, "longitude": 98.6722,
              "altitude_m": 26, "climate": "TROPICAL" }
        ]
    }"#;

    fn fixtures() -> (AppState, Config) {
        let config = Config::from_json(CONFIG).unwrap();
        let state = AppState::from_config(&config).unwrap();
        (state, config)
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = fixtures();
        let resp = health(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sites"], 1);
        assert_eq!(body["reports_ready"], 0);
    }

    #[tokio::test]
    async fn test_list_sites() {
        let (_, config) = fixtures();
        let body = body_json(list_sites(State(config)).await.into_response()).await;
        assert_eq!(body[0]["id"], "medan");
        assert_eq!(body[0]["climate"], "TROPICAL");
    }

    #[tokio::test]
    async fn test_transmittance_components() {
        let (state, _) = fixtures();
        let resp = get_transmittance_components(Path("medan".to_string()), State(state.clone()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_approx!(body["components"]["a0"].as_f64().unwrap(), 0.1242, 1e-4);
        assert_approx!(body["components"]["a1"].as_f64().unwrap(), 0.7398, 1e-4);
        assert_approx!(body["components"]["k"].as_f64().unwrap(), 0.3925, 1e-4);

        let missing = get_transmittance_components(Path("nowhere".to_string()), State(state))
            .await
            .into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(missing).await["error"], "Site not found");
    }

    #[tokio::test]
    async fn test_geometry_defaults_to_noon() {
        let (state, _) = fixtures();
        let resp = get_geometry(
            Path(("medan".to_string(), 81)),
            Query(GeometryQuery { solar_time: None }),
            State(state),
        )
        .await
        .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["solar_time"], 43_200.0);
        assert_approx!(body["hour_angle"].as_f64().unwrap(), 0.0, 1e-12);
        let sunset = body["sunrise_sunset"]["sunset"].as_f64().unwrap();
        let sunrise = body["sunrise_sunset"]["sunrise"].as_f64().unwrap();
        assert_approx!(sunrise, -sunset, 1e-12);
        assert!(body["transmittance"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_days_outside_calendar_are_evaluated() {
        let (state, _) = fixtures();
        let calc = state.calculator("medan").unwrap();
        for day in [0, 367] {
            let resp = get_optimal(Path(("medan".to_string(), day)), State(state.clone()))
                .await
                .into_response();
            assert_eq!(resp.status(), StatusCode::OK);
            let body = body_json(resp).await;
            let expected = calc.optimize_day(day);
            assert_eq!(body["day_of_year"], day);
            assert_approx!(
                body["optimal_tilt_degrees"].as_f64().unwrap(),
                expected.optimal_tilt_degrees,
                1e-12
            );
        }
    }

    #[tokio::test]
    async fn test_irradiation_and_optimal() {
        let (state, _) = fixtures();
        let flat = get_irradiation(
            Path(("medan".to_string(), 100)),
            Query(IrradiationQuery { tilt: 0.0 }),
            State(state.clone()),
        )
        .await
        .into_response();
        assert_eq!(flat.status(), StatusCode::OK);
        let flat = body_json(flat).await;
        assert_approx!(flat["total_irradiation"].as_f64().unwrap(), 21.1128, 1e-3);

        let best = get_optimal(Path(("medan".to_string(), 100)), State(state))
            .await
            .into_response();
        let best = body_json(best).await;
        assert_eq!(best["day_of_year"], 100);
        assert_approx!(best["optimal_tilt_degrees"].as_f64().unwrap(), -6.6109, 1e-3);
        assert_approx!(best["total_irradiation"].as_f64().unwrap(), 21.2541, 1e-3);
    }

    fn report_query(
        format: Option<&str>,
        from_day: Option<i32>,
        to_day: Option<i32>,
    ) -> ReportQuery {
        ReportQuery {
            format: format.map(str::to_string),
            from_day,
            to_day,
        }
    }

    async fn fetch_report(state: &AppState, config: &Config, query: ReportQuery) -> Response {
        get_report(
            Path("medan".to_string()),
            Query(query),
            State(state.clone()),
            State(config.clone()),
        )
        .await
        .into_response()
    }

    #[tokio::test]
    async fn test_report_formats() {
        let (state, config) = fixtures();
        let resp = fetch_report(&state, &config, report_query(Some("csv"), None, None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/csv");
        let text = body_text(resp).await;
        // header plus days 100 and 101
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(1).unwrap().starts_with("100,"));

        let resp = fetch_report(&state, &config, report_query(Some("pdf"), None, None)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_report_ranges_are_not_restricted() {
        let (state, config) = fixtures();

        let resp = fetch_report(&state, &config, report_query(None, Some(10), Some(5))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!([]));

        let resp = fetch_report(&state, &config, report_query(None, Some(7), Some(7))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!([]));

        let resp = fetch_report(&state, &config, report_query(None, Some(0), Some(2))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        let days: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["Day"].as_i64().unwrap())
            .collect();
        assert_eq!(days, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_report_uses_precomputed_rows() {
        let (state, config) = fixtures();
        let row = OptimizationResult {
            day_of_year: 7,
            optimal_tilt_degrees: 1.0,
            total_irradiation: 2.0,
        };
        state.store_report("medan", vec![row]);
        let resp = fetch_report(&state, &config, report_query(None, None, None)).await;
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let body = body_json(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["Day"], 7);
    }

    async fn fetch_plot(
        state: &AppState,
        config: &Config,
        kind: &str,
        query: ReportQuery,
    ) -> Response {
        get_plot(
            Path(("medan".to_string(), kind.to_string())),
            Query(query),
            State(state.clone()),
            State(config.clone()),
        )
        .await
        .into_response()
    }

    #[tokio::test]
    async fn test_plot_kinds() {
        let (state, config) = fixtures();
        let one_day = || report_query(None, Some(100), Some(101));
        let resp = fetch_plot(&state, &config, "tilt", one_day()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/svg+xml");
        assert!(body_text(resp).await.contains("Medan"));

        let resp = fetch_plot(&state, &config, "azimuth", one_day()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_plot_needs_at_least_one_day() {
        let (state, config) = fixtures();
        let inverted = report_query(None, Some(10), Some(5));
        let resp = fetch_plot(&state, &config, "irradiation", inverted).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "No days to plot in the requested range");
    }
}
