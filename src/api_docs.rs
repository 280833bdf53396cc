use utoipa::OpenApi;

use crate::config;
use crate::controllers::irradiation_controller;
use crate::models::{api, solar};
use crate::services::report_service;

#[derive(OpenApi)]
#[openapi(
    paths(
        irradiation_controller::health,
        irradiation_controller::list_sites,
        irradiation_controller::get_transmittance_components,
        irradiation_controller::get_geometry,
        irradiation_controller::get_irradiation,
        irradiation_controller::get_optimal,
        irradiation_controller::get_report,
        irradiation_controller::get_plot
    ),
    components(
        schemas(
            config::SiteConfig,
            solar::TransmittanceComponents,
            solar::SunriseSunset,
            solar::OptimizationResult,
            api::HealthStatus,
            api::TransmittanceResponse,
            api::GeometryResponse,
            api::IrradiationResponse,
            api::ErrorBody,
            report_service::ReportFormat
        )
    ),
    tags(
        (name = "solar-orientation", description = "Optimal fixed panel tilt and daily direct irradiation")
    )
)]
pub struct ApiDoc;
