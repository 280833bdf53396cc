use axum::{Router, routing::get};

use crate::controllers::irradiation_controller::{
    // Service
    health, list_sites,
    // Per-site engine queries
    get_transmittance_components, get_geometry, get_irradiation, get_optimal,
    // Reports
    get_report, get_plot,
};
use crate::shared_state::SharedState;

/// Routes mounted under `/api`. Site lookups and report settings both come
/// out of the one `SharedState` handed in here.
pub fn api_routes(shared: SharedState) -> Router {
    Router::new()
        .route("/health",                                 get(health))
        .route("/sites",                                  get(list_sites))
        .route("/sites/{id}/transmittance-components",    get(get_transmittance_components))
        .route("/sites/{id}/days/{day}/geometry",         get(get_geometry))
        .route("/sites/{id}/days/{day}/irradiation",      get(get_irradiation))
        .route("/sites/{id}/days/{day}/optimal",          get(get_optimal))
        .route("/sites/{id}/report",                      get(get_report))
        .route("/sites/{id}/plot/{kind}",                 get(get_plot))
        .with_state(shared)
}
