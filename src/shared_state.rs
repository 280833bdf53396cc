use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use axum::extract::FromRef;
use chrono::{DateTime, Utc};

use crate::config::{Config, ConfigError};
use crate::models::solar::OptimizationResult;
use crate::services::irradiation::IrradiationCalculator;

#[derive(Clone, Debug)]
pub struct AppState {
    /// One calculator per site id, built once at startup
    pub calculators: Arc<HashMap<String, IrradiationCalculator>>,
    /// Precomputed yearly reports, keyed by site id
    pub reports: Arc<RwLock<HashMap<String, Vec<OptimizationResult>>>>,
    /// Set on Ctrl-C; background report jobs stop between days
    pub shutdown: Arc<AtomicBool>,
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl AppState {
    pub fn new(calculators: HashMap<String, IrradiationCalculator>) -> Self {
        Self {
            calculators: Arc::new(calculators),
            reports: Arc::new(RwLock::new(HashMap::new())),
            shutdown: Arc::new(AtomicBool::new(false)),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut calculators = HashMap::with_capacity(config.sites.len());
        for site in &config.sites {
            let calc = IrradiationCalculator::for_site(site, config.max_abs_latitude)
                .map_err(|source| ConfigError::InvalidSite {
                    id: site.id.clone(),
                    source,
                })?;
            calculators.insert(site.id.clone(), calc);
        }
        Ok(Self::new(calculators))
    }

    pub fn calculator(&self, site_id: &str) -> Option<IrradiationCalculator> {
        self.calculators.get(site_id).copied()
    }

    pub fn store_report(&self, site_id: &str, rows: Vec<OptimizationResult>) {
        if let Ok(mut map) = self.reports.write() {
            map.insert(site_id.to_string(), rows);
        }
    }

    pub fn report(&self, site_id: &str) -> Option<Vec<OptimizationResult>> {
        self.reports.read().ok().and_then(|map| map.get(site_id).cloned())
    }

    pub fn reports_ready(&self) -> usize {
        self.reports.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Router state; handlers extract `State<AppState>` or `State<Config>`.
#[derive(Clone, Debug)]
pub struct SharedState {
    pub app: AppState,
    pub config: Config,
}

impl FromRef<SharedState> for AppState {
    fn from_ref(shared: &SharedState) -> Self {
        shared.app.clone()
    }
}

impl FromRef<SharedState> for Config {
    fn from_ref(shared: &SharedState) -> Self {
        shared.config.clone()
    }
}
