pub mod atmospheric_transmission;
pub mod hottel_model;
pub mod irradiance;
pub mod irradiation;
pub mod numeric;
pub mod observer;
pub mod plot_service;
pub mod report_service;
pub mod sun_position;
