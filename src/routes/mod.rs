pub mod irradiation_routes;
