pub mod irradiation_controller;
