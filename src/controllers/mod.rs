pub mod dashboard_controller;
