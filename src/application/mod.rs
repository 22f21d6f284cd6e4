// Application layer - Use cases and the seams to the backend
pub mod analytics_repository;
pub mod dashboard_service;
pub mod datasource_service;
pub mod poller;
pub mod record_page;
pub mod report_service;
pub mod settings_service;
