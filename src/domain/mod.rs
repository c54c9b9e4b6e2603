// Domain layer - Value types shared by the engine and the presentation boundary
pub mod dashboard;
pub mod fetch;
pub mod forecast;
pub mod gauge;
pub mod metric;
pub mod reading;
pub mod selection;
pub mod telemetry;
