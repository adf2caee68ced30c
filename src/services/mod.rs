pub mod activity;
pub mod alerts;
pub mod cache;
pub mod dashboard;
pub mod health;
pub mod stats;
