pub mod http;
pub mod notify_client;
pub mod observability;
pub mod persistence;
pub mod web;
