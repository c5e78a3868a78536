//! HTTP API: feature exports, restock decisions and forecasts.

pub mod app;
