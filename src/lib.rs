//! Paladium - status monitor for containerized media pipelines
//!
//! Watches the containers of an RTSP/SRT pipeline, pushes their health to
//! dashboard observers over WebSocket, and exposes pull endpoints for status,
//! logs and remote start/stop.
//!
//! The pieces, bottom-up:
//! - [`runtime`]: container runtime access (Docker) and log retrieval
//! - [`health`]: per-service probes, snapshot aggregation and the poll scheduler
//! - [`dashboard`]: fan-out of snapshots to connected observers
//! - [`control`]: start/stop commands
//! - [`metrics`]: Prometheus export of poll and fan-out activity
//! - [`api`]: the HTTP surface tying them together

pub mod api;
pub mod cli;
pub mod config;
pub mod control;
pub mod dashboard;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod runtime;
