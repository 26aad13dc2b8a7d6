//! GridNav - grid navigation controller for a ground vehicle
//!
//! Drives a vehicle across a fixed-size grid toward a destination cell:
//!
//! - **Refresh thread**: fetches cell reports from a map server and writes
//!   them into the shared grid
//! - **Control thread**: searches a route (depth-first, first found), turns
//!   the vehicle toward the next cell and sends actuator commands over a
//!   serial line
//!
//! Both threads share one [`GridMap`](grid::GridMap) behind a single mutex
//! and stop together when the session shuts down.

pub mod actuator;
pub mod config;
pub mod direction;
pub mod error;
pub mod grid;
pub mod session;
pub mod shared;
pub mod telemetry;
pub mod threads;

pub use config::NavConfig;
pub use error::{NavError, Result};
pub use grid::{Cell, Direction, GridMap, Route};
pub use session::Session;
