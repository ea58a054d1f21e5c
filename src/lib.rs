//! MedMusic: a terminal Spotify player
//!
//! # Modules
//!
//! - `auth` - Implicit-grant token extraction and the authorization URL
//! - `session` - Persisted token storage and the landed location
//! - `config` - Built-in defaults with environment overrides
//! - `api` - Spotify Web API and text-generation clients
//! - `playback` - Playback engine adapter and player lifecycle
//! - `model` - Application state
//! - `controller` - Input handling and background tasks
//! - `view` - ratatui rendering
//! - `theme` - Colors and the animated accent
//! - `logging` - File-based tracing setup

pub mod api;
pub mod auth;
pub mod config;
pub mod controller;
pub mod logging;
pub mod model;
pub mod playback;
pub mod session;
pub mod theme;
pub mod view;
