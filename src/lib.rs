#![forbid(unsafe_code)]

//! Client side of the YTDownloader service: validates a pasted video URL,
//! asks the backend for metadata, and turns the answer into download actions.

pub mod api;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod formats;
pub mod http;
pub mod links;
pub mod logging;
pub mod navigate;
pub mod render;
