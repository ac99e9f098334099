pub mod config;
pub mod error;
pub mod export;
pub mod highlight;
pub mod normalize;
pub mod present;
pub mod render;
pub mod session;
