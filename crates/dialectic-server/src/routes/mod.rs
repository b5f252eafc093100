pub mod classify;
pub mod config;
pub mod counters;
pub mod events;
pub mod trigger;
pub mod ws;
