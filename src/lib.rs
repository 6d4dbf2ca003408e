//! # Shardis
//!
//! A sharded, Redis-compatible in-memory key-value store.
//!
//! Keys are hashed with CRC32 into a fixed number of blocks, and the blocks
//! are split into contiguous ranges owned by partitions. Every block holds
//! its own locked bucket table, so clients touching different blocks never
//! contend. Values are plain strings or string-to-string maps, served over
//! RESP2 with optional RESP3 map replies.

pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod resp;
pub mod server;
pub mod store;
pub mod types;
