//! Observers that watch a running stream session.

pub mod reporter;
