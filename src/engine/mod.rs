//! Scheduling primitives shared by the page components.

pub mod debounce;
pub mod timers;
