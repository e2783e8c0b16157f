//! Shared helpers for unit tests that bind local sockets.

pub(crate) mod socket_guard;
