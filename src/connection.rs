use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Protocol version a connection starts with.
pub const RESP2: u8 = 2;
/// Protocol version that enables map replies.
pub const RESP3: u8 = 3;

/// Per-client connection state.
#[derive(Debug)]
pub struct ClientState {
    pub id: u64,
    /// Negotiated protocol version (2 until HELLO says otherwise).
    pub proto: u8,
}

impl ClientState {
    pub fn new() -> Self {
        ClientState {
            id: NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed),
            proto: RESP2,
        }
    }
}

impl Default for ClientState {
    fn default() -> Self {
        ClientState::new()
    }
}
