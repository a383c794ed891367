//! Random secret generation.

use rand::RngCore;

/// Length of a generated token in raw bytes.
pub const TOKEN_BYTES: usize = 32;

/// Generate a random token: 32 bytes from the thread RNG, hex-encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
