//! Usage: Per-attempt client nonce that binds the started flow to its token exchange.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

const NONCE_BYTES: usize = 32;

pub(crate) fn generate_client_nonce() -> String {
    let mut random = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut random);
    URL_SAFE_NO_PAD.encode(random)
}
