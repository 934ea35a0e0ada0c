//! Shared helpers for ferry integration tests.

use rand::RngCore;
use std::sync::Once;

/// Install a tracing subscriber once per test binary. Honors `RUST_LOG`;
/// silent by default.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Deterministically seeded random payload of the given length.
pub fn random_payload(len: usize) -> Vec<u8> {
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5EED);
    let mut buf = vec![0u8; len];
    rng.fill_bytes(&mut buf);
    buf
}
