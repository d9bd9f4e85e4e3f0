#![no_main]

use std::sync::Arc;

use ballot_engine::{BallotEngine, EngineConfig};
use ballot_nullables::{NullClassifier, NullClock};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Loading arbitrary bytes must fail cleanly or yield an engine whose
    // snapshot saves and loads again.
    let Ok(engine) = BallotEngine::load_state(
        data,
        EngineConfig::default(),
        Arc::new(NullClock::new(0)),
        Arc::new(NullClassifier::new()),
    ) else {
        return;
    };

    if let Ok(bytes) = engine.save_state() {
        let reloaded = BallotEngine::load_state(
            &bytes,
            EngineConfig::default(),
            Arc::new(NullClock::new(0)),
            Arc::new(NullClassifier::new()),
        );
        assert!(reloaded.is_ok(), "saved state failed to reload");
    }
});
