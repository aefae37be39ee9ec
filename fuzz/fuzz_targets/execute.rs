#![no_main]

use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use scriptbox::{Engine, ExecConfig, Namespace};

fuzz_target!(|data: &[u8]| {
    if let Ok(code) = std::str::from_utf8(data) {
        // Bounded so loops in the input terminate; the engine must never panic or hang.
        let engine = Engine::new(
            ExecConfig::default()
                .with_max_steps(10_000)
                .with_deadline(Duration::from_millis(200)),
        );
        let result = engine.execute(code, &Namespace::new());
        assert!(result.state.is_terminal());
    }
});
