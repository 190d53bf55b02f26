#![no_main]

use libfuzzer_sys::fuzz_target;
use silkcore::config::TriggerConfig;
use silkcore::sim::blueprint::build_trigger;

fuzz_target!(|data: &[u8]| {
    if let Ok(json_value) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok(trigger) = serde_json::from_value::<TriggerConfig>(json_value) {
            let _ = trigger.depth();
            let _ = build_trigger(&trigger);
        }
    }
});
