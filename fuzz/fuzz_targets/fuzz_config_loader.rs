#![no_main]

use libfuzzer_sys::fuzz_target;
use silkcore::config::ConfigLoader;
use silkcore::sim::build_actor;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        let loader = ConfigLoader::with_defaults();

        // Anything that passes validation must also build
        if let Ok(loaded) = loader.load_from_str(yaml_str) {
            for actor in &loaded.config.actors {
                assert!(build_actor(actor).is_ok(), "validated actor failed to build");
            }
        }
    }
});
