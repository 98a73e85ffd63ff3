#![no_main]
use libfuzzer_sys::fuzz_target;
use qqwry::validation::{validate_bytes, ValidationLevel};

fuzz_target!(|data: &[u8]| {
    // Arbitrary files must load or fail cleanly, never panic
    let _ = validate_bytes(data, ValidationLevel::Strict);

    let Ok(db) = qqwry::Database::from_bytes(data.to_vec()) else {
        return;
    };

    // Every entry either decodes or reports an error
    for entry in db.entries() {
        let _ = entry;
    }

    // Probe around every range boundary
    for i in 0..db.len() {
        let index = db.index();
        if let (Some(start), Some(end)) = (index.start(i), index.end(i)) {
            for addr in [start.wrapping_sub(1), start, end, end.wrapping_add(1)] {
                let _ = db.find_u32(addr);
            }
        }
    }
});
