#![no_main]
use libfuzzer_sys::fuzz_target;
use qqwry::Database;

// Small fixed database: inline, indirect and redirected records
fn fixture() -> Vec<u8> {
    let mut data = vec![0u8; 8];
    // 8: "CN\0"  11: "ISP\0"
    data.extend_from_slice(b"CN\0ISP\0");
    // 15: range 0.0.0.0 - 9.255.255.255, inline
    data.extend_from_slice(&0x09FF_FFFFu32.to_le_bytes());
    data.extend_from_slice(b"US\0CA\0");
    // 25: range 10.0.0.0 - 99.255.255.255, indirect country and region
    data.extend_from_slice(&0x63FF_FFFFu32.to_le_bytes());
    data.extend_from_slice(&[0x02, 8, 0, 0, 0x02, 11, 0, 0]);
    // 37: range 100.0.0.0 - 255.255.255.255, redirect to 29
    data.extend_from_slice(&u32::MAX.to_le_bytes());
    data.extend_from_slice(&[0x01, 29, 0, 0]);

    let index_begin = data.len() as u32;
    for (start, pointer) in [(0u32, 15u32), (0x0A00_0000, 25), (0x6400_0000, 37)] {
        data.extend_from_slice(&start.to_le_bytes());
        data.extend_from_slice(&pointer.to_le_bytes()[..3]);
    }
    data[0..4].copy_from_slice(&index_begin.to_le_bytes());
    data[4..8].copy_from_slice(&(index_begin + 14).to_le_bytes());
    data
}

thread_local! {
    static DB: Database = Database::from_bytes(fixture()).expect("fixture database loads");
}

fuzz_target!(|data: &[u8]| {
    DB.with(|db| {
        // Address parsing on arbitrary text
        if let Ok(text) = std::str::from_utf8(data) {
            let _ = db.find(text);
        }
        let _ = db.find(&String::from_utf8_lossy(data));

        // Every packed address lands somewhere in the fixture
        if let Ok(bytes) = <[u8; 4]>::try_from(data) {
            let addr = u32::from_be_bytes(bytes);
            assert!(db.lookup_u32(addr).unwrap().is_some());
        }
    });
});
