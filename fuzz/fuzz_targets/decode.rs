#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate huffarc;

fuzz_target!(|data: &[u8]| {
    // Errors are fine, panics are not
    _ = huffarc::decompress_to_vec(data);
});
