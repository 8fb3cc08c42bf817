//! UniFFI bindgen CLI tool for generating language bindings.
//!
//! Generate Swift bindings:
//! ```bash
//! cargo run --features uniffi-cli --bin uniffi-bindgen generate --library target/release/librecipe_sync.so --language swift --out-dir ./bindings
//! ```
//!
//! Generate Kotlin bindings:
//! ```bash
//! cargo run --features uniffi-cli --bin uniffi-bindgen generate --library target/release/librecipe_sync.so --language kotlin --out-dir ./bindings
//! ```

fn main() {
    uniffi::uniffi_bindgen_main()
}
