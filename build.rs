//! Build script for the Si4703 driver
//!
//! Only the demo firmware needs linker configuration; the library builds
//! unchanged on the host.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // embassy-stm32 generates memory.x, defmt needs its own linker fragment
    if std::env::var_os("CARGO_FEATURE_EMBEDDED").is_some() {
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }
}
