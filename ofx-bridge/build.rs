//! Build script for ofx-bridge
//!
//! Compiles the replay engine, and with the `libofx` feature the libofx
//! adapter, into a static library the trampolines are exercised through.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=native/ofx_bridge.h");
    println!("cargo:rerun-if-changed=native/ofx_replay.c");
    println!("cargo:rerun-if-changed=native/libofx_adapter.c");

    let manifest_dir = PathBuf::from(
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo"),
    );
    let native = manifest_dir.join("native");

    let mut build = cc::Build::new();
    build
        .file(native.join("ofx_replay.c"))
        .include(&native)
        .warnings(true)
        .flag_if_supported("-std=c99");

    if env::var_os("CARGO_FEATURE_LIBOFX").is_some() {
        build.file(native.join("libofx_adapter.c"));
        if let Ok(include) = env::var("LIBOFX_INCLUDE_DIR") {
            build.include(include);
        }
        if let Ok(lib_dir) = env::var("LIBOFX_LIB_DIR") {
            println!("cargo:rustc-link-search=native={}", lib_dir);
        }
        println!("cargo:rerun-if-env-changed=LIBOFX_INCLUDE_DIR");
        println!("cargo:rerun-if-env-changed=LIBOFX_LIB_DIR");
    }

    build.compile("ofxb_native");

    // libofx must come after the adapter on the link line
    if env::var_os("CARGO_FEATURE_LIBOFX").is_some() {
        println!("cargo:rustc-link-lib=dylib=ofx");
    }
}
