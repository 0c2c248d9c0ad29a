// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=KEEL_MEMORY_X");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let memory_x = match env::var("KEEL_MEMORY_X") {
        Ok(path) => PathBuf::from(path),
        Err(_) => manifest_dir.join("memory.x"),
    };
    println!("cargo:rerun-if-changed={}", memory_x.display());

    // cortex-m-rt's link.x includes memory.x from the linker search path.
    let out = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::copy(&memory_x, out.join("memory.x")).expect("memory.x must exist");
    println!("cargo:rustc-link-search={}", out.display());

    // The MicroPython core is built by its own makefile into libmicropython.a.
    println!("cargo:rerun-if-env-changed=KEEL_MICROPYTHON_LIB_DIR");
    let bare_metal = env::var("CARGO_CFG_TARGET_OS").map(|os| os == "none").unwrap_or(false);
    if let (true, Ok(dir)) = (bare_metal, env::var("KEEL_MICROPYTHON_LIB_DIR")) {
        println!("cargo:rustc-link-search=native={}", dir);
        println!("cargo:rustc-link-lib=static=micropython");
    }
}
