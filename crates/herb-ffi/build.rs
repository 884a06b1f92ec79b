use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => dir,
        Err(_) => return,
    };
    let output_dir = PathBuf::from(&crate_dir).join("include");

    if let Err(err) = std::fs::create_dir_all(&output_dir) {
        println!("cargo:warning=could not create include directory: {}", err);
        return;
    }

    // Header generation is best effort; the Rust crate does not depend on it
    match cbindgen::Builder::new().with_crate(&crate_dir).generate() {
        Ok(bindings) => {
            bindings.write_to_file(output_dir.join("herb.h"));
        }
        Err(err) => println!("cargo:warning=herb.h not generated: {}", err),
    }

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/api.rs");
    println!("cargo:rerun-if-changed=src/narray.rs");
    println!("cargo:rerun-if-changed=src/types.rs");
    println!("cargo:rerun-if-changed=src/memory.rs");
    println!("cargo:rerun-if-changed=cbindgen.toml");
}
