//! Generate a table of every bez glyph in the test data

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

fn main() {
    println!("cargo:rerun-if-changed=test_data/bez");

    let out_dir = PathBuf::from_str(&std::env::var("OUT_DIR").unwrap()).unwrap();
    let out_file = out_dir.join("bez_glyphs.rs");

    // Cargo ensures working directory is set so relative paths should be safe
    // <https://doc.rust-lang.org/cargo/reference/environment-variables.html#environment-variables-cargo-sets-for-build-scripts>
    let bez_dir = Path::new("test_data/bez");
    assert!(bez_dir.is_dir(), "{bez_dir:?} should be a directory");

    let mut names = Vec::new();
    for dir_entry in fs::read_dir(bez_dir).unwrap() {
        let path = dir_entry.unwrap().path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("bez") {
            continue;
        }
        let basename = path.file_name().unwrap().to_str().unwrap().to_string();
        // finding things under src from OUT_DIR is weird, just copy the file
        fs::copy(&path, out_dir.join(&basename)).unwrap();
        names.push(basename);
    }
    // read_dir order is platform dependent
    names.sort();

    let mut content = String::new();
    content.push_str("/// Every glyph in `test_data/bez` as (glyph name, bez source).\n");
    content.push_str("pub static ALL: &[(&str, &str)] = &[\n");
    for basename in &names {
        let name = basename.trim_end_matches(".bez").trim_end_matches('_');
        content.push_str(&format!(
            "    (\"{name}\", include_str!(\"{basename}\")),\n"
        ));
    }
    content.push_str("];\n");

    fs::write(out_file, content).unwrap();
}
