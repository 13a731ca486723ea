/// Generates one test function per .md file in tests/corpus/.
/// Each file gets its own test name in the runner.
fn main() {
    let out_dir = std::env::var("OUT_DIR").unwrap();
    let dest = std::path::Path::new(&out_dir).join("corpus_tests.rs");

    let mut code = String::from(
        r#"mod corpus {
    use super::corpus_test;
"#,
    );

    let mut entries: Vec<_> = std::fs::read_dir("tests/corpus")
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "md") {
            let name = path.file_stem().unwrap().to_str().unwrap();
            code.push_str(&format!(
                r#"
    #[test]
    fn {name}() {{
        corpus_test("{name}");
    }}
"#
            ));
        }
    }

    code.push_str("}\n");
    std::fs::write(&dest, code).unwrap();

    println!("cargo::rerun-if-changed=tests/corpus");
}
