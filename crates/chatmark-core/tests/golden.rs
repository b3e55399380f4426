use chatmark_core::{emit_html, parse};
use std::fs;
use std::path::{Path, PathBuf};

#[test]
fn golden_fixtures() -> Result<(), Box<dyn std::error::Error>> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let fixtures_dir = root.join("tests/fixtures");
    let expect_dir = root.join("tests/expect");

    let mut fixtures = collect_fixtures(&fixtures_dir)?;
    fixtures.sort();
    assert!(!fixtures.is_empty(), "no fixtures in {:?}", fixtures_dir);

    for fixture in fixtures {
        let name = file_stem(&fixture)?;
        let contents = fs::read_to_string(&fixture)?;
        // Fixture files end with a newline the message itself does not have.
        let source = contents.strip_suffix('\n').unwrap_or(&contents);
        let html = emit_html(&parse(source).document);

        let html_path = expect_dir.join(format!("{}.html", name));
        let expected = fs::read_to_string(&html_path)
            .map_err(|err| format!("missing expectation for fixture {}: {}", name, err))?;
        assert_eq!(
            html.trim_end(),
            expected.trim_end(),
            "HTML mismatch for fixture {}",
            name
        );
    }

    Ok(())
}

fn collect_fixtures(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut fixtures = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("md") {
            fixtures.push(path);
        }
    }
    Ok(fixtures)
}

fn file_stem(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|value| value.to_string())
        .ok_or_else(|| "fixture name is not valid UTF-8".into())
}
