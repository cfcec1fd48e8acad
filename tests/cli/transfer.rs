use anyhow::Result;
use serde_json::Value;

use crate::CliTest;

fn project() -> Result<CliTest> {
    CliTest::flutter_project(&[
        ("en", r#"{ "title": "Demo", "greet": "Hello" }"#),
        ("de", r#"{ "title": "Demo" }"#),
    ])
}

#[test]
fn test_export_matrix() -> Result<()> {
    let test = project()?;

    let run = test.run(&["export", "translations.json"])?;
    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert_eq!(run.stdout, "✓ Exported 2 keys to translations.json\n");

    let matrix: Value = serde_json::from_str(&test.read_file("translations.json")?)?;
    assert_eq!(matrix["greet"]["en"], "Hello");
    assert_eq!(matrix["greet"]["de"], "");
    assert_eq!(matrix["title"]["de"], "Demo");

    Ok(())
}

#[test]
fn test_import_matrix() -> Result<()> {
    let test = project()?;
    test.write_file(
        "import.json",
        r#"{
  "greet": { "de": "Hallo", "en": "" },
  "title": { "de": "Demo DE" }
}"#,
    )?;

    let run = test.run(&["import", "import.json"])?;
    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert_eq!(run.stdout, "✓ Imported 2 values into de\n");

    let de = test.read_arb("de")?;
    assert!(de.contains("\"greet\": \"Hallo\""));
    assert!(de.contains("\"title\": \"Demo DE\""));
    assert!(test.read_arb("en")?.contains("\"greet\": \"Hello\""));

    Ok(())
}

#[test]
fn test_import_rejects_bad_json() -> Result<()> {
    let test = project()?;
    test.write_file("import.json", "[1, 2]")?;

    let run = test.run(&["import", "import.json"])?;
    assert_eq!(run.code, Some(2));
    assert!(run.stderr.contains("Failed to parse import file"));

    Ok(())
}
