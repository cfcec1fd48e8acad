use anyhow::Result;

use crate::CliTest;

#[test]
fn test_validate_clean() -> Result<()> {
    let test = CliTest::flutter_project(&[
        ("en", r#"{ "title": "Demo" }"#),
        ("de", r#"{ "title": "Demo" }"#),
    ])?;

    let run = test.run(&["validate"])?;
    assert_eq!(run.code, Some(0), "stdout: {}", run.stdout);
    assert!(run.stdout.contains("Checked 2 locale files - no issues found"));

    Ok(())
}

#[test]
fn test_validate_reports_problems() -> Result<()> {
    let test = CliTest::flutter_project(&[
        (
            "en",
            r#"{
  "title": "Demo",
  "greet": "Hello {name}",
  "@greet": {
    "placeholders": {
      "user": {}
    }
  },
  "2fa": "Two-factor"
}"#,
        ),
        ("de", r#"{ "title": " ", "greet": "Hallo {name}", "2fa": "Zwei" }"#),
    ])?;

    let run = test.run(&["validate"])?;
    assert_eq!(run.code, Some(1));
    let out = &run.stdout;
    assert!(out.contains("error: \"2fa\"  invalid-key"), "stdout: {}", out);
    assert!(out.contains("--> ./lib/l10n/app_en.arb:9:1"));
    assert!(out.contains("warning: \"greet\"  unused-placeholder"));
    assert!(out.contains("error: \"greet\"  undefined-placeholder"));
    assert!(out.contains("warning: \"title\"  empty-translation"));
    assert!(out.contains("note: empty in de"));

    Ok(())
}

#[test]
fn test_validate_missing_translation_at_template() -> Result<()> {
    let test = CliTest::flutter_project(&[
        ("en", "{\n  \"title\": \"Demo\",\n  \"greet\": \"Hello\"\n}"),
        ("de", r#"{ "title": "Demo" }"#),
    ])?;

    let run = test.run(&["validate"])?;
    assert_eq!(run.code, Some(1));
    assert!(run.stdout.contains("error: \"greet\"  missing-translation"));
    assert!(run.stdout.contains("--> ./lib/l10n/app_en.arb:3:1"));
    assert!(run.stdout.contains("note: (\"Hello\") missing in: de"));

    Ok(())
}

#[test]
fn test_validate_reports_rejected_custom_pattern() -> Result<()> {
    let test = CliTest::flutter_project(&[("en", r#"{ "title": "Demo" }"#)])?;
    test.write_file(
        ".arbsyncrc.json",
        r#"{ "enableCustomPatterns": true, "customPatterns": { "variableDeclarations": ["(("] } }"#,
    )?;

    let run = test.run(&["validate"])?;
    assert_eq!(run.code, Some(0), "stdout: {}", run.stdout);
    assert!(run.stdout.contains("warning: \"variable_declarations\"  invalid-pattern"));
    assert!(run.stdout.contains("--> ./.arbsyncrc.json"));

    Ok(())
}
