use anyhow::Result;

use crate::CliTest;

const DE: &str = r#"{ "@@locale": "de", "title": "Demo" }"#;

fn project() -> Result<CliTest> {
    CliTest::flutter_project(&[
        (
            "en",
            r#"{ "@@locale": "en", "title": "Demo", "greet": "Hello", "blank": "" }"#,
        ),
        ("de", DE),
    ])
}

#[test]
fn test_fill_missing_dry_run() -> Result<()> {
    let test = project()?;

    let run = test.run(&["fill-missing"])?;
    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert!(run.stdout.contains("  de: greet\n"), "stdout: {}", run.stdout);
    assert!(run.stdout.contains("Would add 1 placeholder value from 'en'."));
    assert!(run.stdout.contains("Run with --apply to write them."));
    assert_eq!(test.read_arb("de")?, DE);

    Ok(())
}

#[test]
fn test_fill_missing_apply() -> Result<()> {
    let test = project()?;

    let run = test.run(&["fill-missing", "--apply"])?;
    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert!(run.stdout.contains("Added 1 placeholder value from 'en' in 1 file."));

    let de = test.read_arb("de")?;
    assert!(de.contains("\"greet\": \"[DE] Hello\""));
    // Keys without a default value are left alone.
    assert!(!de.contains("blank"));

    let run = test.run(&["fill-missing"])?;
    assert!(run.stdout.contains("No missing translations"));

    Ok(())
}
