use anyhow::Result;

use crate::CliTest;

fn project() -> Result<CliTest> {
    CliTest::flutter_project(&[
        ("en", r#"{ "title": "Demo", "greet": "Hello" }"#),
        ("de", r#"{ "title": "Demo" }"#),
    ])
}

#[test]
fn test_status_all_keys() -> Result<()> {
    let test = project()?;

    let run = test.run(&["status"])?;
    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert!(run.stdout.contains("◐ greet  partial   1/2  missing: de\n"), "stdout: {}", run.stdout);
    assert!(run.stdout.contains("✓ title  complete  2/2\n"));
    assert!(
        run.stdout
            .contains("2 keys in 2 locales: 1 complete, 1 partial, 0 missing (50.0% complete)")
    );
    assert!(run.stdout.contains("  de: 1 translated, 1 missing"));
    assert!(run.stdout.contains("  en: 2 translated, 0 missing"));

    Ok(())
}

#[test]
fn test_status_selected_keys() -> Result<()> {
    let test = project()?;

    let run = test.run(&["status", "nope", "title"])?;
    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("✘ nope   missing   0/2  missing: de, en"), "stdout: {}", run.stdout);
    assert!(run.stdout.contains("✓ title  complete  2/2"));
    assert!(!run.stdout.contains("greet "));

    Ok(())
}

#[test]
fn test_status_reports_unparsable_files() -> Result<()> {
    let test = project()?;
    test.write_arb("fr", "{")?;

    let run = test.run(&["status"])?;
    assert_eq!(run.code, Some(0));
    assert!(run.stderr.contains("1 file(s) could not be parsed"), "stderr: {}", run.stderr);

    let run = test.run(&["status", "-v"])?;
    assert!(run.stdout.contains("--> ./lib/l10n/app_fr.arb"));

    Ok(())
}
