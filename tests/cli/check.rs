use anyhow::Result;

use crate::CliTest;

const EN: &str = r#"{
  "@@locale": "en",
  "title": "Demo",
  "greet": "Hello"
}"#;

const DE: &str = r#"{
  "@@locale": "de",
  "title": "Demo"
}"#;

#[test]
fn test_clean_project() -> Result<()> {
    let test = CliTest::flutter_project(&[("en", EN), ("de", DE)])?;
    test.write_file(
        "lib/main.dart",
        "import 'package:flutter/widgets.dart';

Widget build(BuildContext context) => Text(S.of(context).title);
",
    )?;

    let run = test.run(&["check"])?;
    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert!(
        run.stdout
            .contains("Checked 1 source file, 2 locale files - no issues found"),
        "stdout: {}",
        run.stdout
    );

    Ok(())
}

#[test]
fn test_undefined_key_fails() -> Result<()> {
    let test = CliTest::flutter_project(&[("en", EN), ("de", DE)])?;
    test.write_file(
        "lib/home.dart",
        "final label = S.of(context).title;
final other = S.of(context).nope;
",
    )?;

    let run = test.run(&["check"])?;
    assert_eq!(run.code, Some(1));
    assert!(run.stdout.contains("error: \"nope\"  undefined-key"), "stdout: {}", run.stdout);
    assert!(run.stdout.contains("--> ./lib/home.dart:2:"));
    assert!(run.stdout.contains("2 | final other = S.of(context).nope;"));
    assert!(!run.stdout.contains("\"title\""));

    Ok(())
}

#[test]
fn test_partial_translation_is_a_warning() -> Result<()> {
    let test = CliTest::flutter_project(&[("en", EN), ("de", DE)])?;
    test.write_file("lib/a.dart", "final g = context.l10n.greet;\n")?;

    let run = test.run(&["check"])?;
    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("warning: \"greet\"  partial-translation"));
    assert!(run.stdout.contains("= note: missing in: de"));
    assert!(run.stdout.contains("1 problems (0 errors, 1 warning)"));

    Ok(())
}

#[test]
fn test_call_arguments_are_checked() -> Result<()> {
    let test = CliTest::flutter_project(&[
        (
            "en",
            r#"{
  "greet": "Hello {name}",
  "@greet": { "placeholders": { "name": {} } }
}"#,
        ),
        ("de", r#"{ "greet": "Hallo {name}" }"#),
    ])?;
    test.write_file(
        "lib/home.dart",
        "final a = S.of(context).greet(bogus: 1);\nfinal b = S.of(context).greet(name: user);\n",
    )?;

    let run = test.run(&["check"])?;
    assert_eq!(run.code, Some(0), "stdout: {}", run.stdout);
    let out = &run.stdout;
    assert!(out.contains("warning: \"greet\"  missing-parameter"), "stdout: {}", out);
    assert!(out.contains("= note: placeholder 'name' is declared but not passed"));
    assert!(out.contains("info: \"greet\"  unknown-parameter"));
    assert!(out.contains("= note: 'bogus' is not a placeholder of this message"));
    assert!(!out.contains("--> ./lib/home.dart:2:"));
    assert!(out.contains("1 problems (0 errors, 1 warning)"));

    Ok(())
}

#[test]
fn test_rejected_custom_pattern_is_reported() -> Result<()> {
    let test = CliTest::flutter_project(&[("en", EN), ("de", DE)])?;
    test.write_file(
        ".arbsyncrc.json",
        r#"{ "enableCustomPatterns": true, "customPatterns": { "contextL10n": "(unclosed" } }"#,
    )?;
    test.write_file("lib/main.dart", "final x = context.l10n.nope;\n")?;

    let run = test.run(&["check"])?;
    let out = &run.stdout;
    assert!(out.contains("warning: \"context_l10n\"  invalid-pattern"), "stdout: {}", out);
    assert!(out.contains("--> ./.arbsyncrc.json"));
    // The default patterns still find the reference.
    assert!(out.contains("error: \"nope\"  undefined-key"));
    assert_eq!(run.code, Some(1));

    Ok(())
}

#[test]
fn test_generated_files_are_skipped() -> Result<()> {
    let test = CliTest::flutter_project(&[("en", EN), ("de", DE)])?;
    test.write_file("lib/model.g.dart", "final x = S.of(context).nope;\n")?;

    let run = test.run(&["check"])?;
    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("Checked 0 source files, 2 locale files"));

    Ok(())
}

#[test]
fn test_config_ignores() -> Result<()> {
    let test = CliTest::flutter_project(&[("en", EN), ("de", DE)])?;
    test.write_file(".arbsyncrc.json", r#"{ "ignores": ["**/legacy/**"] }"#)?;
    test.write_file("lib/legacy/old.dart", "final x = S.of(context).nope;\n")?;
    test.write_file("lib/main.dart", "final x = S.of(context).title;\n")?;

    let run = test.run(&["check"])?;
    assert_eq!(run.code, Some(0), "stdout: {}", run.stdout);
    assert!(run.stdout.contains("Checked 1 source file"));

    Ok(())
}

#[test]
fn test_l10n_yaml_arb_dir() -> Result<()> {
    let test = CliTest::flutter_project(&[])?;
    test.write_file("l10n.yaml", "arb-dir: assets/i18n\ntemplate-arb-file: intl_en.arb\n")?;
    test.write_file("assets/i18n/intl_en.arb", r#"{ "title": "Demo" }"#)?;
    test.write_file("lib/main.dart", "final x = S.of(context).title;\n")?;

    let run = test.run(&["check"])?;
    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert!(run.stdout.contains("1 locale file - no issues found"));

    Ok(())
}

#[test]
fn test_broken_arb_is_reported() -> Result<()> {
    let test = CliTest::flutter_project(&[("en", EN), ("de", "{ not json")])?;

    let run = test.run(&["check"])?;
    assert_eq!(run.code, Some(1));
    assert!(run.stdout.contains("parse-error"));
    assert!(run.stdout.contains("--> ./lib/l10n/app_de.arb"));

    Ok(())
}

#[test]
fn test_no_catalogs_is_an_error() -> Result<()> {
    let test = CliTest::flutter_project(&[])?;

    let run = test.run(&["check"])?;
    assert_eq!(run.code, Some(2));
    assert!(
        run.stderr.contains("Error: No catalogs loaded from ./lib/l10n"),
        "stderr: {}",
        run.stderr
    );

    Ok(())
}

#[test]
fn test_help() -> Result<()> {
    let test = CliTest::new()?;

    let run = test.run(&["--help"])?;
    assert_eq!(run.code, Some(0));
    for command in ["check", "status", "set", "fill-missing", "export", "watch", "init"] {
        assert!(run.stdout.contains(command), "missing {} in help", command);
    }

    Ok(())
}
