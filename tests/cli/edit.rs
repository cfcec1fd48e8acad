use anyhow::Result;

use crate::CliTest;

fn project() -> Result<CliTest> {
    CliTest::flutter_project(&[
        (
            "en",
            r#"{
  "@@locale": "en",
  "title": "Demo",
  "@title": {
    "description": "App title"
  }
}"#,
        ),
        ("de", r#"{ "@@locale": "de", "title": "Demo" }"#),
    ])
}

#[test]
fn test_set_adds_translation() -> Result<()> {
    let test = project()?;

    let run = test.run(&["set", "greet", "de", "Hallo"])?;
    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert_eq!(run.stdout, "✓ Added 'greet' in de\n");

    let de = test.read_arb("de")?;
    assert!(de.starts_with("{\n  \"@@locale\": \"de\""));
    assert!(de.contains("  \"greet\": \"Hallo\""));
    assert!(!de.ends_with('\n'));

    Ok(())
}

#[test]
fn test_set_updates_and_keeps_metadata() -> Result<()> {
    let test = project()?;

    let run = test.run(&["set", "title", "en", "Demo App"])?;
    assert_eq!(run.stdout, "✓ Updated 'title' in en\n");

    let en = test.read_arb("en")?;
    assert!(en.contains("\"title\": \"Demo App\""));
    assert!(en.contains("\"description\": \"App title\""));

    Ok(())
}

#[test]
fn test_set_with_description() -> Result<()> {
    let test = project()?;

    test.run(&["set", "greet", "en", "Hi", "--description", "Greeting"])?;
    let en = test.read_arb("en")?;
    assert!(en.contains("\"@greet\": {\n    \"description\": \"Greeting\"\n  }"), "en: {}", en);

    Ok(())
}

#[test]
fn test_set_rejects_invalid_key() -> Result<()> {
    let test = project()?;

    let run = test.run(&["set", "1st", "en", "First"])?;
    assert_eq!(run.code, Some(2));
    assert!(run.stderr.contains("Error: Invalid key name '1st'"));
    assert!(!test.read_arb("en")?.contains("First"));

    Ok(())
}

#[test]
fn test_set_unknown_locale() -> Result<()> {
    let test = project()?;

    let run = test.run(&["set", "greet", "fr", "Bonjour"])?;
    assert_eq!(run.code, Some(2));
    assert!(run.stderr.contains("fr"), "stderr: {}", run.stderr);

    Ok(())
}

#[test]
fn test_delete_from_every_locale() -> Result<()> {
    let test = project()?;

    let run = test.run(&["delete", "title"])?;
    assert_eq!(run.code, Some(0));
    assert_eq!(run.stdout, "✓ Deleted 'title' from de, en\n");
    assert!(!test.read_arb("de")?.contains("title"));
    assert!(!test.read_arb("en")?.contains("title"));

    Ok(())
}

#[test]
fn test_delete_single_locale() -> Result<()> {
    let test = project()?;

    let run = test.run(&["delete", "title", "--locale", "de"])?;
    assert_eq!(run.stdout, "✓ Deleted 'title' from de\n");
    assert!(!test.read_arb("de")?.contains("title"));
    assert!(test.read_arb("en")?.contains("\"title\""));

    Ok(())
}

#[test]
fn test_delete_unknown_key() -> Result<()> {
    let test = project()?;

    let run = test.run(&["delete", "nope"])?;
    assert_eq!(run.code, Some(2));
    assert!(run.stderr.contains("Key 'nope' not found"));

    Ok(())
}

#[test]
fn test_duplicate_copies_metadata() -> Result<()> {
    let test = project()?;

    let run = test.run(&["duplicate", "title", "heading"])?;
    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert_eq!(run.stdout, "✓ Duplicated 'title' as 'heading' in de, en\n");

    let en = test.read_arb("en")?;
    assert!(en.contains("\"heading\": \"Demo\""));
    assert!(en.contains("\"@heading\""));
    assert!(test.read_arb("de")?.contains("\"heading\": \"Demo\""));

    Ok(())
}

#[test]
fn test_duplicate_refuses_existing_target() -> Result<()> {
    let test = project()?;
    test.run(&["set", "heading", "en", "Heading"])?;

    let run = test.run(&["duplicate", "title", "heading"])?;
    assert_eq!(run.code, Some(2));
    assert!(run.stderr.contains("Key 'heading' already exists"));
    assert!(test.read_arb("en")?.contains("\"heading\": \"Heading\""));

    Ok(())
}

#[test]
fn test_sort_orders_entries() -> Result<()> {
    let test = CliTest::flutter_project(&[(
        "en",
        r#"{ "@@locale": "en", "zebra": "Z", "apple": "A", "mango": "M" }"#,
    )])?;

    let run = test.run(&["sort"])?;
    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert_eq!(run.stdout, "✓ Sorted en\n");

    let en = test.read_arb("en")?;
    let apple = en.find("\"apple\"").unwrap();
    let mango = en.find("\"mango\"").unwrap();
    let zebra = en.find("\"zebra\"").unwrap();
    assert!(en.find("\"@@locale\"").unwrap() < apple);
    assert!(apple < mango && mango < zebra);

    Ok(())
}
