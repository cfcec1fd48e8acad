use anyhow::Result;
use serde_json::Value;

use crate::CliTest;

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let run = test.run(&["init"])?;
    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert_eq!(run.stdout, "✓ Created .arbsyncrc.json\n");

    let config: Value = serde_json::from_str(&test.read_file(".arbsyncrc.json")?)?;
    assert_eq!(config["includes"], serde_json::json!(["lib"]));
    assert_eq!(config["debounceDelay"], 500);
    assert!(test.root().join(".arbsyncrc.json").is_file());

    Ok(())
}

#[test]
fn test_init_existing_config() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".arbsyncrc.json", "{}")?;

    let run = test.run(&["init"])?;
    assert_eq!(run.code, Some(2));
    assert!(run.stderr.contains(".arbsyncrc.json already exists"));
    assert_eq!(test.read_file(".arbsyncrc.json")?, "{}");

    Ok(())
}
