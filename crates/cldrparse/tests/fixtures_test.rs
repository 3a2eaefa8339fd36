use std::fs;

use cldrparse::{from_str, Value};

#[test]
fn test_valid_fixtures() -> Result<(), Box<dyn std::error::Error>> {
    let valid_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/valid");
    for entry in fs::read_dir(valid_dir)? {
        let entry = entry?;
        let path = entry.path();
        let content = fs::read_to_string(&path)?;
        let result = from_str(&content);
        if result.is_err() {
            return Err(
                std::io::Error::other(format!("Failed to parse valid file: {path:?}")).into(),
            );
        }
    }
    Ok(())
}

#[test]
fn test_invalid_fixtures() -> Result<(), Box<dyn std::error::Error>> {
    let invalid_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/invalid");
    for entry in fs::read_dir(invalid_dir)? {
        let entry = entry?;
        let path = entry.path();
        let content = fs::read_to_string(&path)?;
        let result = from_str(&content);
        if result.is_ok() {
            return Err(std::io::Error::other(format!(
                "Should fail to parse invalid file: {path:?}"
            ))
            .into());
        }
    }
    Ok(())
}

#[test]
fn test_en_fixture_paths() -> Result<(), Box<dyn std::error::Error>> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/valid/en.xml");
    let value = from_str(&fs::read_to_string(path)?)?;

    let wide_january = value.find(
        "ldml/dates/calendars/calendar[@type=\"gregorian\"]/months\
         /monthContext[@type=\"format\"]/monthWidth[@type=\"wide\"]/month[@type=\"1\"]",
    );
    assert_eq!(wide_january.and_then(Value::as_str), Some("January"));

    let usd = value.find("ldml/numbers/currencies/currency[@type=\"USD\"]/symbol");
    assert_eq!(usd.and_then(Value::as_str), Some("$"));
    Ok(())
}

#[test]
fn test_supplemental_fixture_keys() -> Result<(), Box<dyn std::error::Error>> {
    let path = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/valid/supplemental.xml"
    );
    let value = from_str(&fs::read_to_string(path)?)?;

    // iso4217 distinguishes; digits and rounding do not
    let fractions = value
        .find("supplementalData/currencyData/fractions")
        .and_then(Value::as_map)
        .ok_or("fractions missing")?;
    let keys: Vec<_> = fractions.keys().collect();
    assert_eq!(keys, vec!["info[@iso4217=\"JPY\"]", "info[@iso4217=\"CHF\"]"]);
    Ok(())
}
