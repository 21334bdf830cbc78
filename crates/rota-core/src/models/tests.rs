//! Tests for the data models.

use jiff::{civil::date, tz::TimeZone, Timestamp};

use crate::{
    calendar::DateKey,
    models::{EntryRecord, FieldValue, ObjectId, ResourceRow},
};

fn key(day: i8) -> DateKey {
    DateKey::encode(date(2024, 2, day))
}

#[test]
fn test_set_cell_overwrites_same_day() {
    let mut row = ResourceRow::new(ObjectId::new("r1"), "Alice");
    row.set_cell(key(10), ObjectId::new("e1"), "first");
    row.set_cell(key(10), ObjectId::new("e2"), "second");

    assert_eq!(row.entries_by_date_key.len(), 1);
    assert_eq!(row.entry_at(&key(10)), Some(&ObjectId::new("e2")));
    assert_eq!(row.content_at(&key(10)), Some("second"));
}

#[test]
fn test_date_key_of_finds_entry() {
    let mut row = ResourceRow::new(ObjectId::new("r1"), "Alice");
    row.set_cell(key(3), ObjectId::new("e1"), "x");

    assert_eq!(row.date_key_of(&ObjectId::new("e1")), Some(&key(3)));
    assert_eq!(row.date_key_of(&ObjectId::new("missing")), None);
}

#[test]
fn test_entry_date_key_requires_date() {
    let mut entry = EntryRecord {
        identity: ObjectId::new("e1"),
        owner: Some(ObjectId::new("r1")),
        occurs_on: None,
        display_content: "x".to_string(),
    };
    assert_eq!(entry.date_key(), None);

    entry.occurs_on = Some(date(2024, 2, 10));
    assert_eq!(entry.date_key(), Some(key(10)));
}

#[test]
fn test_field_value_integer_views() {
    assert_eq!(FieldValue::Integer(2024).as_integer(), Some(2024));
    assert_eq!(FieldValue::Decimal(2.0).as_integer(), Some(2));
    assert_eq!(FieldValue::Decimal(2.5).as_integer(), None);
    assert_eq!(FieldValue::from(" 12 ").as_integer(), Some(12));
    assert_eq!(FieldValue::Empty.as_integer(), None);
}

#[test]
fn test_field_value_date_views() {
    let utc = TimeZone::UTC;
    assert_eq!(
        FieldValue::Date(date(2024, 2, 10)).as_date_in(&utc),
        Some(date(2024, 2, 10))
    );
    assert_eq!(
        FieldValue::from("2024-02-10").as_date_in(&utc),
        Some(date(2024, 2, 10))
    );

    let ts: Timestamp = "2024-02-10T23:30:00Z".parse().unwrap();
    assert_eq!(
        FieldValue::DateTime(ts).as_date_in(&utc),
        Some(date(2024, 2, 10))
    );

    assert_eq!(FieldValue::from("not a date").as_date_in(&utc), None);
    assert_eq!(FieldValue::Empty.as_date_in(&utc), None);
}

#[test]
fn test_row_serializes_with_date_keys() {
    let mut row = ResourceRow::new(ObjectId::new("r1"), "Alice");
    row.set_cell(key(10), ObjectId::new("e1"), "shift");

    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["entries_by_date_key"]["r20240210"], "e1");
    assert_eq!(json["display_fields_by_date_key"]["r20240210"], "shift");
}
