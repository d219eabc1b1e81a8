//! Property-based tests for discord_logger using proptest

use chrono::{Local, TimeZone};
use discord_logger::core::parse_url_list;
use discord_logger::prelude::*;
use discord_logger::{format_payload_embedded, LevelColor, LogRecord, MessageTemplate};
use proptest::prelude::*;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::NotSet),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warning),
        Just(LogLevel::Error),
        Just(LogLevel::Critical),
    ]
}

fn any_fields() -> impl Strategy<Value = FieldFlags> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(thread_name, process_name, func_name, module_name, line_number)| FieldFlags {
            thread_name,
            process_name,
            func_name,
            module_name,
            line_number,
        },
    )
}

fn record_with(level: LogLevel, message: &str, fields: FieldFlags) -> LogRecord {
    let ts = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let mut record = LogRecord::new(level, "PropApp", message, ts);
    if fields.thread_name {
        record.thread_name = Some("worker".to_string());
    }
    if fields.process_name {
        record.process_name = Some("proc".to_string());
    }
    if fields.func_name {
        record.func_name = Some("handler".to_string());
    }
    if fields.module_name {
        record.module_name = Some("service.rs".to_string());
    }
    if fields.line_number {
        record.line_number = Some(77);
    }
    record
}

proptest! {
    /// Names and values both convert back to the same level
    #[test]
    fn test_level_name_and_value_roundtrip(level in any_level()) {
        prop_assert_eq!(LogLevel::from_name(level.to_str()).unwrap(), level);
        prop_assert_eq!(LogLevel::from_value(i64::from(level.value())).unwrap(), level);
        prop_assert_eq!(level.to_string(), level.to_str());
    }

    /// Only the six multiples of ten up to 50 are levels
    #[test]
    fn test_level_values_are_exact(value in -100i64..200) {
        let valid = (0..=50).contains(&value) && value % 10 == 0;
        prop_assert_eq!(LogLevel::from_value(value).is_ok(), valid);
    }

    /// Names are matched case-sensitively
    #[test]
    fn test_lowercase_names_rejected(level in any_level()) {
        let lower = level.to_str().to_lowercase();
        prop_assert!(LogLevel::from_name(&lower).is_err());
    }

    /// Ordering follows the numeric values
    #[test]
    fn test_level_ordering(a in any_level(), b in any_level()) {
        prop_assert_eq!(a <= b, a.value() <= b.value());
        prop_assert_eq!(a.cmp(&b), a.value().cmp(&b.value()));
    }

    /// Every level maps to the color of its name
    #[test]
    fn test_level_color(level in any_level()) {
        prop_assert_eq!(level.color(), LevelColor::for_level(level));
        prop_assert_eq!(level.color().value(), u32::from_str_radix(level.color().hex(), 16).unwrap());
    }

    /// URL lists never contain blank or padded entries
    #[test]
    fn test_url_list_entries_trimmed(parts in prop::collection::vec("[ a-z:/.]{0,12}", 0..6)) {
        let raw = parts.join(",");
        for url in parse_url_list(&raw) {
            prop_assert!(!url.is_empty());
            prop_assert_eq!(url.trim(), url.as_str());
        }
    }

    /// The default template survives its own textual form
    #[test]
    fn test_template_display_parses_back(fields in any_fields()) {
        let template = MessageTemplate::from_fields(fields);
        let reparsed = MessageTemplate::parse(&template.to_string()).unwrap();
        prop_assert_eq!(reparsed.required_fields(), fields);
        prop_assert_eq!(reparsed, template);
    }

    /// Header comes first and the message last
    #[test]
    fn test_message_rendering(
        level in any_level(),
        fields in any_fields(),
        message in "[a-zA-Z0-9 {}*]{0,40}",
    ) {
        let record = record_with(level, &message, fields);
        let rendered = MessageTemplate::from_fields(fields).render(&record).unwrap();
        prop_assert!(rendered.starts_with("2024-01-02 03:04:05::**"));
        let expected_level = format!("**{}**::PropApp", level.to_str());
        let expected_tail = format!(":: {}", message);
        prop_assert!(rendered.contains(&expected_level));
        prop_assert!(rendered.ends_with(&expected_tail));
        prop_assert_eq!(rendered.contains(":77::"), fields.line_number);
    }

    /// Embeds carry exactly the present fields, in display order
    #[test]
    fn test_embed_fields(level in any_level(), fields in any_fields()) {
        let record = record_with(level, "msg", fields);
        let embed = format_payload_embedded(&record);

        let expected: Vec<&str> = OptionalField::ORDER
            .iter()
            .filter(|f| fields.is_enabled(**f))
            .map(|f| f.display_name())
            .collect();
        let actual: Vec<&str> = embed.fields.iter().map(|f| f.name.as_str()).collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(embed.title, level.to_str());
        prop_assert_eq!(embed.color, level.color().value());
    }
}
