use chrono::Duration;

/// Name for a copy of `name` that doesn't clash with `existing_names`.
///
/// Numbered copies count up from the highest one present (up to `copy 9`),
/// an unnumbered copy becomes `copy 2`, otherwise plain `(copy)`.
pub fn template_copy_name<'a, I>(name: &str, existing_names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let existing: Vec<&str> = existing_names.into_iter().collect();

    for index in (1..10).rev() {
        if existing.contains(&format!("{} (copy {})", name, index).as_str()) {
            return format!("{} (copy {})", name, index + 1);
        }
    }

    if existing.contains(&format!("{} (copy)", name).as_str()) {
        return format!("{} (copy 2)", name);
    }

    format!("{} (copy)", name)
}

fn plural(count: i64, unit: &str) -> String {
    format!("{} {}{}", count, unit, if count == 1 { "" } else { "s" })
}

/// "under a minute", "5 minutes", "1 hour", "3 days".
pub fn human_readable_delta(delta: Duration) -> String {
    if delta < Duration::seconds(60) {
        "under a minute".to_string()
    } else if delta < Duration::hours(1) {
        plural(delta.num_minutes(), "minute")
    } else if delta < Duration::days(1) {
        plural(delta.num_hours(), "hour")
    } else {
        plural(delta.num_days(), "day")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_name_without_existing_copies() {
        assert_eq!(
            template_copy_name("Two week reminder", ["Two week reminder"]),
            "Two week reminder (copy)"
        );
    }

    #[test]
    fn test_copy_name_after_unnumbered_copy() {
        assert_eq!(
            template_copy_name("Two week reminder", ["Two week reminder", "Two week reminder (copy)"]),
            "Two week reminder (copy 2)"
        );
    }

    #[test]
    fn test_copy_name_counts_up_from_highest_copy() {
        let existing = [
            "Two week reminder (copy)",
            "Two week reminder (copy 2)",
            "Two week reminder (copy 8)",
        ];
        assert_eq!(
            template_copy_name("Two week reminder", existing),
            "Two week reminder (copy 9)"
        );
        assert_eq!(
            template_copy_name("Two week reminder", ["Two week reminder (copy 9)"]),
            "Two week reminder (copy 10)"
        );
    }

    #[test]
    fn test_copy_name_ignores_copies_above_nine() {
        assert_eq!(
            template_copy_name(
                "Two week reminder",
                ["Two week reminder (copy)", "Two week reminder (copy 10)"]
            ),
            "Two week reminder (copy 2)"
        );
    }

    #[test]
    fn test_copy_name_ignores_other_templates() {
        assert_eq!(
            template_copy_name("Reminder", ["Two week reminder (copy 3)"]),
            "Reminder (copy)"
        );
    }

    #[test]
    fn test_human_readable_delta() {
        let cases = [
            (Duration::seconds(59), "under a minute"),
            (Duration::seconds(60), "1 minute"),
            (Duration::seconds(60 * 2), "2 minutes"),
            (Duration::minutes(59) + Duration::seconds(59), "59 minutes"),
            (Duration::hours(1), "1 hour"),
            (Duration::hours(2), "2 hours"),
            (Duration::hours(23) + Duration::minutes(59), "23 hours"),
            (Duration::days(1), "1 day"),
            (Duration::days(2), "2 days"),
        ];
        for (delta, expected) in cases {
            assert_eq!(human_readable_delta(delta), expected);
        }
    }
}
