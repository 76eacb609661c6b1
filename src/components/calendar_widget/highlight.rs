use crate::config::{ColorConfig, HighlightRule};

/// Color of the last rule matching `summary`, or `default` when none match
pub fn title_color<'a>(rules: &'a [HighlightRule], summary: &str, default: &'a str) -> &'a str {
    rules
        .iter()
        .rev()
        .find(|rule| rule.matches(summary))
        .map(|rule| rule.color())
        .unwrap_or(default)
}

/// Title color for an event. Past events always use the past color
pub fn event_title_color<'a>(colors: &'a ColorConfig, summary: &str, is_past: bool) -> &'a str {
    if is_past {
        return &colors.past;
    }
    title_color(&colors.highlights, summary, &colors.title)
}

/// Color of the location and timestamp lines
pub fn description_color(colors: &ColorConfig, is_past: bool) -> &str {
    if is_past {
        &colors.past
    } else {
        &colors.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(rules: &[(&str, &str)]) -> ColorConfig {
        ColorConfig {
            highlights: rules
                .iter()
                .map(|(pattern, color)| HighlightRule::new(pattern, color).unwrap())
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_last_match_wins() {
        let colors = colors(&[("meeting", "yellow"), ("standup", "green")]);
        assert_eq!(
            title_color(&colors.highlights, "Daily Standup Meeting", "white"),
            "green"
        );
        assert_eq!(title_color(&colors.highlights, "Team meeting", "white"), "yellow");
    }

    #[test]
    fn test_no_match_uses_default() {
        let colors = colors(&[("meeting", "yellow")]);
        assert_eq!(title_color(&colors.highlights, "Lunch", "white"), "white");
        assert_eq!(event_title_color(&colors, "Lunch", false), "white");
    }

    #[test]
    fn test_patterns_are_regular_expressions() {
        let colors = colors(&[("^1on1", "red")]);
        assert_eq!(title_color(&colors.highlights, "1on1 with Sam", "white"), "red");
        assert_eq!(title_color(&colors.highlights, "Sam 1on1", "white"), "white");
    }

    #[test]
    fn test_past_overrides_highlight() {
        let colors = colors(&[("standup", "green")]);
        assert_eq!(event_title_color(&colors, "Standup", true), "gray");
        assert_eq!(event_title_color(&colors, "Standup", false), "green");
    }

    #[test]
    fn test_description_color() {
        let colors = ColorConfig {
            description: "blue".to_string(),
            ..Default::default()
        };
        assert_eq!(description_color(&colors, false), "blue");
        assert_eq!(description_color(&colors, true), "gray");
    }
}
