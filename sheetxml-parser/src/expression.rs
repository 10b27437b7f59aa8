/// One segment of a parsed attribute value. Text passes through rendering
/// untouched, variables are resolved against the active render's scopes.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionSegment {
    Text(String),
    /// A dotted path, e.g. `character.stats.strength`. The first path
    /// segment selects the namespace it resolves against.
    Variable(String),
}

/// An attribute value split at its `{{…}}` markers. Concatenating the
/// resolved form of every segment in order yields the display value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedExpression {
    pub segments: Vec<ExpressionSegment>,
}

const MARKER_OPEN: &str = "{{";
const MARKER_CLOSE: &str = "}}";

impl ParsedExpression {
    /// A single-segment expression rendering to exactly `text`.
    pub fn literal(text: &str) -> Self {
        if text.is_empty() {
            return ParsedExpression::default();
        }
        ParsedExpression {
            segments: vec![ExpressionSegment::Text(text.to_string())],
        }
    }

    /// True when no variable segment is present, i.e. the value renders the
    /// same regardless of any store contents.
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| matches!(segment, ExpressionSegment::Text(_)))
    }

    /// The rendered value of a purely static expression.
    pub fn static_value(&self) -> Option<String> {
        if !self.is_static() {
            return None;
        }

        let mut value = String::new();
        for segment in &self.segments {
            if let ExpressionSegment::Text(text) = segment {
                value.push_str(text);
            }
        }
        Some(value)
    }
}

/// Splits a raw attribute value on its variable markers. Never fails:
/// malformed markup must still render something, so an unmatched `{{` is
/// kept as literal text for the remainder of the string. Nested markers are
/// not supported.
pub fn split_expression_value(raw: &str) -> ParsedExpression {
    let mut segments = Vec::new();
    let mut rest = raw;

    while let Some(open) = rest.find(MARKER_OPEN) {
        if open > 0 {
            segments.push(ExpressionSegment::Text(rest[..open].to_string()));
        }

        let after_open = &rest[open + MARKER_OPEN.len()..];
        let Some(close) = after_open.find(MARKER_CLOSE) else {
            // No closing marker: the rest of the string, marker included,
            // is literal text.
            segments.push(ExpressionSegment::Text(rest[open..].to_string()));
            return ParsedExpression { segments };
        };

        let variable = after_open[..close].trim().to_string();
        segments.push(ExpressionSegment::Variable(variable));
        rest = &after_open[close + MARKER_CLOSE.len()..];
    }

    if !rest.is_empty() {
        segments.push(ExpressionSegment::Text(rest.to_string()));
    }

    ParsedExpression { segments }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_single_segment() {
        let parsed = split_expression_value("Strength");
        assert_eq!(
            parsed.segments,
            vec![ExpressionSegment::Text("Strength".to_string())]
        );
        assert_eq!(parsed.static_value(), Some("Strength".to_string()));
    }

    #[test]
    fn empty_input_yields_no_segments() {
        let parsed = split_expression_value("");
        assert!(parsed.segments.is_empty());
        assert_eq!(parsed.static_value(), Some(String::new()));
    }

    #[test]
    fn variables_are_extracted_and_trimmed() {
        let parsed = split_expression_value("Hello {{ sheet.title }}!");
        assert_eq!(
            parsed.segments,
            vec![
                ExpressionSegment::Text("Hello ".to_string()),
                ExpressionSegment::Variable("sheet.title".to_string()),
                ExpressionSegment::Text("!".to_string()),
            ]
        );
        assert!(!parsed.is_static());
        assert_eq!(parsed.static_value(), None);
    }

    #[test]
    fn adjacent_variables() {
        let parsed = split_expression_value("{{a}}{{b}}");
        assert_eq!(
            parsed.segments,
            vec![
                ExpressionSegment::Variable("a".to_string()),
                ExpressionSegment::Variable("b".to_string()),
            ]
        );
    }

    #[test]
    fn unmatched_open_marker_is_literal() {
        let parsed = split_expression_value("before {{character.name");
        assert_eq!(
            parsed.segments,
            vec![
                ExpressionSegment::Text("before ".to_string()),
                ExpressionSegment::Text("{{character.name".to_string()),
            ]
        );
        assert!(parsed.is_static());
    }

    #[test]
    fn empty_marker_is_an_empty_variable() {
        let parsed = split_expression_value("{{}}");
        assert_eq!(
            parsed.segments,
            vec![ExpressionSegment::Variable(String::new())]
        );
    }
}
