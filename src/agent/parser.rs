// ABOUTME: Scanner for `[TOOL:name] {json} [/TOOL]` markers embedded in model output.
// ABOUTME: Yields invocations left to right and splices results back into the text.

use std::iter::FusedIterator;
use std::ops::Range;

use crate::error::ParseError;
use crate::tool::Args;

pub const OPEN_MARKER: &str = "[TOOL:";
pub const CLOSE_MARKER: &str = "[/TOOL]";

/// A tool call found in a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: Args,
    /// Byte range of the whole marker, `[TOOL:` through `[/TOOL]`.
    pub span: Range<usize>,
}

/// Incremental scanner over a completion.
///
/// Each call to [`next_call`](Self::next_call) searches from the cursor.
/// After [`splice`](Self::splice) the cursor sits just past the inserted
/// text, so tool output is never scanned for markers. An opening marker
/// without a closing one ends the scan and is left in place. A parse
/// error ends the scan as well.
#[derive(Debug, Clone)]
pub struct ToolCallScanner {
    text: String,
    cursor: usize,
    done: bool,
}

impl ToolCallScanner {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            done: false,
        }
    }

    /// Find the next invocation after the cursor.
    pub fn next_call(&mut self) -> Option<Result<ToolInvocation, ParseError>> {
        if self.done {
            return None;
        }

        let Some(rel) = self.text[self.cursor..].find(OPEN_MARKER) else {
            self.done = true;
            return None;
        };
        let start = self.cursor + rel;
        let name_start = start + OPEN_MARKER.len();

        // Truncated output: leave the dangling marker untouched.
        let Some(close_rel) = self.text[name_start..].find(CLOSE_MARKER) else {
            self.done = true;
            return None;
        };
        let close = name_start + close_rel;
        let end = close + CLOSE_MARKER.len();

        let result = self.parse_marker(start, name_start, close);
        match &result {
            Ok(_) => self.cursor = end,
            Err(_) => self.done = true,
        }
        Some(result.map(|(name, arguments)| ToolInvocation {
            name,
            arguments,
            span: start..end,
        }))
    }

    fn parse_marker(
        &self,
        start: usize,
        name_start: usize,
        close: usize,
    ) -> Result<(String, Args), ParseError> {
        let name_end = self.text[name_start..close]
            .find(']')
            .map(|i| name_start + i)
            .ok_or(ParseError::MalformedMarker { offset: start })?;
        let name = self.text[name_start..name_end].to_string();

        let payload = self.text[name_end + 1..close].trim();
        let value: serde_json::Value =
            serde_json::from_str(payload).map_err(|source| ParseError::InvalidJson {
                tool: name.clone(),
                source,
            })?;

        match value {
            serde_json::Value::Object(arguments) => Ok((name, arguments)),
            _ => Err(ParseError::NotAnObject { tool: name }),
        }
    }

    /// Replace `span` with `replacement` and resume scanning after it.
    pub fn splice(&mut self, span: Range<usize>, replacement: &str) {
        let resume = span.start + replacement.len();
        self.text.replace_range(span, replacement);
        self.cursor = resume;
    }

    /// The text as spliced so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl Iterator for ToolCallScanner {
    type Item = Result<ToolInvocation, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_call()
    }
}

impl FusedIterator for ToolCallScanner {}

/// Lazily parse every invocation in `text`; spans refer to `text` itself.
pub fn parse(text: &str) -> ToolCallScanner {
    ToolCallScanner::new(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(name: &str, args: &str) -> String {
        format!("[TOOL:{}]\n{}\n[/TOOL]", name, args)
    }

    #[test]
    fn test_no_markers() {
        assert_eq!(parse("just text").count(), 0);
    }

    #[test]
    fn test_single_invocation() {
        let text = format!("Look up {} please", marker("echo", r#"{"x":"1"}"#));
        let calls: Vec<_> = parse(&text).map(Result::unwrap).collect();

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "echo");
        assert_eq!(calls[0].arguments["x"], "1");
        assert_eq!(&text[calls[0].span.clone()], marker("echo", r#"{"x":"1"}"#));
    }

    #[test]
    fn test_n_invocations_in_order_with_increasing_spans() {
        for n in 0..6 {
            let text: String = (0..n)
                .map(|i| format!("step {} {} ", i, marker(&format!("t{}", i), "{}")))
                .collect();

            let calls: Vec<_> = parse(&text).map(Result::unwrap).collect();
            assert_eq!(calls.len(), n);
            for (i, call) in calls.iter().enumerate() {
                assert_eq!(call.name, format!("t{}", i));
            }
            for pair in calls.windows(2) {
                assert!(pair[0].span.end <= pair[1].span.start);
            }
        }
    }

    #[test]
    fn test_splicing_removes_every_marker() {
        let text = format!(
            "{} and {} and {}",
            marker("a", "{}"),
            marker("b", "{}"),
            marker("c", "{}")
        );
        let mut scanner = ToolCallScanner::new(text);
        while let Some(call) = scanner.next_call() {
            let call = call.unwrap();
            scanner.splice(call.span.clone(), &call.name.to_uppercase());
        }

        assert_eq!(scanner.into_text(), "A and B and C");
    }

    #[test]
    fn test_spliced_output_is_not_rescanned() {
        let text = format!("{} then {}", marker("a", "{}"), marker("b", "{}"));
        let mut scanner = ToolCallScanner::new(text);
        let mut seen = Vec::new();
        while let Some(call) = scanner.next_call() {
            let call = call.unwrap();
            seen.push(call.name.clone());
            scanner.splice(call.span.clone(), &marker("injected", "{}"));
        }

        assert_eq!(seen, vec!["a", "b"]);
        assert_eq!(scanner.text().matches(OPEN_MARKER).count(), 2);
    }

    #[test]
    fn test_truncated_trailing_marker_left_untouched() {
        let text = format!("{} then [TOOL:b]\n{{\"q\":", marker("a", "{}"));
        let mut scanner = ToolCallScanner::new(text);
        let mut count = 0;
        while let Some(call) = scanner.next_call() {
            let call = call.unwrap();
            count += 1;
            scanner.splice(call.span.clone(), "done");
        }

        assert_eq!(count, 1);
        assert_eq!(scanner.text(), "done then [TOOL:b]\n{\"q\":");
        assert!(scanner.next_call().is_none());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let text = marker("echo", "{not json}");
        let mut calls = parse(&text);

        match calls.next() {
            Some(Err(ParseError::InvalidJson { tool, .. })) => assert_eq!(tool, "echo"),
            other => panic!("Expected InvalidJson, got {:?}", other),
        }
        assert!(calls.next().is_none());
    }

    #[test]
    fn test_non_object_payloads_rejected() {
        for payload in ["[1, 2]", "\"text\"", "42", "null"] {
            let text = marker("echo", payload);
            assert!(matches!(
                parse(&text).next(),
                Some(Err(ParseError::NotAnObject { .. }))
            ));
        }
    }

    #[test]
    fn test_name_without_closing_bracket_is_malformed() {
        let text = "intro [TOOL:echo {} [/TOOL]";
        assert!(matches!(
            parse(text).next(),
            Some(Err(ParseError::MalformedMarker { offset: 6 }))
        ));
    }

    #[test]
    fn test_error_stops_after_earlier_calls() {
        let text = format!("{} {}  {}", marker("a", "{}"), marker("b", "oops"), marker("c", "{}"));
        let results: Vec<_> = parse(&text).collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_multibyte_text_around_markers() {
        let text = format!("Olá, endereço: {} – obrigado", marker("cep", r#"{"zipcode":"01310-100"}"#));
        let mut scanner = ToolCallScanner::new(text);
        let call = scanner.next_call().unwrap().unwrap();
        scanner.splice(call.span, "Avenida Paulista");

        assert_eq!(scanner.text(), "Olá, endereço: Avenida Paulista – obrigado");
    }
}
