//! Handler documentation parsing.
//!
//! Doc text attached to a handler supplies the fallback tool description,
//! per-parameter descriptions and an example input. Both rustdoc-style
//! headings (`# Arguments`, `# Example`) and colon-style headings
//! (`Args:`, `Example:`) are understood.

use serde_json::Value;
use std::collections::BTreeMap;

/// The useful parts of a handler's doc text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocString {
    /// First paragraph, joined onto one line.
    pub summary: Option<String>,

    /// Remaining free text before the first section.
    pub body: Option<String>,

    /// Parameter name -> description.
    pub params: BTreeMap<String, String>,

    /// Example input parsed from an example section.
    pub example: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Prose,
    Arguments,
    Example,
    Other,
}

fn section_for(line: &str) -> Option<Section> {
    let heading = line
        .trim()
        .trim_start_matches('#')
        .trim()
        .trim_end_matches(':')
        .to_ascii_lowercase();
    let is_heading = line.trim_start().starts_with('#') || line.trim_end().ends_with(':');
    if !is_heading {
        return None;
    }
    match heading.as_str() {
        "arguments" | "args" | "parameters" | "params" => Some(Section::Arguments),
        "example" | "examples" => Some(Section::Example),
        "returns" | "errors" | "panics" | "raises" | "notes" => Some(Section::Other),
        _ if line.trim_start().starts_with('#') => Some(Section::Other),
        _ => None,
    }
}

/// Parse `* `name` - text`, `- name: text`, `- name - text` or `name: text`.
fn parse_argument(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    let bulleted = trimmed.starts_with(['*', '-']);
    let line = trimmed.trim_start_matches(['*', '-']).trim_start();
    if line.is_empty() {
        return None;
    }

    let (name, rest) = if let Some(stripped) = line.strip_prefix('`') {
        let end = stripped.find('`')?;
        (&stripped[..end], &stripped[end + 1..])
    } else if let Some(end) = line.find(':') {
        (&line[..end], &line[end + 1..])
    } else if bulleted {
        let end = line.find(' ')?;
        (&line[..end], &line[end..])
    } else {
        return None;
    };

    let description = rest
        .trim_start()
        .trim_start_matches([':', '-'])
        .trim();
    let name = name.trim();
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if !valid || description.is_empty() {
        return None;
    }
    Some((name.to_string(), description.to_string()))
}

fn parse_example(lines: &[&str]) -> Option<Value> {
    let text: String = lines
        .iter()
        .filter(|line| !line.trim_start().starts_with("```"))
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("\n");
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    serde_json::from_str(text).ok()
}

impl DocString {
    /// Parse doc text. Never fails; unrecognised content is ignored.
    pub fn parse(text: &str) -> Self {
        let mut doc = DocString::default();
        let mut section = Section::Prose;
        let mut paragraphs: Vec<Vec<&str>> = vec![Vec::new()];
        let mut example_lines: Vec<&str> = Vec::new();
        let mut last_param: Option<String> = None;

        for line in text.lines() {
            if let Some(next) = section_for(line) {
                section = next;
                last_param = None;
                continue;
            }

            match section {
                Section::Prose => {
                    if line.trim().is_empty() {
                        if paragraphs.last().is_some_and(|p| !p.is_empty()) {
                            paragraphs.push(Vec::new());
                        }
                    } else if let Some(current) = paragraphs.last_mut() {
                        current.push(line.trim());
                    }
                }
                Section::Arguments => {
                    if let Some((name, description)) = parse_argument(line) {
                        last_param = Some(name.clone());
                        doc.params.insert(name, description);
                    } else if let Some(name) = &last_param {
                        // Continuation line of a wrapped description.
                        let extra = line.trim();
                        if !extra.is_empty() {
                            if let Some(description) = doc.params.get_mut(name) {
                                description.push(' ');
                                description.push_str(extra);
                            }
                        }
                    }
                }
                Section::Example => example_lines.push(line),
                Section::Other => {}
            }
        }

        let mut paragraphs = paragraphs
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.join(" "));
        doc.summary = paragraphs.next();
        let body: Vec<String> = paragraphs.collect();
        if !body.is_empty() {
            doc.body = Some(body.join("\n\n"));
        }
        doc.example = parse_example(&example_lines);
        doc
    }

    /// Description for a parameter, if the doc text names it.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_is_first_paragraph() {
        let doc = DocString::parse(
            "
            Extracts important information from provided text.

            The extractor will analyze the input text and return the most
            relevant parts up to the specified max_tokens limit.
            ",
        );
        assert_eq!(
            doc.summary.as_deref(),
            Some("Extracts important information from provided text.")
        );
        assert_eq!(
            doc.body.as_deref(),
            Some(
                "The extractor will analyze the input text and return the most \
                 relevant parts up to the specified max_tokens limit."
            )
        );
    }

    #[test]
    fn test_rustdoc_arguments_and_example() {
        let doc = DocString::parse(
            "Run a basic arithmetic operation.

# Arguments

* `operation` - One of add, subtract, multiply, divide
* `a` - Left operand
  that may wrap
* `b` - Right operand

# Example

```json
{\"operation\": \"add\", \"a\": 5, \"b\": 3}
```",
        );
        assert_eq!(doc.summary.as_deref(), Some("Run a basic arithmetic operation."));
        assert_eq!(
            doc.param("operation"),
            Some("One of add, subtract, multiply, divide")
        );
        assert_eq!(doc.param("a"), Some("Left operand that may wrap"));
        assert_eq!(doc.param("b"), Some("Right operand"));
        assert_eq!(doc.example, Some(json!({"operation": "add", "a": 5, "b": 3})));
    }

    #[test]
    fn test_colon_style_sections() {
        let doc = DocString::parse(
            "Retrieve a document by its ID with optional metadata

Args:
    doc_id: Identifier of the document
    include_metadata: Attach creation metadata

Returns:
    The document",
        );
        assert_eq!(doc.param("doc_id"), Some("Identifier of the document"));
        assert_eq!(doc.param("include_metadata"), Some("Attach creation metadata"));
        assert!(doc.param("The").is_none());
        assert!(doc.body.is_none());
    }

    #[test]
    fn test_invalid_example_is_ignored() {
        let doc = DocString::parse("Summary\n\n# Example\n\nnot json at all");
        assert_eq!(doc.summary.as_deref(), Some("Summary"));
        assert!(doc.example.is_none());
    }

    #[test]
    fn test_empty_doc() {
        assert_eq!(DocString::parse(""), DocString::default());
    }
}
