//! JSDoc comment parsing.

/// A parsed `/** ... */` comment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocComment {
    /// Description lines before the first tag.
    pub description: String,
    pub tags: Vec<DocTag>,
}

/// `@name value`
#[derive(Debug, Clone, PartialEq)]
pub struct DocTag {
    pub name: String,
    pub value: String,
}

impl DocComment {
    /// Parse the raw text of a comment node. Returns `None` for anything
    /// that is not a JSDoc block.
    pub fn parse(text: &str) -> Option<Self> {
        let inner = text.strip_prefix("/**")?.strip_suffix("*/")?;

        let mut description: Vec<&str> = Vec::new();
        let mut tags: Vec<DocTag> = Vec::new();

        for line in inner.lines() {
            let line = line.trim().trim_start_matches('*').trim();

            if let Some(rest) = line.strip_prefix('@') {
                let (name, value) = match rest.split_once(char::is_whitespace) {
                    Some((name, value)) => (name, value.trim()),
                    None => (rest, ""),
                };
                tags.push(DocTag {
                    name: name.to_string(),
                    value: value.to_string(),
                });
            } else if let Some(tag) = tags.last_mut() {
                // Continuation of a multi-line tag value
                if !line.is_empty() {
                    if !tag.value.is_empty() {
                        tag.value.push('\n');
                    }
                    tag.value.push_str(line);
                }
            } else {
                description.push(line);
            }
        }

        // Trim blank lines around the description, keep inner ones
        while description.first().is_some_and(|line| line.is_empty()) {
            description.remove(0);
        }
        while description.last().is_some_and(|line| line.is_empty()) {
            description.pop();
        }

        Some(Self {
            description: description.join("\n"),
            tags,
        })
    }

    /// Value of the first tag named `name`.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.name == name)
            .map(|tag| tag.value.as_str())
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_description_and_tags() {
        let doc = DocComment::parse(
            r#"/**
             * Resize the viewport.
             *
             * Second paragraph.
             * @shouldExport true
             * @overrideModuleName HtmlApi
             */"#,
        )
        .unwrap();

        assert_eq!(doc.description, "Resize the viewport.\n\nSecond paragraph.");
        assert_eq!(doc.tag("shouldExport"), Some("true"));
        assert_eq!(doc.tag("overrideModuleName"), Some("HtmlApi"));
        assert_eq!(doc.tag("default"), None);
    }

    #[test]
    fn test_single_line() {
        let doc = DocComment::parse("/** The width. */").unwrap();
        assert_eq!(doc.description, "The width.");
        assert!(doc.tags.is_empty());
    }

    #[test]
    fn test_bare_and_multiline_tags() {
        let doc = DocComment::parse(
            r#"/**
             * @deprecated
             * @default {
             *   "a": 1
             * }
             */"#,
        )
        .unwrap();

        assert!(doc.has_tag("deprecated"));
        assert_eq!(doc.tag("deprecated"), Some(""));
        assert_eq!(doc.tag("default"), Some("{\n\"a\": 1\n}"));
    }

    #[test]
    fn test_plain_comment_is_not_doc() {
        assert!(DocComment::parse("// not a doc comment").is_none());
        assert!(DocComment::parse("/* block */").is_none());
    }
}
