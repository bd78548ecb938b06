/// Two labelled subsections that may follow the lead text of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTemplate {
    first_label: String,
    second_label: String,
}

/// A post text split by a [`SectionTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionedText<'a> {
    pub lead: &'a str,
    pub first: &'a str,
    pub second: &'a str,
}

impl SectionTemplate {
    /// Returns `None` when either label is blank.
    pub fn new(first_label: impl Into<String>, second_label: impl Into<String>) -> Option<Self> {
        let first_label = first_label.into();
        let second_label = second_label.into();
        if first_label.trim().is_empty() || second_label.trim().is_empty() {
            return None;
        }
        Some(Self {
            first_label,
            second_label,
        })
    }

    pub fn first_label(&self) -> &str {
        &self.first_label
    }

    pub fn second_label(&self) -> &str {
        &self.second_label
    }

    /// Split `text` into lead, first and second subsection bodies.
    ///
    /// Matches only when the first label occurs before the second one.
    /// Segments are trimmed; labels are not part of the returned bodies.
    pub fn split<'a>(&self, text: &'a str) -> Option<SectionedText<'a>> {
        let first_at = text.find(&self.first_label)?;
        let first_body_at = first_at + self.first_label.len();
        let second_rel = text[first_body_at..].find(&self.second_label)?;
        let second_at = first_body_at + second_rel;
        let second_body_at = second_at + self.second_label.len();

        Some(SectionedText {
            lead: text[..first_at].trim(),
            first: text[first_body_at..second_at].trim(),
            second: text[second_body_at..].trim(),
        })
    }

    /// Re-attach a label to a subsection body.
    pub fn labelled(label: &str, body: &str) -> String {
        format!("{}\n{body}", label.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> SectionTemplate {
        SectionTemplate::new("Question:", "Answer:").unwrap()
    }

    #[test]
    fn splits_into_three_trimmed_segments() {
        let split = template()
            .split("Intro text\nQuestion: why?\nAnswer: because.")
            .unwrap();
        assert_eq!(split.lead, "Intro text");
        assert_eq!(split.first, "why?");
        assert_eq!(split.second, "because.");
    }

    #[test]
    fn out_of_order_labels_do_not_match() {
        assert!(template().split("Answer: a\nQuestion: q").is_none());
    }

    #[test]
    fn missing_label_does_not_match() {
        assert!(template().split("Question: only one").is_none());
    }

    #[test]
    fn blank_labels_are_rejected() {
        assert!(SectionTemplate::new("  ", "Answer:").is_none());
    }
}
