// Substring denylist. Not a moderation system, just a tripwire for the obvious words

#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    terms: Vec<String>,
}

impl ContentFilter {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    /// First denylisted term contained in `message`, ignoring case.
    pub fn find_blocked(&self, message: &str) -> Option<&str> {
        let lowered = message.to_lowercase();
        self.terms
            .iter()
            .find(|term| lowered.contains(term.as_str()))
            .map(String::as_str)
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }
}
