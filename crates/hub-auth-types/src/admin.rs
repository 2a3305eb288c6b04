use std::collections::HashSet;
use std::sync::Arc;

/// Static set of email addresses with administrative privileges.
///
/// Entries are trimmed and compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct AdminAllowList(Arc<HashSet<String>>);

impl AdminAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = emails
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self(Arc::new(set))
    }

    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn contains(&self, email: &str) -> bool {
        self.0.contains(&email.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
