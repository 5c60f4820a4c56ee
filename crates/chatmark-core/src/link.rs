use std::sync::Mutex;

/// Opens a URL in some external context (browser, OS handler, IPC, ...).
///
/// This crate intentionally does not integrate with any platform URL handler. Rendered links
/// produce a [`LinkAction`] and the app decides how to open it. The return value is not observed:
/// opening is fire-and-forget.
pub trait UrlOpener {
    fn open(&self, url: &str);
}

impl<F> UrlOpener for F
where
    F: Fn(&str),
{
    fn open(&self, url: &str) {
        self(url)
    }
}

/// A pressable link found in rendered output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkAction {
    pub href: String,
    /// Plain text of the link label.
    pub label: String,
}

impl LinkAction {
    pub fn new(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            label: label.into(),
        }
    }

    /// Hands the destination to `opener`.
    pub fn activate(&self, opener: &dyn UrlOpener) {
        opener.open(&self.href);
    }
}

/// A [`UrlOpener`] that records every URL it is asked to open.
///
/// Handy in tests and for apps that want to queue link activations and process them later.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the URLs opened so far, oldest first.
    pub fn opened(&self) -> Vec<String> {
        match self.opened.lock() {
            Ok(v) => v.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) {
        match self.opened.lock() {
            Ok(mut v) => v.push(url.to_string()),
            Err(poisoned) => poisoned.into_inner().push(url.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn activate_hands_href_to_opener() {
        let opener = RecordingOpener::new();
        let link = LinkAction::new("https://example.com", "Example");
        link.activate(&opener);
        link.activate(&opener);
        assert_eq!(
            opener.opened(),
            vec!["https://example.com".to_string(), "https://example.com".to_string()]
        );
    }

    #[test]
    fn closures_are_openers() {
        let seen = RefCell::new(String::new());
        let opener = |url: &str| seen.borrow_mut().push_str(url);
        LinkAction::new("mailto:a@b.c", "mail").activate(&opener);
        assert_eq!(seen.into_inner(), "mailto:a@b.c");
    }
}
