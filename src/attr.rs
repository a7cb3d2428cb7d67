//! Attribute lists for markup elements
//!
//! Both parsed source elements and rendered HTML surfaces carry their
//! attributes as a plain `Vec<(String, String)>` in document order.

/// Element attributes as simple key-value pairs
pub type Attrs = Vec<(String, String)>;

/// Extension trait for attribute operations on Attrs
pub trait AttrsExt {
    /// Get an attribute value by name
    fn get_attr(&self, name: &str) -> Option<&str>;

    /// Get an attribute value only if it is present and not blank.
    ///
    /// Import treats `src=""` and a missing `src` alike.
    fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get_attr(name).filter(|v| !v.trim().is_empty())
    }

    /// Check if an attribute exists
    fn has_attr(&self, name: &str) -> bool;

    /// Set an attribute value (insert or update)
    fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>);

    /// Remove an attribute by name, returning the old value if present
    fn remove_attr(&mut self, name: &str) -> Option<String>;
}

impl AttrsExt for Attrs {
    fn get_attr(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn has_attr(&self, name: &str) -> bool {
        self.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(attr) = self.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            attr.1 = value;
        } else {
            self.push((name, value));
        }
    }

    fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|pos| self.remove(pos).1)
    }
}

// =============================================================================
// Tests
// =============================================================================
