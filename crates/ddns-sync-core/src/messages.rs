//! Localizable log message templates
//!
//! Operators can override any message in the config file; placeholders
//! like `{user}` or `{new_ip}` are substituted at render time. Keys
//! without an override fall back to the built-in English templates.

use std::collections::HashMap;

/// Built-in default templates, used when the config provides no override
fn default_template(key: &str) -> &'static str {
    match key {
        "current_ip" => "[{user}] current IP is {new_ip}",
        "ip_change" => "[{user}] IP change detected: {last_ip} -> {new_ip}",
        "ip_unchanged" => "[{user}] IP unchanged, no action needed",
        "ip_mismatch" => "[{user}] record {name} has {old_ip}, expected {new_ip}",
        "ip_updated" => "[{user}] record {name} updated to {new_ip}",
        "ip_correct" => "[{user}] record {name} already correct: {new_ip}",
        "api_disabled" => "[{user}] API disabled, no changes made",
        "error" => "[{user}] error: {error}",
        "cycle_error" => "cycle error: {error}",
        _ => "{user}: unknown event",
    }
}

/// Message catalog with config-supplied overrides
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    templates: HashMap<String, String>,
}

impl MessageCatalog {
    /// Build a catalog from the config's message map
    pub fn new(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }

    /// Render the template for `key`, substituting `{name}` placeholders
    /// with the supplied values. Placeholders without a value are left
    /// as-is so a misconfigured template stays visible in the logs.
    pub fn render(&self, key: &str, values: &[(&str, &str)]) -> String {
        let template = self
            .templates
            .get(key)
            .map(String::as_str)
            .unwrap_or_else(|| default_template(key));

        let mut out = template.to_string();
        for (name, value) in values {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_default_template() {
        let catalog = MessageCatalog::default();
        let msg = catalog.render("current_ip", &[("user", "home"), ("new_ip", "1.2.3.4")]);
        assert_eq!(msg, "[home] current IP is 1.2.3.4");
    }

    #[test]
    fn override_replaces_default() {
        let mut templates = HashMap::new();
        templates.insert(
            "ip_change".to_string(),
            "[{user}] IP-Wechsel erkannt: {last_ip} -> {new_ip}".to_string(),
        );
        let catalog = MessageCatalog::new(templates);
        let msg = catalog.render(
            "ip_change",
            &[("user", "home"), ("last_ip", "1.1.1.1"), ("new_ip", "2.2.2.2")],
        );
        assert_eq!(msg, "[home] IP-Wechsel erkannt: 1.1.1.1 -> 2.2.2.2");
    }

    #[test]
    fn unknown_placeholder_stays_visible() {
        let mut templates = HashMap::new();
        templates.insert("error".to_string(), "{user} {nope}".to_string());
        let catalog = MessageCatalog::new(templates);
        let msg = catalog.render("error", &[("user", "home"), ("error", "boom")]);
        assert_eq!(msg, "home {nope}");
    }
}
