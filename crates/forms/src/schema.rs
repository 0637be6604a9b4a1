//! Declarative field rules shared by every form.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    Email,
    Phone10,
    Year,
    Date,
}

impl FieldFormat {
    pub fn check(self, value: &str) -> Result<(), &'static str> {
        let ok = match self {
            FieldFormat::Email => is_valid_email(value),
            FieldFormat::Phone10 => is_valid_phone(value),
            FieldFormat::Year => value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()),
            FieldFormat::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        };
        if ok {
            Ok(())
        } else {
            Err(self.message())
        }
    }

    fn message(self) -> &'static str {
        match self {
            FieldFormat::Email => "Invalid email address",
            FieldFormat::Phone10 => "Phone number must be 10 digits",
            FieldFormat::Year => "Invalid year",
            FieldFormat::Date => "Invalid date (expected YYYY-MM-DD)",
        }
    }
}

/// `local@domain.tld` with no whitespace and a single `@`.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(idx, ch)| ch == '.' && idx > 0 && idx + 1 < domain.len())
}

pub fn is_valid_phone(value: &str) -> bool {
    value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub format: Option<FieldFormat>,
}

impl FieldRule {
    pub const fn required(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            required: true,
            format: None,
        }
    }

    pub const fn optional(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            required: false,
            format: None,
        }
    }

    pub const fn format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }

    fn check(&self, value: &str) -> Option<String> {
        let value = value.trim();
        if value.is_empty() {
            return self.required.then(|| format!("{} is required", self.label));
        }
        self.format
            .and_then(|format| format.check(value).err())
            .map(str::to_string)
    }
}

/// Lookup of a form's current values by rule key.
pub trait FieldSource {
    fn field_value(&self, key: &str) -> Option<&str>;
}

#[derive(Debug, Clone, Copy)]
pub struct FormSchema {
    rules: &'static [FieldRule],
}

impl FormSchema {
    pub const fn new(rules: &'static [FieldRule]) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'static [FieldRule] {
        self.rules
    }

    pub fn validate<S: FieldSource + ?Sized>(&self, source: &S) -> FieldErrors {
        let mut errors = FieldErrors::default();
        for rule in self.rules {
            let value = source.field_value(rule.key).unwrap_or_default();
            if let Some(message) = rule.check(value) {
                errors.insert(rule.key, message);
            }
        }
        errors
    }
}

/// Per-field error text in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(&'static str, String)>,
}

impl FieldErrors {
    pub fn insert(&mut self, key: &'static str, message: impl Into<String>) {
        let message = message.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = message,
            None => self.entries.push((key, message)),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(existing, _)| *existing != key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, message)| message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries
            .iter()
            .map(|(key, message)| (*key, message.as_str()))
    }

    pub fn first_message(&self) -> Option<&str> {
        self.entries.first().map(|(_, message)| message.as_str())
    }
}
