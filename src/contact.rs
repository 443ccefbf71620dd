use std::fmt;

use uuid::Uuid;

use crate::collate;
use crate::error::ContactError;

/// Stable identifier assigned when a contact is first saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactId(Uuid);

impl ContactId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category(String);

impl Category {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub category: Category,
    pub icon: String,
}

/// The closed set of categories the form offers, in picker order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    options: Vec<CategoryOption>,
}

impl CategorySet {
    /// Build a set from `(name, icon)` pairs. Names are trimmed; empty
    /// names and names that fold to the same collation key are rejected.
    pub fn new<I, N, S>(entries: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (N, S)>,
        N: AsRef<str>,
        S: Into<String>,
    {
        let mut options: Vec<CategoryOption> = Vec::new();
        for (name, icon) in entries {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err("category names must not be empty".to_string());
            }
            let key = collate::collation_key(name);
            if let Some(existing) = options
                .iter()
                .find(|o| collate::collation_key(o.category.as_str()) == key)
            {
                return Err(format!(
                    "category `{}` duplicates `{}`",
                    name, existing.category
                ));
            }
            options.push(CategoryOption {
                category: Category(name.to_string()),
                icon: icon.into(),
            });
        }
        if options.is_empty() {
            return Err("at least one category must be configured".to_string());
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &[CategoryOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Exact lookup of an offered category by name.
    pub fn find(&self, name: &str) -> Option<&Category> {
        self.options
            .iter()
            .map(|o| &o.category)
            .find(|c| c.as_str() == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.options.iter().position(|o| o.category.as_str() == name)
    }

    pub fn icon(&self, category: &Category) -> &str {
        self.options
            .iter()
            .find(|o| &o.category == category)
            .map(|o| o.icon.as_str())
            .unwrap_or("")
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self {
            options: vec![
                CategoryOption {
                    category: Category("Personal".into()),
                    icon: "👤".into(),
                },
                CategoryOption {
                    category: Category("Work".into()),
                    icon: "💼".into(),
                },
                CategoryOption {
                    category: Category("Family".into()),
                    icon: "👪".into(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub number: String,
    pub category: Category,
}

/// A draft that passed validation; the only way to build a `Contact`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    pub name: String,
    pub number: String,
    pub category: Category,
}

impl ValidContact {
    pub fn into_contact(self, id: ContactId) -> Contact {
        Contact {
            id,
            name: self.name,
            number: self.number,
            category: self.category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Name,
    Number,
    Category,
}

impl DraftField {
    pub const ALL: [DraftField; 3] = [DraftField::Name, DraftField::Number, DraftField::Category];

    pub fn title(self) -> &'static str {
        match self {
            DraftField::Name => "Name",
            DraftField::Number => "Number",
            DraftField::Category => "Category",
        }
    }

    /// Get the next field, wrapping around
    pub fn next(self) -> Self {
        match self {
            DraftField::Name => DraftField::Number,
            DraftField::Number => DraftField::Category,
            DraftField::Category => DraftField::Name,
        }
    }

    /// Get the previous field, wrapping around
    pub fn prev(self) -> Self {
        match self {
            DraftField::Name => DraftField::Category,
            DraftField::Number => DraftField::Name,
            DraftField::Category => DraftField::Number,
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The form in progress. Holds free text; nothing here is checked until save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub name: String,
    pub number: String,
    pub category: String,
}

impl Draft {
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            number: contact.number.clone(),
            category: contact.category.as_str().to_string(),
        }
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.number.clear();
        self.category.clear();
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::Number => &self.number,
            DraftField::Category => &self.category,
        }
    }

    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Name => self.name = value,
            DraftField::Number => self.number = value,
            DraftField::Category => self.category = value,
        }
    }

    /// Trim every field and check it against the offered categories.
    pub fn validate(&self, categories: &CategorySet) -> Result<ValidContact, ContactError> {
        let missing: Vec<DraftField> = DraftField::ALL
            .iter()
            .copied()
            .filter(|f| self.get(*f).trim().is_empty())
            .collect();
        if !missing.is_empty() {
            return Err(ContactError::Validation { missing });
        }

        let category_name = self.category.trim();
        let category = categories
            .find(category_name)
            .cloned()
            .ok_or_else(|| ContactError::UnknownCategory(category_name.to_string()))?;

        Ok(ValidContact {
            name: self.name.trim().to_string(),
            number: self.number.trim().to_string(),
            category,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn draft(name: &str, number: &str, category: &str) -> Draft {
        Draft {
            name: name.into(),
            number: number.into(),
            category: category.into(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_draft() {
        let categories = CategorySet::default();
        let valid = draft(" Ana ", "123", "Personal").validate(&categories).unwrap();
        assert_eq!(valid.name, "Ana");
        assert_eq!(valid.number, "123");
        assert_eq!(valid.category.as_str(), "Personal");
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let categories = CategorySet::default();
        let err = draft("", "  ", "").validate(&categories).unwrap_err();
        assert_eq!(
            err,
            ContactError::Validation {
                missing: vec![DraftField::Name, DraftField::Number, DraftField::Category],
            }
        );

        let err = draft("Ana", "123", "").validate(&categories).unwrap_err();
        assert_eq!(
            err,
            ContactError::Validation {
                missing: vec![DraftField::Category],
            }
        );
    }

    #[test]
    fn test_validate_rejects_category_outside_set() {
        let categories = CategorySet::default();
        let err = draft("Ana", "123", "Gym").validate(&categories).unwrap_err();
        assert_eq!(err, ContactError::UnknownCategory("Gym".into()));
    }

    #[test]
    fn test_category_set_rejects_duplicates_and_empty() {
        assert!(CategorySet::new([("Work", ""), ("work", "")]).is_err());
        assert!(CategorySet::new([("Família", ""), ("Familia", "")]).is_err());
        assert!(CategorySet::new([("  ", "")]).is_err());
        assert!(CategorySet::new(Vec::<(&str, &str)>::new()).is_err());

        let set = CategorySet::new([("Friends", "*"), ("Work", "#")]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.position("Work"), Some(1));
        assert_eq!(set.icon(set.find("Friends").unwrap()), "*");
    }

    #[test]
    fn test_field_cycle() {
        assert_eq!(DraftField::Name.next(), DraftField::Number);
        assert_eq!(DraftField::Category.next(), DraftField::Name);
        assert_eq!(DraftField::Name.prev(), DraftField::Category);
    }

    #[test]
    fn test_draft_round_trips_contact() {
        let contact = Contact {
            id: ContactId::new(),
            name: "Ana".into(),
            number: "1".into(),
            category: CategorySet::default().find("Work").cloned().unwrap(),
        };
        let draft = Draft::from_contact(&contact);
        assert_eq!(draft.get(DraftField::Category), "Work");
        let mut cleared = draft.clone();
        cleared.clear();
        assert_eq!(cleared, Draft::default());
    }
}
