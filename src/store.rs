use std::cmp::Ordering;

use crate::collate;
use crate::contact::{Contact, ContactId, ValidContact};

/// Display order: category, then name, both ascending.
pub fn contact_order(a: &Contact, b: &Contact) -> Ordering {
    collate::compare(a.category.as_str(), b.category.as_str())
        .then_with(|| collate::compare(&a.name, &b.name))
}

pub fn sort_contacts(contacts: &mut [Contact]) {
    contacts.sort_by(contact_order);
}

/// The committed collection. Sorted after every mutation.
#[derive(Debug, Default)]
pub struct ContactStore {
    contacts: Vec<Contact>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn as_slice(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn at(&self, index: usize) -> Option<&Contact> {
        self.contacts.get(index)
    }

    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    pub fn position(&self, id: ContactId) -> Option<usize> {
        self.contacts.iter().position(|c| c.id == id)
    }

    pub fn is_sorted(&self) -> bool {
        self.contacts
            .windows(2)
            .all(|pair| contact_order(&pair[0], &pair[1]) != Ordering::Greater)
    }

    pub fn insert(&mut self, valid: ValidContact) -> ContactId {
        let id = ContactId::new();
        self.contacts.push(valid.into_contact(id));
        sort_contacts(&mut self.contacts);
        id
    }

    /// Replace the whole record behind `id`. Returns false if it is gone.
    pub fn replace(&mut self, id: ContactId, valid: ValidContact) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.contacts[index] = valid.into_contact(id);
        sort_contacts(&mut self.contacts);
        true
    }

    pub fn remove(&mut self, id: ContactId) -> Option<Contact> {
        let index = self.position(id)?;
        // Vec::remove keeps the relative order, so no re-sort.
        Some(self.contacts.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{CategorySet, Draft};
    use pretty_assertions::assert_eq;

    fn valid(name: &str, category: &str) -> ValidContact {
        Draft {
            name: name.into(),
            number: "000".into(),
            category: category.into(),
        }
        .validate(&CategorySet::default())
        .unwrap()
    }

    fn names(store: &ContactStore) -> Vec<String> {
        store
            .as_slice()
            .iter()
            .map(|c| format!("{}/{}", c.category, c.name))
            .collect()
    }

    #[test]
    fn test_insert_keeps_category_then_name_order() {
        let mut store = ContactStore::new();
        store.insert(valid("Zeca", "Work"));
        store.insert(valid("bruno", "Personal"));
        store.insert(valid("Ana", "Work"));
        store.insert(valid("Carla", "Family"));
        store.insert(valid("Álvaro", "Personal"));

        assert_eq!(
            names(&store),
            vec![
                "Family/Carla",
                "Personal/Álvaro",
                "Personal/bruno",
                "Work/Ana",
                "Work/Zeca",
            ]
        );
        assert!(store.is_sorted());
    }

    #[test]
    fn test_replace_keeps_id_and_resorts() {
        let mut store = ContactStore::new();
        let ana = store.insert(valid("Ana", "Work"));
        store.insert(valid("Bia", "Work"));

        assert!(store.replace(ana, valid("Zuleica", "Work")));
        assert_eq!(names(&store), vec!["Work/Bia", "Work/Zuleica"]);
        assert_eq!(store.position(ana), Some(1));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_replace_unknown_id_is_refused() {
        let mut store = ContactStore::new();
        store.insert(valid("Ana", "Work"));
        assert!(!store.replace(ContactId::new(), valid("Bia", "Work")));
        assert_eq!(names(&store), vec!["Work/Ana"]);
    }

    #[test]
    fn test_remove_by_id() {
        let mut store = ContactStore::new();
        let ana = store.insert(valid("Ana", "Work"));
        let bia = store.insert(valid("Bia", "Personal"));

        let removed = store.remove(ana).unwrap();
        assert_eq!(removed.name, "Ana");
        assert_eq!(store.len(), 1);
        assert_eq!(store.at(0).map(|c| c.id), Some(bia));
        assert!(store.remove(ana).is_none());
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut store = ContactStore::new();
        for (name, category) in [
            ("Ana", "Work"),
            ("ana", "Work"),
            ("Иван", "Personal"),
            ("Igor", "Personal"),
            ("Bia", "Family"),
        ] {
            store.insert(valid(name, category));
        }
        let mut once = store.as_slice().to_vec();
        sort_contacts(&mut once);
        let mut twice = once.clone();
        sort_contacts(&mut twice);
        assert_eq!(once, twice);
        assert_eq!(once, store.as_slice().to_vec());
    }
}
