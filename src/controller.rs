//! Contact store plus the add/edit form and the two-step delete.
//!
//! All mutation of the collection goes through [`ContactController`]. The
//! presentation layer reads state back through the accessors and never
//! touches the store directly.
//!
//! Form lifecycle:
//!
//! ```text
//! Closed --open_for_create / open_for_edit--> Open
//! Open   --save (ok)-------------------------> Closed
//! Open   --save (validation error)-----------> Open
//! Open   --cancel----------------------------> Closed
//! ```
//!
//! Edit and delete targets are held as [`ContactId`]s, so a re-sort or a
//! removal between capturing a row and acting on it cannot hit the wrong
//! record.

use tracing::{debug, info, warn};

use crate::contact::{CategorySet, Contact, ContactId, Draft, DraftField};
use crate::error::ContactError;
use crate::store::ContactStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(ContactId),
}

impl FormMode {
    pub fn title(self) -> &'static str {
        match self {
            FormMode::Create => "Add Contact",
            FormMode::Edit(_) => "Edit Contact",
        }
    }
}

/// A delete waiting for the user to confirm or decline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub id: ContactId,
    pub title: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ContactController {
    store: ContactStore,
    categories: CategorySet,
    draft: Draft,
    edit_target: Option<ContactId>,
    form_open: bool,
    pending_delete: Option<DeleteRequest>,
}

impl ContactController {
    pub fn new(categories: CategorySet) -> Self {
        Self {
            store: ContactStore::new(),
            categories,
            draft: Draft::default(),
            edit_target: None,
            form_open: false,
            pending_delete: None,
        }
    }

    // =========================================================================
    // Read access for the presentation layer
    // =========================================================================

    pub fn contacts(&self) -> &[Contact] {
        self.store.as_slice()
    }

    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.store.get(id)
    }

    pub fn position(&self, id: ContactId) -> Option<usize> {
        self.store.position(id)
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_form_open(&self) -> bool {
        self.form_open
    }

    pub fn form_mode(&self) -> Option<FormMode> {
        if !self.form_open {
            return None;
        }
        Some(match self.edit_target {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Create,
        })
    }

    pub fn pending_delete(&self) -> Option<&DeleteRequest> {
        self.pending_delete.as_ref()
    }

    // =========================================================================
    // Form
    // =========================================================================

    pub fn open_for_create(&mut self) {
        self.draft.clear();
        self.edit_target = None;
        self.form_open = true;
        debug!("form opened for create");
    }

    /// Open the form on the contact currently rendered at `index`.
    pub fn open_for_edit(&mut self, index: usize) -> Result<ContactId, ContactError> {
        let id = self.resolve_index(index)?;
        self.open_for_edit_id(id)?;
        Ok(id)
    }

    pub fn open_for_edit_id(&mut self, id: ContactId) -> Result<(), ContactError> {
        let Some(contact) = self.store.get(id) else {
            warn!(%id, "edit requested for missing contact");
            return Err(ContactError::UnknownContact(id));
        };
        self.draft = Draft::from_contact(contact);
        self.edit_target = Some(id);
        self.form_open = true;
        debug!(%id, "form opened for edit");
        Ok(())
    }

    pub fn update_draft_field(&mut self, field: DraftField, value: impl Into<String>) {
        if !self.form_open {
            return;
        }
        self.draft.set(field, value);
    }

    /// Commit the draft. On any error the form stays open and nothing is
    /// written to the collection.
    pub fn save(&mut self) -> Result<ContactId, ContactError> {
        if !self.form_open {
            return Err(ContactError::FormClosed);
        }

        let valid = match self.draft.validate(&self.categories) {
            Ok(valid) => valid,
            Err(err) => {
                debug!(error = %err, "draft rejected");
                return Err(err);
            }
        };

        let id = match self.edit_target {
            None => {
                let id = self.store.insert(valid);
                info!(%id, total = self.store.len(), "contact added");
                id
            }
            Some(id) => {
                if !self.store.replace(id, valid) {
                    warn!(%id, "edit target vanished before save");
                    return Err(ContactError::UnknownContact(id));
                }
                info!(%id, "contact updated");
                id
            }
        };

        debug_assert!(self.store.is_sorted());
        self.reset_form();
        Ok(id)
    }

    pub fn cancel(&mut self) {
        self.reset_form();
        debug!("form cancelled");
    }

    fn reset_form(&mut self) {
        self.draft.clear();
        self.edit_target = None;
        self.form_open = false;
    }

    // =========================================================================
    // Delete
    // =========================================================================

    pub fn request_delete(&mut self, index: usize) -> Result<DeleteRequest, ContactError> {
        let id = self.resolve_index(index)?;
        self.request_delete_id(id)
    }

    pub fn request_delete_id(&mut self, id: ContactId) -> Result<DeleteRequest, ContactError> {
        let contact = self
            .store
            .get(id)
            .ok_or(ContactError::UnknownContact(id))?;
        let request = DeleteRequest {
            id,
            title: "Delete contact?".to_string(),
            message: format!("Remove \"{}\"?", contact.name),
        };
        self.pending_delete = Some(request.clone());
        debug!(%id, "delete requested");
        Ok(request)
    }

    /// Accept the pending delete. `Ok(None)` when nothing was pending.
    pub fn confirm_delete(&mut self) -> Result<Option<Contact>, ContactError> {
        let Some(request) = self.pending_delete.take() else {
            return Ok(None);
        };
        self.delete(request.id).map(Some)
    }

    pub fn decline_delete(&mut self) {
        if let Some(request) = self.pending_delete.take() {
            debug!(id = %request.id, "delete declined");
        }
    }

    pub fn delete(&mut self, id: ContactId) -> Result<Contact, ContactError> {
        match self.store.remove(id) {
            Some(contact) => {
                if self.edit_target == Some(id) {
                    self.reset_form();
                }
                info!(%id, total = self.store.len(), "contact deleted");
                Ok(contact)
            }
            None => {
                warn!(%id, "delete target no longer exists");
                Err(ContactError::UnknownContact(id))
            }
        }
    }

    fn resolve_index(&self, index: usize) -> Result<ContactId, ContactError> {
        self.store
            .at(index)
            .map(|c| c.id)
            .ok_or(ContactError::StaleIndex {
                index,
                len: self.store.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn controller() -> ContactController {
        ContactController::new(CategorySet::default())
    }

    fn add(ctl: &mut ContactController, name: &str, number: &str, category: &str) -> ContactId {
        ctl.open_for_create();
        ctl.update_draft_field(DraftField::Name, name);
        ctl.update_draft_field(DraftField::Number, number);
        ctl.update_draft_field(DraftField::Category, category);
        ctl.save().unwrap()
    }

    fn is_sorted(ctl: &ContactController) -> bool {
        ctl.contacts().windows(2).all(|w| {
            crate::store::contact_order(&w[0], &w[1]) != std::cmp::Ordering::Greater
        })
    }

    #[test]
    fn test_add_then_count() {
        let mut ctl = controller();
        add(&mut ctl, "Ana", "123", "Personal");

        assert_eq!(ctl.contacts().len(), 1);
        let first = &ctl.contacts()[0];
        assert_eq!(
            (first.name.as_str(), first.number.as_str(), first.category.as_str()),
            ("Ana", "123", "Personal")
        );
        assert!(!ctl.is_form_open());
        assert_eq!(ctl.draft(), &Draft::default());
    }

    #[test]
    fn test_validation_failure_keeps_form_open() {
        let mut ctl = controller();
        add(&mut ctl, "Bia", "9", "Work");

        ctl.open_for_create();
        ctl.update_draft_field(DraftField::Name, "Ana");
        ctl.update_draft_field(DraftField::Category, "Personal");
        let err = ctl.save().unwrap_err();

        assert_eq!(
            err,
            ContactError::Validation {
                missing: vec![DraftField::Number]
            }
        );
        assert!(ctl.is_form_open());
        assert_eq!(ctl.contacts().len(), 1);
        // Draft survives so the user can fix it.
        assert_eq!(ctl.draft().name, "Ana");
    }

    #[test]
    fn test_each_empty_field_is_rejected() {
        for field in DraftField::ALL {
            let mut ctl = controller();
            ctl.open_for_create();
            ctl.update_draft_field(DraftField::Name, "Ana");
            ctl.update_draft_field(DraftField::Number, "1");
            ctl.update_draft_field(DraftField::Category, "Work");
            ctl.update_draft_field(field, "");
            assert!(ctl.save().is_err(), "{field} empty must fail");
            assert!(ctl.contacts().is_empty());
            assert!(ctl.is_form_open());
        }
    }

    #[test]
    fn test_edit_replaces_not_appends() {
        let mut ctl = controller();
        let id = add(&mut ctl, "Ana", "1", "Work");

        let opened = ctl.open_for_edit(0).unwrap();
        assert_eq!(opened, id);
        assert_eq!(ctl.form_mode(), Some(FormMode::Edit(id)));
        assert_eq!(ctl.draft().name, "Ana");

        ctl.update_draft_field(DraftField::Name, "Ana Maria");
        assert_eq!(ctl.save().unwrap(), id);

        assert_eq!(ctl.contacts().len(), 1);
        assert_eq!(ctl.contacts()[0].name, "Ana Maria");
        assert_eq!(ctl.contacts()[0].id, id);
    }

    #[test]
    fn test_edit_moves_record_to_sorted_position() {
        let mut ctl = controller();
        add(&mut ctl, "Ana", "1", "Work");
        let bia = add(&mut ctl, "Bia", "2", "Work");

        ctl.open_for_edit_id(bia).unwrap();
        ctl.update_draft_field(DraftField::Category, "Family");
        ctl.save().unwrap();

        assert_eq!(ctl.position(bia), Some(0));
        assert!(is_sorted(&ctl));
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let mut ctl = controller();
        add(&mut ctl, "Bia", "2", "Work");
        add(&mut ctl, "Ana", "1", "Work");
        let second = ctl.contacts()[1].clone();

        let request = ctl.request_delete(0).unwrap();
        assert_eq!(request.message, "Remove \"Ana\"?");
        assert_eq!(ctl.contacts().len(), 2);

        let removed = ctl.confirm_delete().unwrap().unwrap();
        assert_eq!(removed.name, "Ana");
        assert_eq!(ctl.contacts(), &[second]);
        assert!(ctl.pending_delete().is_none());
    }

    #[test]
    fn test_decline_delete_is_noop() {
        let mut ctl = controller();
        add(&mut ctl, "Ana", "1", "Work");

        ctl.request_delete(0).unwrap();
        ctl.decline_delete();

        assert_eq!(ctl.contacts().len(), 1);
        assert!(ctl.pending_delete().is_none());
        assert_eq!(ctl.confirm_delete().unwrap(), None);
    }

    #[test]
    fn test_confirm_follows_record_across_resort() {
        let mut ctl = controller();
        add(&mut ctl, "Carla", "3", "Work");
        let request = ctl.request_delete(0).unwrap();

        // A new contact sorts in front of Carla before the user confirms.
        add(&mut ctl, "Ana", "1", "Work");
        assert_eq!(ctl.contacts()[0].name, "Ana");

        let removed = ctl.confirm_delete().unwrap().unwrap();
        assert_eq!(removed.id, request.id);
        assert_eq!(removed.name, "Carla");
        assert_eq!(ctl.contacts()[0].name, "Ana");
    }

    #[test]
    fn test_confirm_after_record_vanished() {
        let mut ctl = controller();
        let id = add(&mut ctl, "Ana", "1", "Work");
        ctl.request_delete(0).unwrap();
        ctl.delete(id).unwrap();

        assert_eq!(
            ctl.confirm_delete().unwrap_err(),
            ContactError::UnknownContact(id)
        );
        assert!(ctl.contacts().is_empty());
    }

    #[test]
    fn test_out_of_range_index_is_stale() {
        let mut ctl = controller();
        add(&mut ctl, "Ana", "1", "Work");

        assert_eq!(
            ctl.open_for_edit(1).unwrap_err(),
            ContactError::StaleIndex { index: 1, len: 1 }
        );
        assert!(!ctl.is_form_open());
        assert_eq!(
            ctl.request_delete(5).unwrap_err(),
            ContactError::StaleIndex { index: 5, len: 1 }
        );
        assert!(ctl.pending_delete().is_none());
    }

    #[test]
    fn test_cancel_is_noop() {
        let mut ctl = controller();
        add(&mut ctl, "Ana", "1", "Work");
        let before = ctl.contacts().to_vec();

        ctl.open_for_edit(0).unwrap();
        ctl.update_draft_field(DraftField::Name, "Someone Else");
        ctl.update_draft_field(DraftField::Number, "");
        ctl.cancel();

        assert_eq!(ctl.contacts(), before.as_slice());
        assert!(!ctl.is_form_open());
        assert_eq!(ctl.form_mode(), None);
        assert_eq!(ctl.draft(), &Draft::default());
    }

    #[test]
    fn test_open_for_create_clears_previous_draft() {
        let mut ctl = controller();
        add(&mut ctl, "Ana", "1", "Work");
        ctl.open_for_edit(0).unwrap();
        ctl.open_for_create();

        assert_eq!(ctl.form_mode(), Some(FormMode::Create));
        assert_eq!(ctl.draft(), &Draft::default());
    }

    #[test]
    fn test_save_without_open_form() {
        let mut ctl = controller();
        assert_eq!(ctl.save().unwrap_err(), ContactError::FormClosed);
        ctl.update_draft_field(DraftField::Name, "ignored");
        assert_eq!(ctl.draft(), &Draft::default());
    }

    #[test]
    fn test_edit_target_deleted_while_form_open() {
        let mut ctl = controller();
        let id = add(&mut ctl, "Ana", "1", "Work");
        ctl.open_for_edit_id(id).unwrap();
        ctl.delete(id).unwrap();

        // Deleting the record under edit closes the form.
        assert!(!ctl.is_form_open());
        assert_eq!(ctl.save().unwrap_err(), ContactError::FormClosed);
    }

    #[test]
    fn test_sorted_after_every_save() {
        let mut ctl = controller();
        let entries = [
            ("Zeca", "Work"),
            ("Ana", "Personal"),
            ("bruno", "Family"),
            ("Érica", "Personal"),
            ("Ana", "Work"),
            ("Carlos", "Family"),
        ];
        for (i, (name, category)) in entries.iter().enumerate() {
            add(&mut ctl, name, &i.to_string(), category);
            assert!(is_sorted(&ctl));
        }
        ctl.open_for_edit(0).unwrap();
        ctl.update_draft_field(DraftField::Name, "Zz");
        ctl.save().unwrap();
        assert!(is_sorted(&ctl));
    }
}
