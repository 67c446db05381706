//! The page document: every element the interaction layer reacts to.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::errors::{DomainError, DomainResult};
use super::models::{
    Bounds, Button, ButtonAction, Card, CounterWidget, ElementId, Field, Form, LazyAsset,
    ResultsRegion,
};

/// Marker id of the navigation bar.
pub const NAVBAR_ID: &str = "navbar";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    pub height: f64,
    #[serde(default)]
    pub forms: Vec<Form>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub counters: Vec<CounterWidget>,
    #[serde(default)]
    pub images: Vec<LazyAsset>,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub buttons: Vec<Button>,
    #[serde(default)]
    pub results: Option<ResultsRegion>,
    #[serde(skip)]
    pub(crate) classes: BTreeMap<ElementId, BTreeSet<String>>,
}

impl Page {
    pub fn field(&self, id: &ElementId) -> Option<&Field> {
        self.fields.iter().find(|field| &field.id == id)
    }

    pub fn field_mut(&mut self, id: &ElementId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| &field.id == id)
    }

    pub fn form(&self, id: &ElementId) -> Option<&Form> {
        self.forms.iter().find(|form| &form.id == id)
    }

    pub fn form_mut(&mut self, id: &ElementId) -> Option<&mut Form> {
        self.forms.iter_mut().find(|form| &form.id == id)
    }

    /// The form a field belongs to, if any.
    pub fn form_of(&self, field: &ElementId) -> Option<&Form> {
        self.forms.iter().find(|form| form.fields.contains(field))
    }

    /// Fields of a form in declaration order.
    pub fn fields_of<'a>(&'a self, form: &'a Form) -> impl Iterator<Item = &'a Field> + 'a {
        form.fields.iter().filter_map(|id| self.field(id))
    }

    pub fn counter_mut(&mut self, id: &ElementId) -> Option<&mut CounterWidget> {
        self.counters.iter_mut().find(|counter| &counter.id == id)
    }

    pub fn image_mut(&mut self, id: &ElementId) -> Option<&mut LazyAsset> {
        self.images.iter_mut().find(|image| &image.id == id)
    }

    pub fn card(&self, id: &ElementId) -> Option<&Card> {
        self.cards.iter().find(|card| &card.id == id)
    }

    pub fn button(&self, id: &ElementId) -> Option<&Button> {
        self.buttons.iter().find(|button| &button.id == id)
    }

    /// Bounds of any positioned element.
    pub fn bounds_of(&self, id: &ElementId) -> Option<Bounds> {
        self.field(id)
            .map(|field| field.bounds)
            .or_else(|| self.card(id).map(|card| card.bounds))
            .or_else(|| {
                self.counters
                    .iter()
                    .find(|counter| &counter.id == id)
                    .map(|counter| counter.bounds)
            })
            .or_else(|| {
                self.images
                    .iter()
                    .find(|image| &image.id == id)
                    .map(|image| image.bounds)
            })
    }

    pub fn add_class(&mut self, id: &ElementId, class: &str) {
        self.classes
            .entry(id.clone())
            .or_default()
            .insert(class.to_string());
    }

    pub fn remove_class(&mut self, id: &ElementId, class: &str) {
        if let Some(classes) = self.classes.get_mut(id) {
            classes.remove(class);
        }
    }

    pub fn set_class(&mut self, id: &ElementId, class: &str, present: bool) {
        if present {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
    }

    pub fn has_class(&self, id: &ElementId, class: &str) -> bool {
        self.classes
            .get(id)
            .is_some_and(|classes| classes.contains(class))
    }

    /// Checks that ids are unique and every reference points at a real element.
    pub fn validate(&self) -> DomainResult<()> {
        let mut seen = HashSet::new();
        let ids = self
            .forms
            .iter()
            .map(|form| &form.id)
            .chain(self.fields.iter().map(|field| &field.id))
            .chain(self.counters.iter().map(|counter| &counter.id))
            .chain(self.images.iter().map(|image| &image.id))
            .chain(self.cards.iter().map(|card| &card.id))
            .chain(self.buttons.iter().map(|button| &button.id));
        for id in ids {
            if !seen.insert(id) {
                return Err(DomainError::InvalidPage(format!("duplicate id '{}'", id)));
            }
        }

        for form in &self.forms {
            if let Some(missing) = form.fields.iter().find(|id| self.field(id).is_none()) {
                return Err(DomainError::UnknownField(missing.to_string()));
            }
        }

        for button in &self.buttons {
            if let ButtonAction::Reset { form } = &button.action {
                if self.form(form).is_none() {
                    return Err(DomainError::UnknownForm(form.to_string()));
                }
            }
        }

        Ok(())
    }
}
