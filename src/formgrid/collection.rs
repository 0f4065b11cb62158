//! # Repeatable Field Collection
//!
//! [`FieldCollection`] owns the live, ordered list of fields for one repeatable widget
//! and keeps a key → value projection of it in sync.
//!
//! ## Lifecycle
//!
//! ```text
//! host data ──resolve──▶ items ──▶ view() ──▶ rendering surface
//!                          ▲                        │
//!                          └── update / add / delete ◀┘
//! ```
//!
//! - Host data (or policy) changes fully re-initialize the collection. Runtime edits and
//!   added items are discarded.
//! - [`FieldCollection::add_item`] names the new item `{templateKey}[n]`, continuing the
//!   numbering of the last added item (or the last item, before anything was added).
//!   A host item still holding the bare template key is renamed so the bare key cannot
//!   collide later. That rename is returned as a [`HostRename`] patch for the host to
//!   apply to its own data; this collection never touches host memory.
//! - [`FieldCollection::delete_item`] refuses to go to or below
//!   [`AddPolicy::min_retained`] items and, with [`AddPolicy::delete_only_added`], refuses
//!   to remove items that came from the host.
//!
//! Out-of-range indexes on update and delete are caller bugs and come back as
//! [`GridError::IndexOutOfBounds`].

use crate::compose::compose_with;
use crate::error::{GridError, Result};
use crate::field::{
    FieldValue, KeyAttr, LabelSide, Origin, RawDescriptor, ResolvedDescriptor,
};
use crate::resolve::{resolve, SuffixTemplate};
use crate::sequence::Alphabet;
use crate::variant::{FieldVariant, InputEvent};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use uuid::Uuid;

/// Governs appending and removing items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPolicy {
    #[serde(default)]
    pub enabled: bool,
    /// Descriptor new items are cloned from.
    #[serde(default)]
    pub template: RawDescriptor,
    /// Delete is refused once the collection has this many items or fewer.
    #[serde(default)]
    pub min_retained: usize,
    #[serde(default)]
    pub delete_only_added: bool,
}

impl AddPolicy {
    /// Checks that an enabled policy can produce well-formed keys.
    ///
    /// The collection itself does not call this: an enabled policy with an empty
    /// template key happily yields keys like `[0]`.
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.template.key.trim().is_empty() {
            return Err(GridError::Config(
                "Add is enabled but the template has no key".to_string(),
            ));
        }
        Ok(())
    }
}

/// A rename the host should apply to its own descriptor array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRename {
    /// Position in the host's array.
    pub index: usize,
    pub attribute: KeyAttr,
    pub from: String,
    pub to: String,
}

impl HostRename {
    pub fn apply_to(&self, host: &mut [RawDescriptor]) {
        if let Some(raw) = host.get_mut(self.index) {
            *raw.attr_mut(self.attribute) = self.to.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOutcome {
    pub item: ResolvedDescriptor,
    pub host_patch: Vec<HostRename>,
}

/// What the host learns about a deleted item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedInfo {
    pub index: usize,
    pub key: String,
    pub alt_key: String,
    pub key_numeral: Option<usize>,
    pub alt_key_numeral: Option<usize>,
}

/// Host callbacks. All methods default to doing nothing.
pub trait CollectionObserver {
    fn on_change(&mut self, _event: &InputEvent) {}

    fn on_add(&mut self, _item: &ResolvedDescriptor) {}

    fn on_delete(&mut self, _info: &DeletedInfo) {}
}

/// Everything the rendering surface needs for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: Uuid,
    pub key: String,
    pub alt_key: String,
    pub value: FieldValue,
    pub label_text: Option<String>,
    pub label_side: LabelSide,
    pub show_delete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ItemRef {
    key: String,
    alt_key: String,
}

pub struct FieldCollection<V: FieldVariant> {
    host: Vec<RawDescriptor>,
    /// Resolved (key, alt key) of each host entry, by host index.
    host_keys: Vec<(String, String)>,
    policy: AddPolicy,
    items: Vec<ResolvedDescriptor>,
    values: IndexMap<String, FieldValue>,
    last_added: Option<ItemRef>,
    suffix: SuffixTemplate,
    alphabet: Alphabet,
    observer: Option<Box<dyn CollectionObserver>>,
    _variant: PhantomData<V>,
}

impl<V: FieldVariant> FieldCollection<V> {
    pub fn new(host: Vec<RawDescriptor>, policy: AddPolicy) -> Self {
        let mut collection = Self {
            host: Vec::new(),
            host_keys: Vec::new(),
            policy: AddPolicy::default(),
            items: Vec::new(),
            values: IndexMap::new(),
            last_added: None,
            suffix: SuffixTemplate::default(),
            alphabet: Alphabet::default(),
            observer: None,
            _variant: PhantomData,
        };
        collection.initialize(host, policy);
        collection
    }

    /// Swaps the disambiguation template and re-initializes from the host data.
    pub fn with_suffix_template(mut self, suffix: SuffixTemplate) -> Self {
        self.suffix = suffix;
        let host = std::mem::take(&mut self.host);
        let policy = self.policy.clone();
        self.initialize(host, policy);
        self
    }

    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn CollectionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Replaces all state with freshly resolved host data.
    pub fn initialize(&mut self, host: Vec<RawDescriptor>, policy: AddPolicy) {
        let items = resolve(host.clone(), &KeyAttr::ALL, &self.suffix);
        self.host_keys = items
            .iter()
            .map(|i| (i.key().to_string(), i.alt_key().to_string()))
            .collect();
        self.host = host;
        self.policy = policy;
        self.items = items;
        self.last_added = None;
        self.refresh_values();
        debug!(
            "{} collection initialized with {} items",
            V::NAME,
            self.items.len()
        );
    }

    /// New host data, same policy.
    pub fn set_host_data(&mut self, host: Vec<RawDescriptor>) {
        let policy = self.policy.clone();
        self.initialize(host, policy);
    }

    /// New policy, same host data.
    pub fn set_policy(&mut self, policy: AddPolicy) {
        let host = std::mem::take(&mut self.host);
        self.initialize(host, policy);
    }

    pub fn items(&self) -> &[ResolvedDescriptor] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn values(&self) -> &IndexMap<String, FieldValue> {
        &self.values
    }

    pub fn value_of(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn policy(&self) -> &AddPolicy {
        &self.policy
    }

    /// The host data as the host holds it after applying every returned patch.
    pub fn host_data(&self) -> &[RawDescriptor] {
        &self.host
    }

    pub fn update_value(&mut self, index: usize, event: &InputEvent) -> Result<()> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(GridError::IndexOutOfBounds { index, len })?;

        let value = V::read_value(event);
        if V::accepts(item, &value) {
            item.set_value(value);
            self.refresh_values();
        } else {
            warn!(
                "{} field {} rejected value {}",
                V::NAME,
                item.key(),
                value
            );
        }

        if let Some(observer) = self.observer.as_mut() {
            observer.on_change(event);
        }
        Ok(())
    }

    /// Appends an item built from the policy template. `None` when adding is disabled.
    pub fn add_item(&mut self) -> Option<AddOutcome> {
        if !self.policy.enabled {
            return None;
        }
        let template = self.policy.template.clone();

        let n = self.next_numeral(&template);
        let mut raw = template.clone();
        raw.key = self.suffix.apply(&template.key, n);
        if !template.alt_key.is_empty() {
            raw.alt_key = self.suffix.apply(&template.alt_key, n);
        }

        let host_patch = self.rename_bare_keys(&template, &raw);

        if let Some(label) = raw.label.as_mut() {
            if let Some(seq) = label.sequence.as_ref() {
                label.text = compose_with(
                    &label.text,
                    self.items.len(),
                    seq.kind,
                    seq.position(),
                    &self.alphabet,
                );
            }
        }
        raw.value = V::default_value(&template);

        let item = ResolvedDescriptor::from_raw(raw, Origin::RuntimeAdded);
        self.last_added = Some(ItemRef {
            key: item.key().to_string(),
            alt_key: item.alt_key().to_string(),
        });
        self.items.push(item.clone());
        self.refresh_values();

        debug!(
            "{} collection added {} ({} renames)",
            V::NAME,
            item.key(),
            host_patch.len()
        );
        if let Some(observer) = self.observer.as_mut() {
            observer.on_add(&item);
        }
        Some(AddOutcome { item, host_patch })
    }

    /// Removes the item at `index`. `Ok(None)` when the policy keeps it.
    pub fn delete_item(&mut self, index: usize) -> Result<Option<DeletedInfo>> {
        let len = self.items.len();
        if index >= len {
            return Err(GridError::IndexOutOfBounds { index, len });
        }
        if !self.can_delete(index) {
            warn!("{} collection kept item {}", V::NAME, index);
            return Ok(None);
        }

        let item = self.items.remove(index);
        self.refresh_values();

        let info = DeletedInfo {
            index,
            key_numeral: self.suffix.extract(item.key()),
            alt_key_numeral: self.suffix.extract(item.alt_key()),
            key: item.key().to_string(),
            alt_key: item.alt_key().to_string(),
        };
        debug!("{} collection deleted {}", V::NAME, info.key);
        if let Some(observer) = self.observer.as_mut() {
            observer.on_delete(&info);
        }
        Ok(Some(info))
    }

    /// Whether the delete control for `index` is shown (and delete would succeed).
    pub fn can_delete(&self, index: usize) -> bool {
        let Some(item) = self.items.get(index) else {
            return false;
        };
        self.items.len() > self.policy.min_retained
            && (!self.policy.delete_only_added || item.origin() == Origin::RuntimeAdded)
    }

    pub fn view(&self) -> Vec<ItemView> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| ItemView {
                id: item.id(),
                key: item.key().to_string(),
                alt_key: item.alt_key().to_string(),
                value: item.value().clone(),
                label_text: item.label().map(|l| l.text.clone()),
                label_side: item.label().map(|l| l.position).unwrap_or_default(),
                show_delete: self.can_delete(i),
            })
            .collect()
    }

    fn refresh_values(&mut self) {
        self.values = self
            .items
            .iter()
            .map(|i| (i.key().to_string(), i.value().clone()))
            .collect();
    }

    fn taken(&self, attr: KeyAttr, value: &str) -> bool {
        self.items.iter().any(|i| i.attr(attr) == value)
    }

    /// One past the numeral of the last added (or last) item, moved past any live key.
    fn next_numeral(&self, template: &RawDescriptor) -> usize {
        let reference = self.last_added.clone().or_else(|| {
            self.items.last().map(|i| ItemRef {
                key: i.key().to_string(),
                alt_key: i.alt_key().to_string(),
            })
        });
        let mut n = reference
            .and_then(|r| {
                self.suffix
                    .extract(&r.key)
                    .or_else(|| self.suffix.extract(&r.alt_key))
            })
            .map(|found| found + 1)
            .unwrap_or(0);

        while self.taken(KeyAttr::Key, &self.suffix.apply(&template.key, n))
            || (!template.alt_key.is_empty()
                && self.taken(KeyAttr::AltKey, &self.suffix.apply(&template.alt_key, n)))
        {
            n += 1;
        }
        n
    }

    /// Renames host items that still hold a bare template key.
    fn rename_bare_keys(
        &mut self,
        template: &RawDescriptor,
        new_item: &RawDescriptor,
    ) -> Vec<HostRename> {
        let mut patch = Vec::new();
        for attr in KeyAttr::ALL {
            let bare = template.attr(attr);
            if bare.is_empty() {
                continue;
            }
            let appended = self
                .items
                .iter()
                .filter(|i| self.suffix.is_suffixed_form_of(i.attr(attr), bare))
                .count();

            for index in 0..self.host_keys.len() {
                let current = match attr {
                    KeyAttr::Key => &self.host_keys[index].0,
                    KeyAttr::AltKey => &self.host_keys[index].1,
                };
                if current != bare {
                    continue;
                }

                let mut m = appended;
                let renamed = loop {
                    let candidate = self.suffix.apply(bare, m);
                    if candidate != new_item.attr(attr) && !self.taken(attr, &candidate) {
                        break candidate;
                    }
                    m += 1;
                };

                let rename = HostRename {
                    index,
                    attribute: attr,
                    from: bare.to_string(),
                    to: renamed.clone(),
                };
                match attr {
                    KeyAttr::Key => self.host_keys[index].0 = renamed.clone(),
                    KeyAttr::AltKey => self.host_keys[index].1 = renamed.clone(),
                }
                rename.apply_to(&mut self.host);
                for item in self.items.iter_mut() {
                    if item.origin() == Origin::FromHost && item.attr(attr) == bare {
                        item.set_attr(attr, renamed.clone());
                    }
                }
                patch.push(rename);
            }
        }
        patch
    }
}
