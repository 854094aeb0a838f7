//! Skins: named tables mapping (slot index, attachment name) to attachments.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::attachment::Attachment;

#[derive(Clone, Debug, Default)]
pub struct Skin {
    name: String,
    attachments: HashMap<usize, HashMap<String, Arc<Attachment>>>,
}

impl Skin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attachments: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or replace the attachment stored under `(slot_index, name)`.
    pub fn add_attachment(
        &mut self,
        slot_index: usize,
        name: impl Into<String>,
        attachment: Attachment,
    ) -> Arc<Attachment> {
        let attachment = Arc::new(attachment);
        self.attachments
            .entry(slot_index)
            .or_default()
            .insert(name.into(), attachment.clone());
        attachment
    }

    pub fn get_attachment(&self, slot_index: usize, name: &str) -> Option<&Arc<Attachment>> {
        self.attachments.get(&slot_index)?.get(name)
    }

    /// Every `(slot_index, name, attachment)` entry, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &str, &Arc<Attachment>)> {
        self.attachments.iter().flat_map(|(slot, by_name)| {
            by_name
                .iter()
                .map(move |(name, att)| (*slot, name.as_str(), att))
        })
    }

    pub fn len(&self) -> usize {
        self.attachments.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
