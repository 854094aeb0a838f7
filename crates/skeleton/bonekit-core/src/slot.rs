//! Runtime slot: current attachment and tint of one bone binding.

use std::sync::Arc;

use crate::attachment::Attachment;
use crate::color::Color;
use crate::data::SlotData;

#[derive(Clone, Debug)]
pub struct Slot {
    data: Arc<SlotData>,
    pub color: Color,
    attachment: Option<Arc<Attachment>>,
    /// Skeleton time at which the current attachment was set.
    attached_at: f32,
}

impl Slot {
    pub fn new(data: Arc<SlotData>) -> Self {
        Self {
            color: data.color,
            data,
            attachment: None,
            attached_at: 0.0,
        }
    }

    pub fn data(&self) -> &Arc<SlotData> {
        &self.data
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Index of the owning bone in the skeleton's bone array.
    pub fn bone(&self) -> usize {
        self.data.bone
    }

    pub fn attachment(&self) -> Option<&Arc<Attachment>> {
        self.attachment.as_ref()
    }

    /// Replace the attachment and stamp the activation time.
    pub fn set_attachment(&mut self, attachment: Option<Arc<Attachment>>, now: f32) {
        self.attachment = attachment;
        self.attached_at = now;
    }

    /// Seconds elapsed since the current attachment was set.
    pub fn attachment_time(&self, now: f32) -> f32 {
        now - self.attached_at
    }

    /// Move the attachment stamp so `attachment_time(now)` reports `elapsed`.
    pub fn set_attachment_time(&mut self, elapsed: f32, now: f32) {
        self.attached_at = now - elapsed;
    }
}
