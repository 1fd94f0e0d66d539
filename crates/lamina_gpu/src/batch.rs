//! Layer record batching
//!
//! A [`LayerBatch`] is the host-side staging area for one frame: contiguous
//! record slots plus the ordered draw operations that reference them. The
//! external layer tree walks its layers depth-first, calling
//! [`LayerBatch::begin_layer`] on the way down and [`LayerBatch::end_layer`] on
//! the way back up, so borders draw over sublayers.
//!
//! Records are only ever replaced whole. There is no API for mutating a field
//! of a record already in the batch, so a reader copying [`LayerBatch::as_bytes`]
//! never sees a half-updated record.
//!
//! The batch stores the traversal order, not the passes themselves: the draw
//! operations are derived from the current records, so a pass exists exactly
//! while its record asks for it.

use lamina_core::{LayerStyle, Mat4};

use crate::config::RendererConfig;
use crate::error::{LayerError, Result};
use crate::primitives::{LayerRecord, LAYER_RECORD_SIZE};

/// A draw pass over one record slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOp {
    /// Drop shadow, drawn beneath the layer
    Shadow { slot: u32 },
    /// Background fill clipped to the layer shape
    Background { slot: u32 },
    /// Border ring, drawn after the layer's sublayers
    Border { slot: u32 },
}

impl RenderOp {
    pub fn slot(&self) -> u32 {
        match *self {
            RenderOp::Shadow { slot } | RenderOp::Background { slot } | RenderOp::Border { slot } => {
                slot
            }
        }
    }
}

/// Where a layer sits in the depth-first traversal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LayerEvent {
    /// Before the layer's sublayers
    Enter(u32),
    /// After the layer's sublayers
    Exit(u32),
}

/// Batch of layer records for one frame
pub struct LayerBatch {
    records: Vec<LayerRecord>,
    events: Vec<LayerEvent>,
    closed: Vec<bool>,
    config: RendererConfig,
}

impl LayerBatch {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            records: Vec::new(),
            events: Vec::new(),
            closed: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.events.clear();
        self.closed.clear();
    }

    /// Append a record and emit the passes that draw beneath its sublayers.
    ///
    /// Returns the record's slot; pass it to [`LayerBatch::end_layer`] once
    /// the sublayers are in.
    pub fn begin_layer(&mut self, record: LayerRecord) -> Result<u32> {
        let capacity = self.config.max_layers;
        if self.records.len() >= capacity {
            return Err(LayerError::BatchFull { capacity });
        }

        let slot = self.records.len() as u32;
        self.records.push(record);
        self.closed.push(false);
        self.events.push(LayerEvent::Enter(slot));
        tracing::trace!(slot, "layer record appended");
        Ok(slot)
    }

    /// Emit the passes that draw over the layer's sublayers.
    ///
    /// Each slot is closed exactly once; closing it again is an error.
    pub fn end_layer(&mut self, slot: u32) -> Result<()> {
        let len = self.records.len();
        let closed = self
            .closed
            .get_mut(slot as usize)
            .ok_or(LayerError::SlotOutOfRange {
                slot: slot as usize,
                len,
            })?;
        if *closed {
            return Err(LayerError::SlotClosed {
                slot: slot as usize,
            });
        }
        *closed = true;
        self.events.push(LayerEvent::Exit(slot));
        Ok(())
    }

    /// Whether [`LayerBatch::end_layer`] has been called for `slot`
    pub fn is_closed(&self, slot: u32) -> bool {
        self.closed.get(slot as usize).copied().unwrap_or(false)
    }

    /// Append a layer with no sublayers
    pub fn push(&mut self, record: LayerRecord) -> Result<u32> {
        let slot = self.begin_layer(record)?;
        self.end_layer(slot)?;
        Ok(slot)
    }

    /// Flatten a style and begin its layer.
    ///
    /// Returns `None` for hidden or fully transparent layers, which the
    /// caller should skip along with their sublayers. Otherwise returns the
    /// slot and the transform to hand to the sublayers.
    pub fn begin_style(&mut self, style: &LayerStyle, parent: &Mat4) -> Result<Option<(u32, Mat4)>> {
        if !style.is_renderable() {
            return Ok(None);
        }
        let (record, local) =
            LayerRecord::from_style(style, parent, self.config.corner_radius_policy);
        let slot = self.begin_layer(record)?;
        Ok(Some((slot, local)))
    }

    /// Replace the record in `slot`.
    ///
    /// The slot keeps its place in the traversal. Passes the new record turns
    /// on or off show up in [`LayerBatch::ops`] straight away.
    pub fn write(&mut self, slot: u32, record: LayerRecord) -> Result<()> {
        let len = self.records.len();
        let target = self
            .records
            .get_mut(slot as usize)
            .ok_or(LayerError::SlotOutOfRange {
                slot: slot as usize,
                len,
            })?;
        let passes_changed = target.has_shadow() != record.has_shadow()
            || target.has_background() != record.has_background()
            || target.has_border() != record.has_border();
        *target = record;
        tracing::trace!(slot, passes_changed, "layer record rewritten");
        Ok(())
    }

    pub fn get(&self, slot: u32) -> Option<&LayerRecord> {
        self.records.get(slot as usize)
    }

    pub fn records(&self) -> &[LayerRecord] {
        &self.records
    }

    /// Draw operations in paint order, derived from the current records
    pub fn ops(&self) -> Vec<RenderOp> {
        let mut ops = Vec::with_capacity(self.events.len());
        for event in &self.events {
            match *event {
                LayerEvent::Enter(slot) => {
                    let Some(record) = self.get(slot) else { continue };
                    if record.has_shadow() {
                        ops.push(RenderOp::Shadow { slot });
                    }
                    if record.has_background() {
                        ops.push(RenderOp::Background { slot });
                    }
                }
                LayerEvent::Exit(slot) => {
                    if self.get(slot).is_some_and(LayerRecord::has_border) {
                        ops.push(RenderOp::Border { slot });
                    }
                }
            }
        }
        ops
    }

    /// Contiguous record bytes, ready to copy into a GPU buffer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    /// Size of [`LayerBatch::as_bytes`]
    pub fn byte_len(&self) -> usize {
        self.records.len() * LAYER_RECORD_SIZE
    }

    /// Log the batch summary; call once the frame's layers are all in
    pub fn finish(&self) {
        tracing::debug!(
            records = self.records.len(),
            ops = self.ops().len(),
            bytes = self.byte_len(),
            "layer batch ready"
        );
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for LayerBatch {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}
