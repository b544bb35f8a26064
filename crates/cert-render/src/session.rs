//! Editing session: a surface kept in sync with its template
//!
//! The surface owns the live object graph while the user edits. Every edit
//! notification pulls a fresh template out of the surface and schedules a
//! new preview; older previews still in flight are discarded on completion.

use crate::preview::{encode_png, BlobRegistry, PreviewScheduler, PreviewSlot, PreviewTicket};
use crate::surface::{Edit, GesturePhase, InteractiveSurface, SnapshotOptions};
use crate::Result;
use cert_template::{RenderContext, Row, Template};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// A surface, its template and the preview it feeds
pub struct SurfaceSession<S: InteractiveSurface> {
    surface: S,
    template: Template,
    scheduler: PreviewScheduler,
    /// Set by the surface's edit callback
    dirty: Rc<Cell<bool>>,
    pending: Option<PreviewTicket>,
    slot: PreviewSlot,
    preview_row: Option<Row>,
}

impl<S: InteractiveSurface> SurfaceSession<S> {
    /// Load `template` into `surface` and schedule the first preview
    pub fn new(mut surface: S, template: Template, context: RenderContext) -> Self {
        surface.load_template(&template, context);

        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        surface.on_edit(Box::new(move |_| flag.set(true)));

        let mut scheduler = PreviewScheduler::new();
        let pending = Some(scheduler.request());

        Self {
            surface,
            template,
            scheduler,
            dirty,
            pending,
            slot: PreviewSlot::new(),
            preview_row: None,
        }
    }

    /// Template as of the last edit notification
    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Apply an edit; returns true when the template was updated
    pub fn apply_edit(&mut self, edit: Edit, phase: GesturePhase, now: Instant) -> Result<bool> {
        self.surface.apply_edit(edit, phase, now)?;
        Ok(self.sync())
    }

    /// Advance time; returns true when a debounced edit updated the template
    pub fn tick(&mut self, now: Instant) -> bool {
        self.surface.tick(now);
        self.sync()
    }

    /// Replace the template from the model side and reload the surface
    pub fn replace_template(&mut self, template: Template, context: RenderContext) {
        self.surface.load_template(&template, context);
        self.template = template;
        self.dirty.set(false);
        self.pending = Some(self.scheduler.request());
    }

    pub fn resize(&mut self, context: RenderContext) {
        self.surface.resize(context);
        self.pending = Some(self.scheduler.request());
    }

    /// Row substituted into previews (`None` shows raw placeholders)
    pub fn set_preview_row(&mut self, row: Option<Row>) {
        self.preview_row = row;
        self.pending = Some(self.scheduler.request());
    }

    fn sync(&mut self) -> bool {
        if !self.dirty.replace(false) {
            return false;
        }
        self.template = self.surface.serialize_to_template();
        self.pending = Some(self.scheduler.request());
        true
    }

    /// Take the latest scheduled preview, if any
    pub fn take_preview_job(&mut self) -> Option<PreviewTicket> {
        self.pending.take()
    }

    /// Rasterize the surface for a preview job
    pub fn render_preview(&mut self) -> Result<Vec<u8>> {
        let image = self
            .surface
            .snapshot(self.preview_row.as_ref(), &SnapshotOptions::default())?;
        encode_png(&image)
    }

    /// Publish a finished preview; stale tickets are dropped
    pub fn complete_preview(&mut self, ticket: PreviewTicket, png: Vec<u8>, registry: &mut dyn BlobRegistry) -> bool {
        self.scheduler.commit(ticket, png, &mut self.slot, registry)
    }

    /// Render and publish the pending preview in one step
    pub fn refresh_preview(&mut self, registry: &mut dyn BlobRegistry) -> Result<bool> {
        let Some(ticket) = self.take_preview_job() else {
            return Ok(false);
        };
        let png = self.render_preview()?;
        Ok(self.complete_preview(ticket, png, registry))
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.slot.url()
    }

    /// Revoke the live preview URL
    pub fn close(mut self, registry: &mut dyn BlobRegistry) -> Template {
        self.slot.clear(registry);
        self.template
    }
}
