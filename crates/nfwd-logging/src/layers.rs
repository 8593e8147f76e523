//! Custom tracing layers for nfwd
//!
//! This module provides the layer that attaches forwarder context to spans,
//! and the JSONL formatting layer shared by console and file output.

use tracing::{Subscriber, span};
use tracing_subscriber::{
    fmt::MakeWriter,
    layer::{Context, Layer},
    registry::LookupSpan,
};

use crate::config::JsonFields;
use crate::context::{ForwarderContextData, ForwarderContextGuard};

/// Layer that attaches forwarder context to spans
///
/// Every span opened while a [`ForwarderContextGuard`] is active gets a
/// [`ForwarderContextExtension`] carrying the forwarder's label and
/// instance id.
pub struct ForwarderContextLayer;

impl ForwarderContextLayer {
    /// Create a new forwarder context layer
    pub fn new() -> Self {
        Self
    }
}

impl Default for ForwarderContextLayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension data stored on spans
#[derive(Debug, Clone)]
pub struct ForwarderContextExtension {
    pub data: ForwarderContextData,
}

impl<S> Layer<S> for ForwarderContextLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, _attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            if let Some(data) = ForwarderContextGuard::current() {
                span.extensions_mut().insert(ForwarderContextExtension { data });
            }
        }
    }
}

/// JSON-lines formatting layer writing to `writer`
pub fn jsonl_layer<S, W>(fields: JsonFields, writer: W) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(fields.flatten)
        .with_span_list(fields.span_list)
        .with_current_span(fields.current_span)
        .with_thread_ids(fields.thread)
        .with_thread_names(fields.thread)
        .with_file(fields.source_location)
        .with_line_number(fields.source_location)
        .with_writer(writer)
}
