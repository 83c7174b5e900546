//! Message-passing bridge between the host UI surface and the export runner.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::export::{ExportEvent, ExportRunner};
use crate::domain::errors::ExportError;
use crate::domain::model::{ExportBundle, ManifestEntry};
use crate::infra::host::SceneHost;

/// Reply to the UI's liveness probe.
pub const TEST_ECHO: &str = "Test successful! Communication is working.";

/// Messages the UI surface sends into the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundMessage {
    /// Trigger an export run. A missing depth falls back to the configured
    /// default.
    Export {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        depth: Option<u32>,
    },
    /// Liveness echo, unrelated to export logic.
    Test,
}

/// One image file as carried inside a `complete` message. Bytes travel
/// base64-encoded since the envelope is JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFilePayload {
    pub name: String,
    #[serde(with = "b64")]
    pub data: Vec<u8>,
}

/// Messages the plugin posts back to the UI surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    /// One per item, posted before that item's export attempt.
    Progress {
        current: usize,
        total: usize,
        #[serde(rename = "componentName")]
        component_name: String,
    },
    /// Empty selection, zero targets, a single item's failure, or an
    /// unexpected top-level failure. Only the first two end the run.
    Error { message: String },
    /// Terminal success event, posted exactly once per run regardless of
    /// partial item failures.
    Complete {
        data: Vec<ManifestEntry>,
        #[serde(rename = "imageFiles")]
        image_files: Vec<ImageFilePayload>,
        #[serde(rename = "jsonData")]
        json_data: String,
    },
}

/// Destination for outbound messages, the plugin-side equivalent of the
/// host's `postMessage` channel.
pub trait MessageSink {
    fn post(&self, message: OutboundMessage);
}

impl MessageSink for tokio::sync::mpsc::UnboundedSender<OutboundMessage> {
    fn post(&self, message: OutboundMessage) {
        // A dropped receiver means the UI surface is gone; there is nowhere
        // left to report to.
        let _ = self.send(message);
    }
}

/// Sink collecting messages in memory, for the CLI and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<OutboundMessage>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain all messages posted so far, in order.
    pub fn take(&self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.messages.lock().expect("sink lock poisoned"))
    }
}

impl MessageSink for MemorySink {
    fn post(&self, message: OutboundMessage) {
        self.messages.lock().expect("sink lock poisoned").push(message);
    }
}

/// Dispatches inbound UI messages to the runner and reports back through the
/// sink. Thin by design: everything of substance happens in the app layer.
pub struct HostBridge<H, S> {
    host: H,
    sink: S,
    default_depth: u32,
}

impl<H: SceneHost, S: MessageSink> HostBridge<H, S> {
    pub fn new(host: H, sink: S) -> Self {
        Self {
            host,
            sink,
            default_depth: 0,
        }
    }

    /// Depth applied when an export message carries none.
    pub fn with_default_depth(mut self, depth: u32) -> Self {
        self.default_depth = depth;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub async fn handle(&self, message: InboundMessage) {
        match message {
            InboundMessage::Test => self.sink.post(OutboundMessage::Error {
                message: TEST_ECHO.into(),
            }),
            InboundMessage::Export { depth } => {
                self.run_export(depth.unwrap_or(self.default_depth)).await;
            }
        }
    }

    async fn run_export(&self, depth: u32) {
        let selection = self.host.selection();
        info!(depth, roots = selection.len(), "starting export run");

        let runner = ExportRunner::new(&self.host);
        let mut on_event = |event: ExportEvent| match event {
            ExportEvent::Progress { current, total, name } => {
                self.sink.post(OutboundMessage::Progress {
                    current,
                    total,
                    component_name: name,
                });
            }
            ExportEvent::ItemFailed { name, .. } => {
                self.sink.post(OutboundMessage::Error {
                    message: format!("Failed to export component: {name}"),
                });
            }
        };

        match runner.run(&selection, depth, &mut on_event).await {
            Ok(bundle) => {
                info!(items = bundle.manifest.len(), "export run complete");
                self.sink.post(complete_message(bundle));
            }
            Err(err @ (ExportError::NoSelection | ExportError::NoTargetsAtDepth { .. })) => {
                self.sink.post(OutboundMessage::Error {
                    message: err.to_string(),
                });
            }
            Err(ExportError::Unexpected(err)) => {
                self.sink.post(OutboundMessage::Error {
                    message: format!("Export failed: {err}"),
                });
            }
        }
    }
}

fn complete_message(bundle: ExportBundle) -> OutboundMessage {
    let image_files = bundle
        .artifacts
        .into_iter()
        .map(|artifact| ImageFilePayload {
            name: artifact.file_name,
            data: artifact.bytes,
        })
        .collect();
    OutboundMessage::Complete {
        data: bundle.manifest,
        image_files,
        json_data: bundle.json,
    }
}

mod b64 {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
