//! Client-side core of the chat widget: the message log, optimistic
//! placeholders, `/imagen` routing and microphone recording, driving the relay
//! through a [`RelayTransport`].

pub mod client;
pub mod dispatch;
pub mod message;
pub mod recorder;
pub mod session;

use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::media;
use client::{RelayRequest, RelayResponse, RelayTransport, RequestKind};
use message::{Message, MessageKind};
use recorder::{AudioRecorder, RecorderError, RecorderStatus, Toggle};
use session::{ChatSession, PendingTicket};

pub const ERROR_PREFIX: &str = "⚠️ ";
pub const CONNECTION_PREFIX: &str = "❌ ";
pub const TRANSCRIPT_PREFIX: &str = "🗣 ";
pub const NO_IMAGE_GENERATED: &str = "No se pudo generar la imagen";
pub const EMPTY_REPLY: &str = "El servidor no devolvió ninguna respuesta";
pub const RECORDING_FILE_NAME: &str = "grabacion.wav";

/// Outcome of pressing the record control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingToggle {
    Started,
    Stopped { submitted: bool },
}

/// Shown when the relay could not be reached or gave no readable answer.
pub fn connection_error(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Chat => "Error al conectar con el servidor",
        RequestKind::ImageAnalysis => "Error al analizar imagen",
        RequestKind::Transcription => "Error al procesar audio",
        RequestKind::ImageGeneration => "Error al generar imagen",
    }
}

/// Terminal bot message for a relay outcome.
pub fn terminal_message(kind: RequestKind, response: RelayResponse) -> (MessageKind, String) {
    let error = |text: &str| (MessageKind::Text, format!("{}{}", ERROR_PREFIX, text));

    if !response.ok {
        return match response.error_message.filter(|m| !m.trim().is_empty()) {
            Some(text) => error(&text),
            None => (
                MessageKind::Text,
                format!("{}{}", CONNECTION_PREFIX, connection_error(kind)),
            ),
        };
    }

    match (kind, response.payload) {
        (RequestKind::ImageGeneration, Some(url)) => (MessageKind::Image, url),
        (RequestKind::ImageGeneration, None) => error(NO_IMAGE_GENERATED),
        (RequestKind::Transcription, Some(text)) => {
            (MessageKind::Text, format!("{}{}", TRANSCRIPT_PREFIX, text))
        }
        (_, Some(text)) => (MessageKind::Text, text),
        (_, None) => error(EMPTY_REPLY),
    }
}

/// The placeholder of one submission in flight.
///
/// Dropped without [`InFlight::finish`] (the submitting future was cancelled),
/// it resolves the placeholder as a connection failure.
struct InFlight {
    session: Arc<Mutex<ChatSession>>,
    kind: RequestKind,
    ticket: Option<PendingTicket>,
}

impl InFlight {
    fn finish(mut self, response: RelayResponse) {
        let (message_kind, content) = terminal_message(self.kind, response);
        if let Some(ticket) = self.ticket.take() {
            self.session.lock().resolve(ticket, message_kind, content);
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            log::warn!("{} abandoned before the relay answered", self.kind.path());
            let (message_kind, content) = terminal_message(self.kind, RelayResponse::failure(None));
            self.session.lock().resolve(ticket, message_kind, content);
        }
    }
}

/// One widget instance. Submissions may overlap; each resolves only its own
/// placeholder, and the log lock is never held across a relay call.
pub struct ChatWidget<T> {
    session: Arc<Mutex<ChatSession>>,
    recorder: Mutex<AudioRecorder>,
    transport: T,
}

impl<T: RelayTransport> ChatWidget<T> {
    pub fn new(transport: T) -> Self {
        Self::with_recorder(transport, AudioRecorder::default())
    }

    pub fn with_recorder(transport: T, recorder: AudioRecorder) -> Self {
        Self {
            session: Arc::new(Mutex::new(ChatSession::new())),
            recorder: Mutex::new(recorder),
            transport,
        }
    }

    /// Snapshot of the log for rendering.
    pub fn messages(&self) -> Vec<Message> {
        self.session.lock().messages().to_vec()
    }

    pub fn is_bot_typing(&self) -> bool {
        self.session.lock().is_bot_typing()
    }

    /// Submit a line of text. Blank input is ignored and returns `false`.
    pub async fn send_text(&self, input: &str) -> bool {
        let text = input.trim();
        if text.is_empty() {
            return false;
        }

        let request = dispatch::route_text(text);
        let in_flight = self.begin(request.kind(), MessageKind::Text, text);
        self.submit(in_flight, request).await;
        true
    }

    /// Show the picked image and ask the relay to describe it.
    pub async fn send_image(&self, image: Bytes, file_name: &str) {
        let preview = media::data_url(media::image_mime(&image, None), &image);
        let in_flight = self.begin(RequestKind::ImageAnalysis, MessageKind::Image, preview);

        let request = RelayRequest::ImageAnalysis {
            image,
            file_name: file_name.to_string(),
        };
        self.submit(in_flight, request).await;
    }

    /// Feed captured microphone frames; ignored unless recording.
    pub fn push_audio(&self, samples: &[f32]) {
        self.recorder.lock().push_samples(samples);
    }

    /// Same as [`push_audio`](Self::push_audio) for 16-bit PCM hosts.
    pub fn push_audio_i16(&self, samples: &[i16]) {
        self.recorder.lock().push_i16_samples(samples);
    }

    pub fn recorder_status(&self) -> RecorderStatus {
        self.recorder.lock().status()
    }

    /// The record button. Stopping submits the captured audio for transcription.
    pub async fn toggle_recording(&self) -> Result<RecordingToggle, RecorderError> {
        let toggled = self.recorder.lock().toggle()?;

        let audio = match toggled {
            Toggle::Started => return Ok(RecordingToggle::Started),
            Toggle::Stopped(None) => {
                log::debug!("Recording stopped with no audio captured");
                return Ok(RecordingToggle::Stopped { submitted: false });
            }
            Toggle::Stopped(Some(audio)) => audio,
        };

        log::debug!("Submitting {:.1}s of audio", audio.duration_secs);
        let preview = media::data_url("audio/wav", &audio.wav);
        let in_flight = self.begin(RequestKind::Transcription, MessageKind::Audio, preview);

        let request = RelayRequest::Transcription {
            audio: Bytes::from(audio.wav),
            file_name: RECORDING_FILE_NAME.to_string(),
        };
        self.submit(in_flight, request).await;
        Ok(RecordingToggle::Stopped { submitted: true })
    }

    /// Optimistic append; the returned guard owns the placeholder.
    fn begin(
        &self,
        kind: RequestKind,
        message_kind: MessageKind,
        content: impl Into<String>,
    ) -> InFlight {
        let ticket = self.session.lock().begin(message_kind, content);
        InFlight {
            session: Arc::clone(&self.session),
            kind,
            ticket: Some(ticket),
        }
    }

    async fn submit(&self, in_flight: InFlight, request: RelayRequest) {
        let response = self.transport.send(request).await;
        if !response.ok {
            log::warn!(
                "{} failed: {}",
                in_flight.kind.path(),
                response.error_message.as_deref().unwrap_or("<no message>")
            );
        }
        in_flight.finish(response);
    }
}
