use rodio::{OutputStream, OutputStreamHandle, Sink};

use drift_core::error::AudioError;

// Audio Context
pub struct AudioCtx {
    pub _stream: OutputStream,
    pub stream_handle: OutputStreamHandle,
}

impl AudioCtx {
    pub fn new() -> Result<Self, AudioError> {
        // Get a output stream handle to the default physical sound device
        let (_stream, stream_handle) =
            OutputStream::try_default().map_err(|err| AudioError::Device(err.to_string()))?;

        Ok(Self {
            _stream,
            stream_handle,
        })
    }

    pub fn sink(&self, volume: f32) -> Result<Sink, AudioError> {
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|err| AudioError::Playback(err.to_string()))?;
        sink.set_volume(volume);
        Ok(sink)
    }
}
