use std::{marker::PhantomData, time::Duration};

use serde::{Serialize, de::DeserializeOwned};
use streamcodec_core::{Cbor, Codec, Format, FrameConfig};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    time::timeout,
};

use crate::{
    ChannelError,
    framing::{read_frame, read_frame_optional, write_frame},
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Framed, typed message channel over an async byte stream.
pub struct Channel<S, F = Cbor> {
    /// Connected stream.
    stream: S,
    /// Frame size limits.
    config: FrameConfig,
    /// Per-call timeout.
    timeout: Duration,
    _format: PhantomData<fn() -> F>,
}

impl<S> Channel<S, Cbor> {
    /// Wraps a stream with the default CBOR format.
    pub fn new(stream: S) -> Self {
        Self::with_format(stream)
    }
}

impl<S, F> Channel<S, F> {
    /// Wraps a stream with format `F`.
    pub fn with_format(stream: S) -> Self {
        Self {
            stream,
            config: FrameConfig::default(),
            timeout: DEFAULT_TIMEOUT,
            _format: PhantomData,
        }
    }

    /// Overrides the default call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the default frame limits.
    pub fn with_frame_config(mut self, config: FrameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Releases the stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S, F> Channel<S, F>
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: Format,
{
    /// Sends one value as a frame.
    pub async fn send<T: Serialize>(&mut self, value: &T) -> Result<(), ChannelError> {
        let payload = Codec::<T, F>::new().to_vec(value)?;

        timeout(
            self.timeout,
            write_frame(&mut self.stream, &payload, &self.config),
        )
        .await
        .map_err(|_| ChannelError::Timeout)??;

        tracing::trace!(format = F::NAME, size = payload.len(), "sent frame");
        Ok(())
    }

    /// Waits for the next value; a closed stream is an error.
    pub async fn recv<T: DeserializeOwned>(&mut self) -> Result<T, ChannelError> {
        let payload = timeout(
            self.timeout,
            read_frame(&mut self.stream, &self.config),
        )
        .await
        .map_err(|_| ChannelError::Timeout)??;

        Ok(Codec::<T, F>::new().from_slice(&payload)?)
    }

    /// Waits for the next value, or `None` once the peer closes the stream
    /// between frames.
    pub async fn recv_optional<T: DeserializeOwned>(&mut self) -> Result<Option<T>, ChannelError> {
        let frame = timeout(
            self.timeout,
            read_frame_optional(&mut self.stream, &self.config),
        )
        .await
        .map_err(|_| ChannelError::Timeout)??;

        let Some(payload) = frame else {
            tracing::debug!("peer closed channel");
            return Ok(None);
        };
        Ok(Some(Codec::<T, F>::new().from_slice(&payload)?))
    }
}
