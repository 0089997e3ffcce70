//! Trait abstraction for the frame-level controller transport to enable testing

use async_trait::async_trait;

use crate::error::Result;
use crate::joybus::frame::WireFrame;

/// Frame-level transport for one controller.
///
/// The poll state machine drives this trait without knowing how bytes move:
/// it issues a request, waits the response delay, then asks for the response
/// to be decoded into the transport's owned frame record.
#[async_trait]
pub trait PadBus: Send {
    /// Frame record family this bus produces.
    type Frame: WireFrame;

    /// Brings the transport up. Called once before the first poll cycle.
    async fn start(&mut self) -> Result<()>;

    /// Tears the transport down.
    async fn stop(&mut self) -> Result<()>;

    /// Writes a poll request onto the bus.
    async fn issue_request(&mut self) -> Result<()>;

    /// Attempts to read and decode the response to the last request.
    ///
    /// Returns `true` if a structurally valid frame arrived and the owned
    /// frame record was updated in place. Returns `false` otherwise; the
    /// record then keeps its previous values.
    async fn decode_response(&mut self) -> bool;

    /// Read access to the owned frame record.
    fn frame(&self) -> &Self::Frame;

    /// Mutable access to the owned frame record.
    fn frame_mut(&mut self) -> &mut Self::Frame;
}
