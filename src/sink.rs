use crate::point::GeoPoint;
use crate::simulator::StateChange;

/// Receives every emitted position, e.g. a device location injector or a map marker.
///
/// Delivery is fire-and-forget: a sink that fails must deal with it itself,
/// the simulator keeps ticking.
pub trait PositionSink {
    fn on_position(&mut self, position: GeoPoint);

    fn on_state_change(&mut self, _change: StateChange) {}
}

impl<F: FnMut(GeoPoint)> PositionSink for F {
    fn on_position(&mut self, position: GeoPoint) {
        self(position)
    }
}
