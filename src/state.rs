use crate::forwarder::CompletionForwarder;
use crate::gate::RequestGate;

// app's shared state
pub struct AppState {
    pub gate: RequestGate,
    pub forwarder: CompletionForwarder,
}
