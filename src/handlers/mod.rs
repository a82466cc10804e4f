pub mod relay;
pub mod websocket_actor;
