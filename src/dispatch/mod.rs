//! Receive side: handler registry, delivery channel and the dispatcher
//! thread that ties them to a socket.

pub mod delivery;
pub mod dispatcher_config;
pub mod dispatcher_state;
pub mod dispatcher_stats;
pub mod handler;
pub mod handler_key;
pub mod handler_registry;
pub mod pkt_dispatcher;
pub mod rce_flags;

pub use delivery::{DeliveryChannel, ReceiveHook};
pub use dispatcher_config::DispatcherConfig;
pub use dispatcher_state::DispatcherState;
pub use dispatcher_stats::DispatcherCounters;
pub use handler::{AuxHandler, PacketHandler, aux_fn, primary_fn};
pub use handler_key::HandlerKey;
pub use handler_registry::HandlerRegistry;
pub use pkt_dispatcher::PktDispatcher;
pub use rce_flags::RceFlags;
