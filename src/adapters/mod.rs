// Adapters layer: concrete implementations of the domain ports (master-data API, results sink, queue transport).

pub mod sap_client;
pub mod sink;
pub mod transport;

pub use sap_client::SapProductClient;
pub use sink::{ChannelSink, JsonLinesSink};
pub use transport::{ChannelTransport, JsonLinesTransport};
