// Domain layer: message model and ports to the queue, the master-data API and the results sink.

pub mod model;
pub mod ports;
