// Domain layer: payload/output models, the remote-call port and the health status parser.

pub mod health;
pub mod model;
pub mod ports;
