// Domain layer: core models and ports (interfaces). No knowledge of any
// concrete remote API lives here.

pub mod model;
pub mod ports;
