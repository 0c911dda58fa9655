pub mod flights;

pub use flights as FlightController;
