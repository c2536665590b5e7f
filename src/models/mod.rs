pub mod clinic;
pub mod enums;
pub mod price;
pub mod review;

pub use clinic::Clinic;
pub use enums::{Aspect, ReviewSource, Treatment};
pub use price::PriceObservation;
pub use review::Review;
