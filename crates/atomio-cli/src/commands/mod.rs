pub mod inspect;
pub mod se3;
pub mod write;
