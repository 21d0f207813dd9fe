pub mod mocks;
pub mod pdf;
