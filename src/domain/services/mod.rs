pub mod cancellation;
pub mod coordinator;
pub mod lifecycle;
pub mod slots;
