// review_service/src/services/mod.rs

pub mod payload;
pub mod provider_mock;

pub use payload::JsonPayloadBuilder;
pub use provider_mock::MockReviewProvider;
