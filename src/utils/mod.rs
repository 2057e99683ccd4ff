pub mod logging;
pub mod redirect_validator;
pub mod responses;

// Make test utilities available for both unit tests and integration tests
pub mod test_helpers;
