pub mod google_oauth;
pub mod token_store;
