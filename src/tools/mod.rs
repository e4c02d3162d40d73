// Site credentials and the rate-limited cache around them
pub mod credentials;

// Page fetching with refresh-on-403
pub mod fetch;

// HTML extraction
pub mod scrape;
