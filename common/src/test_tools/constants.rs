pub const BUCKET_FOR_MOCK_REQUESTS: &str = "uploads";
pub const KEY_FOR_MOCK_REQUESTS: &str = "batch-2024-01.json";
pub const ENCODED_KEY_FOR_MOCK_REQUESTS: &str = "batch%2B1.json";
pub const DECODED_KEY_FOR_MOCK_REQUESTS: &str = "batch+1.json";
pub const USERNAME_FOR_MOCK_REQUESTS: &str = "alice";
pub const ROLE_FOR_MOCK_REQUESTS: &str = "admin";
pub const TABLE_FOR_MOCK_REQUESTS: &str = "users";
