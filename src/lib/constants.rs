pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_MONGODB_URI: &str = "mongodb://127.0.0.1:27017";
pub const DEFAULT_DATABASE: &str = "foodReview";

pub const REVIEWS_COLLECTION: &str = "reviews";
pub const FAVORITES_COLLECTION: &str = "favorites";

pub const TOP_RATED_LIMIT: i64 = 6;
pub const RECOMMENDED_LIMIT: i64 = 1;

pub const DEFAULT_VERIFY_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:lookup";

pub const MAX_JSON_BODY_SIZE: usize = 1_048_576; // 1 MB
