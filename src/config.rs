#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    pub redis_url: Option<String>,
    // Push notification (FCM) configuration; sending is disabled when no
    // server key is configured
    pub fcm_server_key: Option<String>,
    pub fcm_endpoint: String,
    pub idempotency_ttl_secs: u64,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        let redis_url = std::env::var("REDIS_URL").ok();

        let fcm_server_key = std::env::var("FCM_SERVER_KEY").ok();
        let fcm_endpoint = std::env::var("FCM_ENDPOINT")
            .unwrap_or_else(|_| "https://fcm.googleapis.com/fcm/send".to_string());

        let idempotency_ttl_secs = std::env::var("IDEMPOTENCY_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(300);

        Config {
            database_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port,
            redis_url,
            fcm_server_key,
            fcm_endpoint,
            idempotency_ttl_secs,
        }
    }
}
