use std::env;

pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub frontend_origin: String,
    pub smtp_from: Option<String>,
    pub smtp_from_name: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok(); // Load .env file

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let frontend_origin =
            env::var("FRONTEND_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let smtp_from = env::var("SMTP_FROM").ok().filter(|v| !v.trim().is_empty());
        let smtp_from_name = env::var("SMTP_FROM_NAME")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Config {
            database_url,
            bind_addr,
            frontend_origin,
            smtp_from,
            smtp_from_name,
        }
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: String::new(),
            bind_addr: "127.0.0.1:0".to_string(),
            frontend_origin: "http://localhost:5173".to_string(),
            smtp_from: Some("outreach@example.com".to_string()),
            smtp_from_name: Some("Outreach Team".to_string()),
        }
    }
}
