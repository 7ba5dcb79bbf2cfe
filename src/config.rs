use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub notifications_base_url: String,
    pub app_base_url: String,
    pub data_dir: PathBuf,
    pub secrets_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let debug = cfg!(debug_assertions);
        let notifications_base_url = env::var("HOMEBIT_NOTIFICATIONS_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_NOTIFICATIONS_BASE_URL.to_string());
        let notifications_base_url = notifications_base_url.trim_end_matches('/').to_string();

        let app_base_url =
            env::var("HOMEBIT_APP_BASE_URL").unwrap_or_else(|_| DEFAULT_APP_BASE_URL.to_string());
        let app_base_url = app_base_url.trim_end_matches('/').to_string();

        let data_dir = env::var("HOMEBIT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir(debug));
        let secrets_path = env::var("HOMEBIT_SECRETS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("secrets.json"));

        Self {
            notifications_base_url,
            app_base_url,
            data_dir,
            secrets_path,
        }
    }
}

const DEFAULT_NOTIFICATIONS_BASE_URL: &str = "https://homebit.co.ke/notifications";
const DEFAULT_APP_BASE_URL: &str = "https://homebit.co.ke";

fn default_data_dir(debug: bool) -> PathBuf {
    let base = env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    let dir_name = if debug { "homebit-dev" } else { "homebit" };
    base.join(".local").join("share").join(dir_name)
}
