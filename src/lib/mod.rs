use anyhow::Result;
use mongodb::{
    Client,
    options::{ClientOptions, Credential, ServerApi, ServerApiVersion},
};
use std::env;

pub mod constants;
pub mod database;
pub mod utils;
pub mod verifier;

pub use database::DatabaseService;
pub use verifier::TokenVerifier;

pub async fn create_database_connection() -> Result<Client> {
    let uri =
        env::var("MONGODB_URI").unwrap_or_else(|_| constants::DEFAULT_MONGODB_URI.to_string());
    let username = env::var("DB_USERNAME").ok();
    let password = env::var("DB_PASSWORD").ok();

    let mut options = ClientOptions::parse(&uri).await?;
    options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());

    if let (Some(user), Some(pass)) = (username, password) {
        options.credential = Some(Credential::builder().username(user).password(pass).build());
    }

    Ok(Client::with_options(options)?)
}
