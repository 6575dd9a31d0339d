/// PostgreSQL connection establishment with TLS support
use log::error;
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use postgres_openssl::MakeTlsConnector;
use tokio_postgres::Client;
use url::Url;

use crate::errors::StoreError;

pub fn create_ssl_connector(sslrootcert_path: &str) -> Result<MakeTlsConnector, StoreError> {
    let mut builder = SslConnector::builder(SslMethod::tls())
        .map_err(|e| StoreError::Tls(format!("SSL builder error: {}", e)))?;

    builder
        .set_ca_file(sslrootcert_path)
        .map_err(|e| StoreError::Tls(format!("Error loading CA cert: {}", e)))?;

    builder.set_verify(SslVerifyMode::NONE); // TEMPORARY FOR SELF-SIGNED CERTS

    Ok(MakeTlsConnector::new(builder.build()))
}

/// Connect to the database once and spawn the connection driver task.
///
/// The `sslrootcert` query parameter is pulled out of the URL before the
/// cleaned connection string is handed to the driver. There is no retry
/// loop here: queries serve interactive requests, and a storage failure
/// aborts the request that triggered it.
pub async fn connect(database_url: &str) -> Result<Client, StoreError> {
    let url = Url::parse(database_url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;

    let mut sslrootcert_path = None;
    let mut clean_params = Vec::new();
    for (key, value) in url.query_pairs() {
        if key == "sslrootcert" {
            sslrootcert_path = Some(value.to_string());
        } else {
            clean_params.push((key.into_owned(), value.into_owned()));
        }
    }

    let sslrootcert_path = match sslrootcert_path {
        Some(path) => path,
        None => {
            return Err(StoreError::InvalidUrl(
                "sslrootcert parameter missing".into(),
            ))
        }
    };

    let mut clean_url = url.clone();
    clean_url.set_query(None);
    if !clean_params.is_empty() {
        let query = clean_params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        clean_url.set_query(Some(&query));
    }
    let clean_database_url = clean_url.to_string();

    let connector = create_ssl_connector(&sslrootcert_path)?;

    let (client, connection) = tokio_postgres::connect(&clean_database_url, connector).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("Connection error: {}", e);
        }
    });

    Ok(client)
}
