//! Redis connection shared by the snapshot store and the result cache.

use std::time::Duration;

use redis::{
    Client, RedisError,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tracing::info;

fn connection_config(timeout: Duration) -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(timeout)
        .set_response_timeout(timeout)
}

pub async fn init_redis(redis_url: &str, timeout: Duration) -> Result<ConnectionManager, RedisError> {
    let client = Client::open(redis_url)?;
    let connection_manager = client
        .get_connection_manager_with_config(connection_config(timeout))
        .await?;
    info!("Connected to Redis");

    Ok(connection_manager)
}
