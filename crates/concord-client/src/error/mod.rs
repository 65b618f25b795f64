//! Client error type

use concord_common::ConfigError;
use concord_gateway::GatewayError;
use concord_rest::RestError;

/// Any failure the SDK surfaces to the application
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Gateway connection failed fatally
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A REST call failed
    #[error(transparent)]
    Rest(#[from] RestError),

    /// Configuration could not be loaded or was invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}
