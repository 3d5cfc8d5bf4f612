mod chain;
mod health;
mod mining;
pub mod models;
mod stats;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(mining::add_miner)
        .service(chain::get_blockchain_info)
        .service(
            web::scope("/api/v1")
                .service(health::health_check)
                .service(chain::validate_chain)
                .service(stats::get_stats),
        );
}

#[cfg(test)]
pub(crate) mod test_support {
    use actix_web::web;
    use std::sync::Arc;

    use super::AppState;
    use crate::config::NetworkConfig;
    use crate::network::Network;

    /// State backed by a network that starts without miners.
    pub fn idle_state(difficulty: f64) -> web::Data<AppState> {
        let config = NetworkConfig {
            initial_difficulty: difficulty,
            ..NetworkConfig::default()
        };
        let network = Network::launch(config).expect("network launches");
        web::Data::new(AppState::new(Arc::new(network)))
    }
}
