use actix_web::{HttpResponse, Responder, get, web};
use log::{error, info};

use super::models::{AppState, MessageResponse};

/// Add a miner to the running network.
#[get("/addMiner")]
pub async fn add_miner(state: web::Data<AppState>) -> impl Responder {
    match state.network.add_miner() {
        Ok(id) => {
            info!("GET /addMiner - miner {id} added");
            HttpResponse::Ok().json(MessageResponse {
                message: format!("miner {id} added"),
            })
        }
        Err(e) => {
            error!("GET /addMiner - failed: {e}");
            HttpResponse::InternalServerError().json(MessageResponse {
                message: format!("failed to add miner: {e}"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};
    use serde_json::Value;

    use crate::api::{init_routes, test_support::idle_state};

    #[actix_web::test]
    async fn adds_miner_with_next_id() {
        // Difficulty high enough that the new miner never finds a block.
        let state = idle_state(200.0);
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::get().uri("/addMiner").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "miner 0 added");

        let req = test::TestRequest::get().uri("/addMiner").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "miner 1 added");

        let snap = state.network.snapshot();
        assert_eq!(snap.miners.len(), 2);
        assert_eq!(snap.miners[1].id, 1);
        assert_eq!(snap.miners[1].balance, 0);

        state.network.shutdown();
    }
}
