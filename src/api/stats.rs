use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, StatsResponse};

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    let chain = state.network.chain();
    let stats = chain.stats();
    let config = chain.config();

    HttpResponse::Ok().json(StatsResponse {
        height: stats.height,
        difficulty: stats.difficulty,
        target_block_interval_secs: config.target_block_interval,
        retarget_window: config.retarget_window,
        block_reward: config.block_reward,
        miners: stats.miners,
        rejected_submissions: stats.rejected,
        retargets: stats.retargets,
        last_interval_secs: stats.last_interval_secs,
        avg_interval_secs: stats.avg_interval_secs,
    })
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};
    use serde_json::Value;

    use crate::api::{init_routes, test_support::idle_state};

    #[actix_web::test]
    async fn reports_configuration_and_height() {
        let state = idle_state(20.0);
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::get().uri("/api/v1/stats/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["height"], 1);
        assert_eq!(body["difficulty"], 20.0);
        assert_eq!(body["target_block_interval_secs"], 10);
        assert_eq!(body["retarget_window"], 10);
        assert_eq!(body["block_reward"], 20);
        assert_eq!(body["miners"], 0);
        assert_eq!(body["last_interval_secs"], Value::Null);
    }
}
