use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, BlockView, BlockchainInfoResponse, ValidateResponse};

/// All blocks and the miner ledger, copied under the chain's read lock.
#[get("/getBlockChainInfo")]
pub async fn get_blockchain_info(state: web::Data<AppState>) -> impl Responder {
    let snap = state.network.snapshot();
    HttpResponse::Ok().json(BlockchainInfoResponse {
        blocks: snap.blocks.iter().map(BlockView::from).collect(),
        miners: snap.miners,
    })
}

/// Re-validate the whole chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let snap = state.network.snapshot();
    HttpResponse::Ok().json(ValidateResponse {
        valid: snap.is_valid_chain(),
        length: snap.blocks.len(),
        difficulty: state.network.chain().difficulty(),
    })
}
