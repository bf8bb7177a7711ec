//! Shared utilities for integration tests: an in-process mock ledger node.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;

use oracle_relay::config::RelayConfig;
use oracle_relay::ledger::pow::SHA3_24_ROUNDS;
use oracle_relay::ledger::types::{LastBlockHeightResponse, SubmitTransactionRequest};
use oracle_relay::ledger::{ChainTip, SubmissionResult};
use oracle_relay::openoracle::SignedOracleBundle;

pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_SEED: &str = "000102030405060708090a0b0c0d0e0f";
pub const TEST_BLOCK_HASH: &str =
    "2E289FB9CEF7234E2C08F34CCD66B330229067CE47D22F76EF8C3DF84E9C4DA0";

/// How the mock node answers `POST /transaction`.
#[derive(Clone)]
#[allow(dead_code)]
pub enum Verdict {
    /// Check the envelope against the block it is bound to and the
    /// node's current head.
    Verify,
    /// Always reject with the given diagnostic data.
    Reject(String),
    /// Never answer in time.
    Hang(Duration),
}

pub struct NodeState {
    pub tip: Mutex<LastBlockHeightResponse>,
    /// Blocks the head moves forward after every tip read.
    pub advance_by: u64,
    pub verdict: Verdict,
    pub submissions: Mutex<Vec<SubmitTransactionRequest>>,
}

pub struct MockNode {
    pub addr: SocketAddr,
    pub state: Arc<NodeState>,
}

impl MockNode {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    #[allow(dead_code)]
    pub fn submissions(&self) -> Vec<SubmitTransactionRequest> {
        self.state.submissions.lock().unwrap().clone()
    }
}

pub fn tip_response(height: u64, difficulty: u32) -> LastBlockHeightResponse {
    LastBlockHeightResponse {
        height,
        hash: TEST_BLOCK_HASH.to_string(),
        chain_id: "testnet-001".to_string(),
        spam_pow_difficulty: difficulty,
        spam_pow_hash_function: SHA3_24_ROUNDS.to_string(),
    }
}

async fn height(State(state): State<Arc<NodeState>>) -> Json<LastBlockHeightResponse> {
    let mut tip = state.tip.lock().unwrap();
    let current = tip.clone();
    tip.height += state.advance_by;
    Json(current)
}

async fn submit(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<SubmitTransactionRequest>,
) -> Json<SubmissionResult> {
    state.submissions.lock().unwrap().push(req.clone());

    let rejected = |data: String| SubmissionResult {
        success: false,
        tx_hash: String::new(),
        code: 89,
        data,
    };

    let result = match &state.verdict {
        Verdict::Verify => {
            // Every block of the mock chain shares hash, chain id and difficulty
            let head = ChainTip::from(state.tip.lock().unwrap().clone());
            let checked = req.tx.decode_input_data().and_then(|input| {
                let bound = ChainTip {
                    height: input.block_height,
                    ..head.clone()
                };
                req.tx.verify(&bound)?;
                req.tx.check_height(head.height)
            });
            match checked {
                Ok(()) => SubmissionResult {
                    success: true,
                    tx_hash: "A1B2C3D4".to_string(),
                    code: 0,
                    data: String::new(),
                },
                Err(e) => rejected(e.to_string()),
            }
        }
        Verdict::Reject(data) => rejected(data.clone()),
        Verdict::Hang(delay) => {
            tokio::time::sleep(*delay).await;
            rejected("too late".to_string())
        }
    };
    Json(result)
}

/// Start a mock node on an ephemeral port.
pub async fn start_mock_node(
    tip: LastBlockHeightResponse,
    advance_by: u64,
    verdict: Verdict,
) -> MockNode {
    let state = Arc::new(NodeState {
        tip: Mutex::new(tip),
        advance_by,
        verdict,
        submissions: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/blockchain/height", get(height))
        .route("/transaction", post(submit))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockNode { addr, state }
}

/// Serve `bundle` as a signed open oracle feed. Returns the feed URL.
#[allow(dead_code)]
pub async fn start_bundle_feed(bundle: SignedOracleBundle) -> String {
    let app = Router::new().route(
        "/prices",
        get(move || {
            let bundle = bundle.clone();
            async move { Json(bundle) }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}/prices", addr)
}

/// A valid relay configuration pointed at `node_url`.
pub fn relay_config(node_url: &str) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.node.address = node_url.to_string();
    config.node.timeout_secs = 1;
    config.wallet.seed = TEST_SEED.to_string();
    config.oracle.ethereum_private_key = TEST_PRIVATE_KEY.to_string();
    config.pow.max_iterations = 1 << 20;
    config
}
