use anyhow::Context;
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
    routing::post,
    Form, Json, Router,
};
use craftboard_engine::{Board, BoardSize, Candidate, Element, CARD_SIZE};
use craftboard_protocol::{
    routes, BoardSnapshot, CombineForm, CombineResponse, DropAck, DropRequest, ElementView,
    ErrorBody, PlaceRequest, PlaceResponse,
};
use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub mod combine;
pub mod config;
pub mod logging;
pub mod resolver;

use combine::{CombinationHandler, CombinationOutcome, CombinationRequest, SharedBoard, Table};
use config::Config;
use resolver::{ForgeResolver, Resolver};

#[derive(Clone)]
pub struct AppState {
    pub board: SharedBoard,
    pub handler: CombinationHandler,
    pub table: Table,
}

impl AppState {
    /// Must be called from within a tokio runtime (starts the placement consumer).
    pub fn new(resolver: Arc<dyn Resolver>, board: Board) -> Self {
        let board = Arc::new(Mutex::new(board));
        let handler = CombinationHandler::new(resolver);
        let table = Table::spawn(handler.clone(), board.clone());
        Self {
            board,
            handler,
            table,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(board_page))
        .route(routes::HEALTH, get(health))
        .route(routes::COMBINE, post(combine))
        .route(routes::BOARD, get(board_snapshot))
        .route(routes::BOARD_PLACE, post(place))
        .route(routes::DROP, post(drop_card))
        .with_state(Arc::new(state))
        // Local security: allow only loopback + Tailscale by default.
        .layer(middleware::from_fn(ip_allowlist))
        // Never use `Access-Control-Allow-Origin: *`: every combination spends the
        // Forge API key configured on this host.
        .layer(local_only_cors())
}

async fn health() -> &'static str {
    "ok"
}

async fn board_page() -> Html<&'static str> {
    Html(BOARD_HTML)
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    (status, Json(ErrorBody::new(msg))).into_response()
}

fn element_view(e: &Element) -> ElementView {
    ElementView {
        name: e.name.clone(),
        emoji: e.emoji.clone(),
        x: e.x,
        y: e.y,
    }
}

async fn combine(
    State(state): State<Arc<AppState>>,
    form: Result<Form<CombineForm>, FormRejection>,
) -> Response {
    let Ok(Form(form)) = form else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid elements");
    };
    let Some((elem1, elem2)) = form.pair() else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid elements");
    };

    let request = CombinationRequest {
        elem1: elem1.to_string(),
        elem2: elem2.to_string(),
    };
    match state.handler.request_combination(&request).await {
        CombinationOutcome::Success { name, emoji } => {
            Json(CombineResponse::new(name, emoji)).into_response()
        }
        CombinationOutcome::Failure { .. } => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error resolving combination",
        ),
    }
}

async fn board_snapshot(State(state): State<Arc<AppState>>) -> Json<BoardSnapshot> {
    let board = state.board.lock().unwrap_or_else(PoisonError::into_inner);
    Json(BoardSnapshot {
        rev: board.rev(),
        card_size: CARD_SIZE,
        elements: board.elements().iter().map(element_view).collect(),
    })
}

async fn place(
    State(state): State<Arc<AppState>>,
    input: Result<Json<PlaceRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(input)) = input else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid element");
    };
    if input.name.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Missing element name");
    }

    let size = BoardSize::measured(input.width, input.height);
    let placed = state
        .board
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .place_if_new(Candidate::new(input.name, input.emoji), size);
    Json(PlaceResponse {
        placed: placed.as_ref().map(element_view),
    })
    .into_response()
}

async fn drop_card(
    State(state): State<Arc<AppState>>,
    input: Result<Json<DropRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(input)) = input else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid elements");
    };
    if input.source.is_empty() || input.target.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Invalid elements");
    }

    let size = BoardSize::measured(input.width, input.height);
    let queued = state.table.drop_on(&input.source, &input.target, size);
    let status = if queued {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };
    (status, Json(DropAck { queued })).into_response()
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("bind {}", config.addr))?;
    let resolver = ForgeResolver::new(
        &config.forge_url,
        config.forge_api_key.clone(),
        config.forge_timeout(),
    )
    .context("build forge client")?;
    let board = Board::new_game(config.seed);

    serve_listener(listener, Arc::new(resolver), board, async {
        let _ = tokio::signal::ctrl_c().await;
        log::info!("shutting down");
    })
    .await?;
    Ok(())
}

pub async fn serve_listener(
    listener: tokio::net::TcpListener,
    resolver: Arc<dyn Resolver>,
    board: Board,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<SocketAddr> {
    let state = AppState::new(resolver, board);
    let app = build_router(state);
    let addr = listener.local_addr()?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    Ok(addr)
}

async fn ip_allowlist(
    axum::extract::ConnectInfo(peer): axum::extract::ConnectInfo<SocketAddr>,
    req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let ip = peer.ip();
    if is_allowed_peer_ip(ip) {
        return next.run(req).await;
    }
    (StatusCode::FORBIDDEN, "forbidden").into_response()
}

fn is_allowed_peer_ip(ip: IpAddr) -> bool {
    if ip.is_loopback() {
        return true;
    }

    // Tailscale CGNAT range (100.64.0.0/10).
    match ip {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            o[0] == 100 && (64..=127).contains(&o[1])
        }
        IpAddr::V6(_) => false,
    }
}

fn local_only_cors() -> CorsLayer {
    use axum::http::header;
    use axum::http::HeaderValue;
    use axum::http::Method;

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _req| {
            is_allowed_local_origin(origin)
        }))
}

fn is_allowed_local_origin(origin: &axum::http::HeaderValue) -> bool {
    let Ok(s) = origin.to_str() else {
        return false;
    };
    is_http_origin_for_host(s, "localhost") || is_http_origin_for_host(s, "127.0.0.1")
}

fn is_http_origin_for_host(origin: &str, host: &str) -> bool {
    for scheme in ["http://", "https://"] {
        if let Some(rest) = origin.strip_prefix(scheme) {
            if let Some(after) = rest.strip_prefix(host) {
                // Origin is just scheme://host[:port]
                return after.is_empty() || after.starts_with(':');
            }
        }
    }
    false
}


const BOARD_HTML: &str = r###"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Infinite Craft</title>
  <style>
    *{box-sizing:border-box;margin:0;padding:0}
    body{font-family:system-ui,sans-serif;padding:16px;color:#111827;background:#fff}
    h1{font-size:24px;font-weight:700;margin-bottom:16px}
    .status{font-size:12px;color:#6b7280;margin-bottom:8px}
    .status.bad{color:#b91c1c}
    #board{
      position:relative;width:100%;height:80vh;
      border:1px solid #e5e7eb;border-radius:8px;overflow:hidden;
    }
    .card{
      position:absolute;width:128px;height:128px;padding:16px;
      display:flex;flex-direction:column;align-items:center;justify-content:center;
      background:#fff;border:1px solid #e5e7eb;border-radius:8px;
      box-shadow:0 4px 6px -1px #0000001a;cursor:move;
      transition:background-color .2s;
    }
    .card:hover{background:#f3f4f6}
    .card .emoji{font-size:48px;line-height:1;margin-bottom:8px}
    .card .name{font-size:16px;font-weight:600;text-align:center}
  </style>
</head>
<body>
  <h1>Infinite Craft</h1>
  <div id="status" class="status">connecting</div>
  <div id="board"></div>

  <script>
  (function(){
    const board = document.getElementById("board");
    const statusEl = document.getElementById("status");
    let rev = -1;

    function setStatus(text, bad){
      statusEl.textContent = text;
      statusEl.classList.toggle("bad", !!bad);
    }

    function render(snapshot){
      board.innerHTML = "";
      for (const el of snapshot.elements){
        const card = document.createElement("div");
        card.className = "card";
        card.draggable = true;
        card.style.left = el.x + "px";
        card.style.top = el.y + "px";

        const emoji = document.createElement("span");
        emoji.className = "emoji";
        emoji.textContent = el.emoji;
        const name = document.createElement("span");
        name.className = "name";
        name.textContent = el.name;
        card.append(emoji, name);

        card.addEventListener("dragstart", (e) => {
          e.dataTransfer.setData("text/plain", el.name);
        });
        card.addEventListener("dragover", (e) => e.preventDefault());
        card.addEventListener("drop", (e) => {
          e.preventDefault();
          dropOn(e.dataTransfer.getData("text/plain"), el.name);
        });
        board.appendChild(card);
      }
    }

    async function dropOn(source, target){
      if (!source || source === target) return;
      const rect = board.getBoundingClientRect();
      try{
        const r = await fetch("/api/drop", {
          method: "POST",
          headers: { "content-type": "application/json" },
          body: JSON.stringify({ source, target, width: rect.width, height: rect.height }),
        });
        const j = await r.json();
        if (j.queued) setStatus(`combining ${source} + ${target}`);
      }catch(_e){
        setStatus("combine failed", true);
      }
    }

    async function poll(){
      for(;;){
        try{
          const r = await fetch("/api/board", { cache: "no-store" });
          if (!r.ok) throw new Error("bad");
          const snapshot = await r.json();
          if (snapshot.rev !== rev){
            rev = snapshot.rev;
            render(snapshot);
          }
          setStatus(`${snapshot.elements.length} elements discovered`);
        }catch(_e){
          setStatus("offline", true);
        }
        await new Promise(res => setTimeout(res, 700));
      }
    }

    poll();
  })();
  </script>
</body>
</html>
"###;
