//! Reading REST Service
//!
//! Exposes report generation, tarot draws, saved records and share links
//! as a REST API.
//!
//! ## Endpoints
//!
//! - `POST /api/ziwei/report` - Generate a report and save it as a profile
//! - `POST /api/tarot/draw` - Draw cards and save the draw
//! - `GET /api/profiles` - List saved profiles
//! - `PATCH /api/profiles/:id` - Rename a profile or edit a note
//! - `DELETE /api/profiles/:id` - Delete a profile
//! - `GET /api/profiles/:id/compare/:other` - Compare topic scores
//! - `GET /api/tarot/records` - List saved draws
//! - `PATCH /api/tarot/records/:id` - Relabel a draw
//! - `DELETE /api/tarot/records/:id` - Delete a draw
//! - `POST /api/share/encode` - Mint a share token (and link)
//! - `POST /api/share/decode` - Ingest a shared reading
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{metrics_middleware, record_draw_metric, record_report_metric, record_share_metric};
pub use routes::{create_router, AppState, ErrorResponse};
pub use state::ServiceState;
