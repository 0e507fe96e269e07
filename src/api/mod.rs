//! API Module
//!
//! HTTP handlers and routing for the REST API. All endpoints live under
//! `/api/v1`:
//!
//! - `GET /health` - Service health
//! - `POST /auth/register`, `POST /auth/login`, `POST /auth/refresh`,
//!   `GET|PUT /auth/profile` - Accounts and tokens
//! - `GET|POST /pokemon`, `GET|PUT|DELETE /pokemon/:id`,
//!   `GET /pokemon/search`, `GET /pokemon/types/:type`,
//!   `GET /pokemon/:id/species`, `GET /pokemon/:id/evolution` - Catalog
//! - `GET /users`, `GET|PUT|DELETE /users/:id`,
//!   `GET|POST|DELETE /users/:id/favorites` - Users and favorites
//! - `GET /cache/stats`, `DELETE /cache/clear`,
//!   `DELETE /cache/pokemon/clear`, `GET /cache/health` - Cache admin

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
