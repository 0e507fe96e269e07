//! Domain and API models
//!
//! Row types plus the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod pokemon;
pub mod requests;
pub mod responses;
pub mod user;

// Re-export commonly used types
pub use pokemon::{NewPokemon, Pokemon, SpriteSet};
pub use requests::{
    CreatePokemonRequest, FavoriteRequest, ListQuery, LoginRequest, PageQuery, RefreshRequest,
    RegisterRequest, SearchQuery, UpdateUserRequest,
};
pub use responses::{
    AuthResponse, CacheClearResponse, CacheHealthResponse, CacheStatsResponse, FavoriteWithPokemon,
    FavoritesResponse, HealthResponse, MessageResponse, Pagination, PokemonListResponse,
    PokemonResultsResponse, TokenResponse, UserListResponse,
};
pub use user::{Favorite, User};
