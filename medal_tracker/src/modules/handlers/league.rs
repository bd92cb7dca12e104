use crate::{
    modules::{
        leagues::{
            service::{LeagueError, LeagueService},
            standings::{compute_standings, Standings},
            validation::{LeagueInput, TeamInput},
        },
        medals::store::MedalStore,
        store::StoreError,
    },
    types::tables::{League, LeagueSummary, TeamWithCountries},
};
use axum::{
    async_trait,
    extract::{Extension, FromRequestParts, Path},
    http::{request::Parts, StatusCode},
    Json,
};
use medal_tracker_libs::api::ApiResponse;
use std::sync::Arc;

pub const USER_ID_HEADER: &str = "x-user-id";

type LeagueResponse<T> = (StatusCode, Json<ApiResponse<T>>);

/// The authenticated user, as asserted by the upstream authenticator through `x-user-id`.
pub struct CallerId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = LeagueResponse<()>;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match caller {
            Some(caller) => Ok(CallerId(caller.to_string())),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::message("Not authenticated")),
            )),
        }
    }
}

fn error_response<T>(e: LeagueError) -> LeagueResponse<T> {
    let status = match &e {
        LeagueError::NotFound(_) | LeagueError::Store(StoreError::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        LeagueError::NotAuthorized => StatusCode::FORBIDDEN,
        LeagueError::Validation(_) => StatusCode::BAD_REQUEST,
        LeagueError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
        LeagueError::Store(StoreError::Database(cause)) => {
            tracing::error!("request failed cause: {:?}", cause);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::message("unexpected error")),
            );
        }
    };

    (status, Json(ApiResponse::message(e)))
}

fn respond<T>(status: StatusCode, result: Result<T, LeagueError>) -> LeagueResponse<T> {
    match result {
        Ok(data) => (status, Json(ApiResponse::ok(data))),
        Err(e) => error_response(e),
    }
}

pub async fn list_my_leagues(
    CallerId(caller): CallerId,
    Extension(service): Extension<Arc<LeagueService>>,
) -> LeagueResponse<Vec<LeagueSummary>> {
    respond(StatusCode::OK, service.leagues_of(&caller).await)
}

pub async fn create_league(
    CallerId(caller): CallerId,
    Extension(service): Extension<Arc<LeagueService>>,
    Json(input): Json<LeagueInput>,
) -> LeagueResponse<League> {
    respond(
        StatusCode::CREATED,
        service.create_league(&caller, &input).await,
    )
}

pub async fn get_league(
    Path(slug): Path<String>,
    Extension(service): Extension<Arc<LeagueService>>,
) -> LeagueResponse<League> {
    respond(StatusCode::OK, service.league_by_slug(&slug).await)
}

pub async fn delete_league(
    CallerId(caller): CallerId,
    Path(slug): Path<String>,
    Extension(service): Extension<Arc<LeagueService>>,
) -> LeagueResponse<()> {
    match service.delete_league(&caller, &slug).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::message(format!("league {} deleted", slug))),
        ),
        Err(e) => error_response(e),
    }
}

pub async fn list_teams(
    Path(slug): Path<String>,
    Extension(service): Extension<Arc<LeagueService>>,
) -> LeagueResponse<Vec<TeamWithCountries>> {
    respond(StatusCode::OK, service.teams(&slug).await)
}

pub async fn get_standings(
    Path(slug): Path<String>,
    Extension(service): Extension<Arc<LeagueService>>,
    Extension(store): Extension<Arc<dyn MedalStore>>,
) -> LeagueResponse<Standings> {
    let teams = match service.teams(&slug).await {
        Ok(teams) => teams,
        Err(e) => return error_response(e),
    };
    let medals = match store.list_medals().await {
        Ok(medals) => medals,
        Err(e) => return error_response(LeagueError::Store(e)),
    };

    (
        StatusCode::OK,
        Json(ApiResponse::ok(compute_standings(&teams, &medals))),
    )
}

pub async fn add_team(
    CallerId(caller): CallerId,
    Path(slug): Path<String>,
    Extension(service): Extension<Arc<LeagueService>>,
    Json(input): Json<TeamInput>,
) -> LeagueResponse<TeamWithCountries> {
    respond(
        StatusCode::CREATED,
        service.add_team(&caller, &slug, &input).await,
    )
}

pub async fn update_team(
    CallerId(caller): CallerId,
    Path(id): Path<i64>,
    Extension(service): Extension<Arc<LeagueService>>,
    Json(input): Json<TeamInput>,
) -> LeagueResponse<TeamWithCountries> {
    respond(StatusCode::OK, service.update_team(&caller, id, &input).await)
}

pub async fn delete_team(
    CallerId(caller): CallerId,
    Path(id): Path<i64>,
    Extension(service): Extension<Arc<LeagueService>>,
) -> LeagueResponse<()> {
    match service.delete_team(&caller, id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::message(format!("team {} deleted", id))),
        ),
        Err(e) => error_response(e),
    }
}
