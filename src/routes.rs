use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    pagination::{PageParams, PageRequest},
    repository,
    schemas::{MovieCreate, MovieDetail, MovieListResponse, MovieUpdate},
    validation,
};

pub const MOVIES_PATH: &str = "/api/v1/theater/movies";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(MOVIES_PATH, get(list_movies).post(create_movie))
        .route(
            &format!("{MOVIES_PATH}/{{id}}"),
            get(get_movie).patch(update_movie).delete(delete_movie),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any)),
        )
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> AppResult<Json<MovieListResponse>> {
    let page = PageRequest::try_from(params)?;
    let (movies, total_items) = repository::list_movies(state.db.session(), page).await?;
    if movies.is_empty() {
        return Err(AppError::NotFound("No movies found.".to_string()));
    }
    Ok(Json(MovieListResponse::new(movies, page, total_items, MOVIES_PATH)))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<MovieCreate>,
) -> AppResult<(StatusCode, Json<MovieDetail>)> {
    let movie = body.validate(validation::today())?;
    let detail = state
        .db
        .scoped(|txn| Box::pin(async move { repository::create_movie(txn, movie).await }))
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<MovieDetail>> {
    Ok(Json(repository::get_movie(state.db.session(), id).await?))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<MovieUpdate>,
) -> AppResult<Json<Value>> {
    let changes = body.validate(validation::today())?;
    state
        .db
        .scoped(|txn| Box::pin(async move { repository::update_movie(txn, id, changes).await }))
        .await?;
    Ok(Json(json!({ "detail": "Movie updated successfully." })))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state
        .db
        .scoped(|txn| Box::pin(async move { repository::delete_movie(txn, id).await }))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request},
        response::Response,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::db::memory_db;

    async fn app() -> Router {
        router(Arc::new(AppState { db: memory_db().await }))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn inception(score: f64) -> Value {
        json!({
            "name": "inception",
            "date": "2010-07-16",
            "score": score,
            "overview": "A thief who steals corporate secrets through dream-sharing.",
            "status": "Released",
            "budget": 160000000.0,
            "revenue": 839030630.0,
            "country": "us",
            "genres": ["sci-fi", "ACTION"],
            "actors": ["leonardo dicaprio", "elliot page"],
            "languages": ["english"]
        })
    }

    #[tokio::test]
    async fn create_normalizes_and_returns_detail() {
        let app = app().await;
        let response = send(&app, Method::POST, MOVIES_PATH, Some(inception(88.0))).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["name"], "inception");
        assert_eq!(body["country"]["code"], "US");
        assert_eq!(body["genres"][0]["name"], "Sci-Fi");
        assert_eq!(body["genres"][1]["name"], "Action");
        assert_eq!(body["actors"][1]["name"], "Elliot Page");

        let id = body["id"].as_i64().unwrap();
        let response = send(&app, Method::GET, &format!("{MOVIES_PATH}/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, body);
    }

    #[tokio::test]
    async fn invalid_score_writes_nothing() {
        let app = app().await;
        let response = send(&app, Method::POST, MOVIES_PATH, Some(inception(150.0))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["detail"][0]["field"], "score");

        let response = send(&app, Method::GET, MOVIES_PATH, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let app = app().await;
        send(&app, Method::POST, MOVIES_PATH, Some(inception(88.0))).await;
        let response = send(&app, Method::POST, MOVIES_PATH, Some(inception(88.0))).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn list_links_neighbouring_pages() {
        let app = app().await;
        for i in 0..3 {
            let mut body = inception(50.0);
            body["name"] = json!(format!("movie {i}"));
            let response = send(&app, Method::POST, MOVIES_PATH, Some(body)).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response =
            send(&app, Method::GET, &format!("{MOVIES_PATH}?page=2&per_page=2"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page: MovieListResponse = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.movies.len(), 1);
        assert_eq!(page.prev_page, Some(format!("{MOVIES_PATH}?page=1&per_page=2")));
        assert_eq!(page.next_page, None);

        let response =
            send(&app, Method::GET, &format!("{MOVIES_PATH}?page=1&per_page=50"), None).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn patch_then_delete() {
        let app = app().await;
        let response = send(&app, Method::POST, MOVIES_PATH, Some(inception(88.0))).await;
        let created = json_body(response).await;
        let uri = format!("{MOVIES_PATH}/{}", created["id"]);

        let response =
            send(&app, Method::PATCH, &uri, Some(json!({ "overview": "Updated." }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["detail"], "Movie updated successfully.");

        let fetched = json_body(send(&app, Method::GET, &uri, None).await).await;
        assert_eq!(fetched["overview"], "Updated.");
        assert_eq!(fetched["score"], created["score"]);

        let response = send(&app, Method::PATCH, &uri, Some(json!({ "budget": -1 }))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oversized_page_is_a_field_error() {
        let app = app().await;
        send(&app, Method::POST, MOVIES_PATH, Some(inception(88.0))).await;

        let uri = format!("{MOVIES_PATH}?page=18446744073709551615&per_page=20");
        let response = send(&app, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["detail"][0]["field"], "page");

        let response =
            send(&app, Method::GET, &format!("{MOVIES_PATH}?page=1000000&per_page=20"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn every_bad_field_is_reported_together() {
        let app = app().await;
        let mut body = inception(150.0);
        body["status"] = json!("Rumored");
        body["budget"] = json!(-1);
        let response = send(&app, Method::POST, MOVIES_PATH, Some(body)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.headers()["content-type"], "application/json");

        let detail = json_body(response).await["detail"].clone();
        let mut fields: Vec<_> =
            detail.as_array().unwrap().iter().map(|e| e["field"].as_str().unwrap()).collect();
        fields.sort();
        assert_eq!(fields, vec!["budget", "score", "status"]);
    }

    #[tokio::test]
    async fn malformed_requests_get_json_errors() {
        let app = app().await;

        let mut body = inception(88.0);
        body.as_object_mut().unwrap().remove("overview");
        let response = send(&app, Method::POST, MOVIES_PATH, Some(body)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let detail = json_body(response).await["detail"].clone();
        assert_eq!(detail[0]["field"], "body");
        assert!(detail[0]["message"].as_str().unwrap().contains("overview"));

        let response =
            send(&app, Method::GET, &format!("{MOVIES_PATH}?page=abc"), None).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["detail"][0]["field"], "query");

        let response = send(&app, Method::GET, &format!("{MOVIES_PATH}/abc"), None).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["detail"][0]["field"], "path");
    }
}
