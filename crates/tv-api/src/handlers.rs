//! # tv-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the tv-core
//! pipeline.

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tv_core::models::{PostId, SearchRequest, SearchRow};
use tv_core::{PostRepo, Sanitizer, SearchPaginator, SearchSettings, ThreadAssembler};

use crate::error::ApiError;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub threads: ThreadAssembler,
    pub search: SearchPaginator,
    /// Page size used when the request does not name one.
    pub default_page_size: i64,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn PostRepo>,
        sanitizer: Arc<Sanitizer>,
        search: SearchSettings,
        default_page_size: i64,
    ) -> Self {
        Self {
            threads: ThreadAssembler::new(repo.clone(), sanitizer.clone()),
            search: SearchPaginator::new(repo, sanitizer, search),
            default_page_size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub by_user: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub username: String,
    pub results: Vec<SearchRow>,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: u64,
    pub total_count: u64,
    pub sort_by: Option<String>,
}

/// A simple homepage handler for "/"
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("Welcome to threadview! Try /thread/{id} or /search?by_user={name}")
}

/// Returns the thread rooted at a post (e.g., /thread/123)
pub async fn view_thread(
    data: web::Data<AppState>,
    path: web::Path<PostId>,
) -> Result<HttpResponse, ApiError> {
    let rows = data.threads.assemble(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Returns one page of an author's posts. Without an author there is
/// nothing to search; send the client back home.
pub async fn search(
    data: web::Data<AppState>,
    query: web::Query<SearchParams>,
) -> Result<HttpResponse, ApiError> {
    let params = query.into_inner();

    let username = params.by_user.as_deref().unwrap_or_default().trim();
    if username.is_empty() {
        return Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/"))
            .finish());
    }

    let sort_by = params.sort_by.filter(|t| !t.trim().is_empty());
    let request = SearchRequest {
        author: username.to_string(),
        page: params.page.unwrap_or(1),
        page_size: params.page_size.unwrap_or(data.default_page_size),
        rank_tag: sort_by.clone(),
    };

    let page = data.search.search(&request).await?;
    let total_pages = page.total_pages();

    Ok(HttpResponse::Ok().json(SearchResponse {
        username: request.author,
        results: page.rows,
        page: page.page,
        page_size: page.page_size,
        total_pages,
        total_count: page.total_count,
        sort_by,
    }))
}
