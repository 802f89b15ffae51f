//! Post handlers.

use actix_web::{HttpResponse, web};

use chirp_core::RequestContext;
use chirp_core::domain::{
    AuthorId, DEFAULT_PAGE_SIZE, PageRequest, PageToken, Post, PostId, PostPage,
};
use chirp_shared::dto::{PostResponse, PostTextRequest, PostsPageResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::user_id::CallerId;
use crate::state::AppState;

fn to_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        text: post.text,
        author_id: post.author_id.to_string(),
        created_at: post.created_at,
        last_modified_at: post.last_modified_at,
    }
}

fn to_page_response(page: PostPage) -> PostsPageResponse {
    PostsPageResponse {
        posts: page.posts.into_iter().map(to_response).collect(),
        next_page: page.next_page.map(|t| t.to_string()),
    }
}

fn request_context(state: &AppState) -> RequestContext {
    RequestContext::with_timeout(state.request_timeout)
}

/// Extract at most one value of `name` from the query pairs.
fn single_param<'a>(pairs: &'a [(String, String)], name: &str) -> AppResult<Option<&'a str>> {
    let mut values = pairs.iter().filter(|(k, _)| k == name).map(|(_, v)| v.as_str());
    let first = values.next();
    if values.next().is_some() {
        return Err(AppError::BadRequest(format!(
            "More than 1 query param \"{}\"",
            name
        )));
    }
    Ok(first)
}

fn page_request(pairs: &[(String, String)]) -> AppResult<PageRequest> {
    let size = match single_param(pairs, "size")? {
        Some(raw) => raw.parse::<i64>().map_err(|_| {
            AppError::BadRequest("query param \"size\" should be integer".to_string())
        })?,
        None => i64::from(DEFAULT_PAGE_SIZE),
    };
    let token = PageToken::from_query(single_param(pairs, "page")?);

    PageRequest::new(size, token).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// POST /api/v1/posts
pub async fn publish(
    state: web::Data<AppState>,
    body: web::Json<PostTextRequest>,
    caller: CallerId,
) -> AppResult<HttpResponse> {
    let ctx = request_context(&state);
    let post = state
        .posts
        .create_post(&ctx, caller.0, body.into_inner().text)
        .await?;

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// GET /api/v1/posts/{post_id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let ctx = request_context(&state);
    let id = PostId::new(path.into_inner());
    let post = state.posts.get_post(&ctx, &id).await?;

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// PATCH /api/v1/posts/{post_id}
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<PostTextRequest>,
    caller: CallerId,
) -> AppResult<HttpResponse> {
    let ctx = request_context(&state);
    let id = PostId::new(path.into_inner());
    let post = state
        .posts
        .update_post(&ctx, &id, &caller.0, body.into_inner().text)
        .await?;

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// GET /api/v1/users/{user_id}/posts?size=N&page=token
pub async fn list_user_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<Vec<(String, String)>>,
) -> AppResult<HttpResponse> {
    let author = AuthorId::parse(&path.into_inner())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let page = page_request(&query)?;

    let ctx = request_context(&state);
    let posts = state
        .posts
        .get_posts_by_author(&ctx, &author, &page)
        .await?;

    Ok(HttpResponse::Ok().json(to_page_response(posts)))
}
