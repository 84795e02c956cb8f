use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info, warn};
use serde_json::json;
use tera::Context;
use uuid::Uuid;

use crate::controller::Interaction;
use crate::prompts::Category;
use crate::session::Session;
use crate::web::models::{
    AskRequest, AskResponse, CategoryView, ChatRequest, ConversationResponse, ErrorView, Outcome,
    SubmitForm,
};
use crate::web::AppState;

pub const SESSION_COOKIE: &str = "medmind_session";

// Index page handler
pub async fn index(data: web::Data<AppState>) -> impl Responder {
    let mut context = Context::new();
    context.insert("categories", &CategoryView::all());
    context.insert("active", &None::<CategoryView>);
    match data.tera.render("index.html", &context) {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(e) => template_error(e),
    }
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub async fn categories() -> impl Responder {
    HttpResponse::Ok().json(CategoryView::all())
}

// Category page: selects the category for this browser's session
pub async fn category_page(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let category = match path.parse::<Category>() {
        Ok(category) => category,
        Err(e) => return HttpResponse::NotFound().body(e.to_string()),
    };

    let (session_id, handle) = data.sessions.get_or_create(cookie_session(&req));
    let mut session = handle.lock().await;
    data.controller.select(&mut session, category);

    let page = PageState::blank(category);
    render_category(&data, &session, page, session_id)
}

// Form submission from a category page
pub async fn submit_page(
    req: HttpRequest,
    path: web::Path<String>,
    form: web::Form<SubmitForm>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let category = match path.parse::<Category>() {
        Ok(category) => category,
        Err(e) => return HttpResponse::NotFound().body(e.to_string()),
    };

    let (session_id, handle) = data.sessions.get_or_create(cookie_session(&req));
    let mut session = handle.lock().await;
    let interaction = data.controller.submit(&mut session, category, &form.input).await;

    let mut page = PageState::blank(category);
    match interaction {
        Interaction::Ignored => {}
        Interaction::Rendered(text) => {
            if !category.is_conversational() {
                page.input = form.input.trim().to_string();
                page.result = Some(text);
            }
        }
        Interaction::Failed(failure) => {
            if category.is_conversational() {
                page.error = Some(ErrorView {
                    status_code: failure.status_code,
                    detail: failure.detail,
                });
            } else {
                page.input = form.input.trim().to_string();
                page.failed = true;
                page.result = Some(failure.to_string());
            }
        }
    }

    render_category(&data, &session, page, session_id)
}

// Ends the browser's session and forgets the cookie
pub async fn end_page_session(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    if let Some(id) = cookie_session(&req) {
        data.sessions.end(id);
    }

    let mut removal = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    removal.make_removal();
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .cookie(removal)
        .finish()
}

// Single-shot or chat request over JSON
pub async fn ask(data: web::Data<AppState>, req: web::Json<AskRequest>) -> HttpResponse {
    let req = req.into_inner();
    let category = match req.category.parse::<Category>() {
        Ok(category) => category,
        Err(e) => {
            warn!("Rejected ask request: {}", e);
            return HttpResponse::BadRequest().json(json!({ "error": e.to_string() }));
        }
    };
    respond(&data, category, &req.input, req.session_id).await
}

// Chat API endpoint
pub async fn chat(data: web::Data<AppState>, req: web::Json<ChatRequest>) -> HttpResponse {
    let req = req.into_inner();
    respond(&data, Category::OpenChat, &req.message, req.session_id).await
}

pub async fn conversation(path: web::Path<Uuid>, data: web::Data<AppState>) -> HttpResponse {
    let session_id = path.into_inner();
    let Some(handle) = data.sessions.get(session_id) else {
        return HttpResponse::NotFound().json(json!({ "error": "unknown session" }));
    };

    let session = handle.lock().await;
    HttpResponse::Ok().json(ConversationResponse {
        session_id,
        turns: session.conversation.all_turns(),
    })
}

pub async fn end_session(path: web::Path<Uuid>, data: web::Data<AppState>) -> HttpResponse {
    if data.sessions.end(path.into_inner()) {
        HttpResponse::NoContent().finish()
    } else {
        HttpResponse::NotFound().json(json!({ "error": "unknown session" }))
    }
}

async fn respond(
    data: &AppState,
    category: Category,
    input: &str,
    session_id: Option<Uuid>,
) -> HttpResponse {
    // Single-shot asks keep nothing, so without an id they get a scratch session
    if session_id.is_none() && !category.is_conversational() {
        info!("API {} request without session", category);
        let mut scratch = Session::new(Uuid::new_v4());
        let outcome = Outcome::from(data.controller.submit(&mut scratch, category, input).await);
        return ask_response(None, category, outcome);
    }

    let (session_id, handle) = data.sessions.get_or_create(session_id);
    info!("API {} request from session {}", category, session_id);

    let mut session = handle.lock().await;
    let outcome = Outcome::from(data.controller.submit(&mut session, category, input).await);
    ask_response(Some(session_id), category, outcome)
}

fn ask_response(session_id: Option<Uuid>, category: Category, outcome: Outcome) -> HttpResponse {
    let body = AskResponse {
        session_id,
        category,
        outcome,
    };
    if matches!(body.outcome, Outcome::Failed { .. }) {
        HttpResponse::BadGateway().json(body)
    } else {
        HttpResponse::Ok().json(body)
    }
}

/// What the category page shows beyond the category itself.
struct PageState {
    category: Category,
    input: String,
    result: Option<String>,
    failed: bool,
    error: Option<ErrorView>,
}

impl PageState {
    fn blank(category: Category) -> Self {
        Self {
            category,
            input: String::new(),
            result: None,
            failed: false,
            error: None,
        }
    }
}

fn render_category(data: &AppState, session: &Session, page: PageState, session_id: Uuid) -> HttpResponse {
    let mut context = Context::new();
    context.insert("categories", &CategoryView::all());
    context.insert("active", &CategoryView::from(page.category));
    context.insert("input", &page.input);
    context.insert("result", &page.result);
    context.insert("failed", &page.failed);
    context.insert("error", &page.error);
    if page.category.is_conversational() {
        context.insert("turns", session.conversation.all_turns());
    } else {
        context.insert("turns", &Vec::<()>::new());
    }

    match data.tera.render("category.html", &context) {
        Ok(html) => HttpResponse::Ok()
            .content_type("text/html")
            .cookie(session_cookie(session_id))
            .body(html),
        Err(e) => template_error(e),
    }
}

fn cookie_session(req: &HttpRequest) -> Option<Uuid> {
    req.cookie(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, id.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

fn template_error(e: tera::Error) -> HttpResponse {
    error!("Template error: {}", e);
    HttpResponse::InternalServerError().body("Template error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn cookie_with_bad_uuid_is_ignored() {
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "not-a-uuid"))
            .to_http_request();
        assert_eq!(cookie_session(&req), None);
    }

    #[test]
    fn cookie_session_reads_uuid() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .cookie(session_cookie(id))
            .to_http_request();
        assert_eq!(cookie_session(&req), Some(id));
    }
}
